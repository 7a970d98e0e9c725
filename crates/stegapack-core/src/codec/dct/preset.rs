//! Channel presets: closed parameter bundles tuning JPEG quality, the
//! mid-frequency band and the rate cap for a specific transport.

use std::fmt;
use std::str::FromStr;

use crate::error::StegaError;
use crate::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelPreset {
    #[default]
    None,
    Whatsapp,
    Telegram,
}

impl ChannelPreset {
    pub const ALL: [ChannelPreset; 3] = [
        ChannelPreset::None,
        ChannelPreset::Whatsapp,
        ChannelPreset::Telegram,
    ];

    /// JPEG quality used when persisting the stego pixel grid.
    pub fn quality(self) -> u8 {
        match self {
            ChannelPreset::None => 95,
            ChannelPreset::Whatsapp => 85,
            ChannelPreset::Telegram => 87,
        }
    }

    /// Inclusive zig-zag index band of eligible AC coefficients.
    pub fn band(self) -> (usize, usize) {
        match self {
            ChannelPreset::None => (6, 28),
            ChannelPreset::Whatsapp => (10, 24),
            ChannelPreset::Telegram => (10, 26),
        }
    }

    pub fn rate_cap(self) -> f64 {
        match self {
            ChannelPreset::None => 1.0,
            ChannelPreset::Whatsapp => 0.05,
            ChannelPreset::Telegram => 0.08,
        }
    }

    /// Validate a user rate and clamp it to this preset's cap.
    pub fn clamp_rate(self, rate: f64) -> Result<f64> {
        if !rate.is_finite() || rate <= 0.0 || rate > 1.0 {
            return Err(StegaError::InvalidRate(rate));
        }
        Ok(rate.min(self.rate_cap()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelPreset::None => "none",
            ChannelPreset::Whatsapp => "whatsapp",
            ChannelPreset::Telegram => "telegram",
        }
    }
}

impl fmt::Display for ChannelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelPreset {
    type Err = StegaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(ChannelPreset::None),
            "whatsapp" => Ok(ChannelPreset::Whatsapp),
            "telegram" => Ok(ChannelPreset::Telegram),
            other => Err(StegaError::UnknownChannel(other.to_string())),
        }
    }
}
