use std::fmt;
use std::path::{Path, PathBuf};

use crate::codec::dct::ChannelPreset;
use crate::codec::Mode;
use crate::commands::{self, EmbedOptions, EmbedReport, EmbedRequest};
use crate::error::StegaError;
use crate::result::Result;

/// Prepares the embed API for further configuration.
pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Default)]
pub struct EmbedApi {
    mode: Option<Mode>,
    cover: Option<PathBuf>,
    payload: Option<PathBuf>,
    output: Option<PathBuf>,
    rate: Option<f64>,
    channel: ChannelPreset,
    password: Option<String>,
}

impl fmt::Debug for EmbedApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedApi")
            .field("mode", &self.mode)
            .field("cover", &self.cover)
            .field("payload", &self.payload)
            .field("output", &self.output)
            .field("rate", &self.rate)
            .field("channel", &self.channel)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl EmbedApi {
    /// Select the embedding codec; defaults to append mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// The carrier image, used readonly.
    pub fn with_cover<A: AsRef<Path>>(mut self, cover: A) -> Self {
        self.cover = Some(cover.as_ref().to_path_buf());
        self
    }

    /// The file or directory that will be hidden.
    pub fn with_payload<A: AsRef<Path>>(mut self, payload: A) -> Self {
        self.payload = Some(payload.as_ref().to_path_buf());
        self
    }

    /// Where the stego file will be written.
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Bits per eligible coefficient for dct mode.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Tune quality, band and rate cap for a transport.
    pub fn with_channel(mut self, channel: ChannelPreset) -> Self {
        self.channel = channel;
        self
    }

    /// Encrypt the payload with a password-derived key.
    pub fn with_encryption<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set or clear the password; `None` leaves the payload unencrypted.
    pub fn using_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Execute the embedding and block until the stego file is written.
    pub fn execute(self) -> Result<EmbedReport> {
        let Some(cover) = self.cover else {
            return Err(StegaError::CoverNotSet);
        };
        let Some(payload) = self.payload else {
            return Err(StegaError::PayloadNotSet);
        };
        let Some(output) = self.output else {
            return Err(StegaError::OutputNotSet);
        };

        commands::embed(&EmbedRequest {
            mode: self.mode.unwrap_or(Mode::Append),
            cover,
            payload,
            output,
            options: EmbedOptions {
                rate: self.rate,
                channel: self.channel,
                encrypt: self.password.is_some(),
                password: self.password,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_cover_is_set() {
        assert!(matches!(
            prepare().execute().unwrap_err(),
            StegaError::CoverNotSet
        ));
    }

    #[test]
    fn validates_payload_is_set() {
        assert!(matches!(
            prepare().with_cover("cover.png").execute().unwrap_err(),
            StegaError::PayloadNotSet
        ));
    }

    #[test]
    fn validates_output_is_set() {
        assert!(matches!(
            prepare()
                .with_cover("cover.png")
                .with_payload("secret.bin")
                .execute()
                .unwrap_err(),
            StegaError::OutputNotSet
        ));
    }

    #[test]
    fn debug_never_shows_the_password() {
        let api = prepare().with_encryption("do-not-print-me");
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("do-not-print-me"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
