//! The two embedding codecs behind a common tagged mode.

pub mod append;
pub mod dct;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Embedding mode, dispatched statically by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Attach the framed blob after the carrier bytes; pixels untouched.
    Append,
    /// Modulate mid-frequency luminance DCT coefficients.
    Dct,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Append => "append",
            Mode::Dct => "dct",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Append).unwrap(), "\"append\"");
        assert_eq!(serde_json::to_string(&Mode::Dct).unwrap(), "\"dct\"");
        let parsed: Mode = serde_json::from_str("\"dct\"").unwrap();
        assert_eq!(parsed, Mode::Dct);
    }
}
