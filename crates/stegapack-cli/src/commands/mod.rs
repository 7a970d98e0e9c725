pub mod bench;
pub mod embed;
pub mod extract;
pub mod metrics;

use clap::ValueEnum;
use stegapack_core::{ChannelPreset, Mode, StegaError};

use crate::CliResult;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Append,
    Dct,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Append => Mode::Append,
            ModeArg::Dct => Mode::Dct,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ChannelArg {
    #[default]
    None,
    Whatsapp,
    Telegram,
}

impl From<ChannelArg> for ChannelPreset {
    fn from(channel: ChannelArg) -> Self {
        match channel {
            ChannelArg::None => ChannelPreset::None,
            ChannelArg::Whatsapp => ChannelPreset::Whatsapp,
            ChannelArg::Telegram => ChannelPreset::Telegram,
        }
    }
}

/// Resolve the password from `--password` or `--pass-env`, read verbatim at
/// call time.
pub fn resolve_password(
    password: Option<String>,
    pass_env: Option<String>,
) -> CliResult<Option<String>> {
    if let Some(name) = pass_env {
        return std::env::var(&name)
            .map(Some)
            .map_err(|_| StegaError::PasswordEnvNotSet(name));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_flag_wins_when_no_env_is_named() {
        let resolved = resolve_password(Some("pw".into()), None).unwrap();
        assert_eq!(resolved, Some("pw".into()));
    }

    #[test]
    fn missing_env_var_is_an_argument_error() {
        let err = resolve_password(None, Some("STEGAPACK_TEST_UNSET_VAR".into())).unwrap_err();
        assert!(matches!(err, StegaError::PasswordEnvNotSet(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn env_var_is_read_verbatim() {
        std::env::set_var("STEGAPACK_TEST_PW_VAR", "  spaced pw  ");
        let resolved = resolve_password(None, Some("STEGAPACK_TEST_PW_VAR".into())).unwrap();
        assert_eq!(resolved, Some("  spaced pw  ".into()));
        std::env::remove_var("STEGAPACK_TEST_PW_VAR");
    }
}
