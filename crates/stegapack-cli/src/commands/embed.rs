use std::path::PathBuf;

use clap::Args;
use stegapack_core::commands::{embed, EmbedOptions, EmbedRequest};

use super::{resolve_password, ChannelArg, ModeArg};
use crate::CliResult;

/// Hide a file or directory inside a carrier image
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Embedding mode
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// Carrier image, used readonly
    #[arg(short, long, value_name = "cover image")]
    pub cover: PathBuf,

    /// File or directory to hide
    #[arg(short, long, value_name = "payload")]
    pub payload: PathBuf,

    /// Output stego file
    #[arg(short, long, value_name = "stego file")]
    pub output: PathBuf,

    /// Bits per eligible coefficient (dct mode), clamped to the channel cap
    #[arg(long)]
    pub rate: Option<f64>,

    /// Transport preset tuning quality, band and rate cap
    #[arg(long, value_enum, default_value = "none")]
    pub channel: ChannelArg,

    /// Encrypt the payload with AES-256-GCM
    #[arg(long)]
    pub encrypt: bool,

    /// Password for key derivation
    #[arg(long, conflicts_with = "pass_env")]
    pub password: Option<String>,

    /// Environment variable to read the password from
    #[arg(long = "pass-env", value_name = "NAME")]
    pub pass_env: Option<String>,
}

impl EmbedArgs {
    pub fn run(self) -> CliResult<()> {
        let password = resolve_password(self.password, self.pass_env)?;
        embed(&EmbedRequest {
            mode: self.mode.into(),
            cover: self.cover,
            payload: self.payload,
            output: self.output,
            options: EmbedOptions {
                rate: self.rate,
                channel: self.channel.into(),
                encrypt: self.encrypt,
                password,
            },
        })?;
        Ok(())
    }
}
