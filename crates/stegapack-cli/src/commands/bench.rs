use std::path::PathBuf;

use clap::Args;
use stegapack_core::bench::{bench, BenchRequest};
use stegapack_core::commands::EmbedOptions;

use super::{resolve_password, ChannelArg, ModeArg};
use crate::CliResult;

/// Embed one payload into every cover under a directory and report CSV rows
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Directory of cover images, walked recursively
    #[arg(long, value_name = "directory")]
    pub covers: PathBuf,

    /// Payload embedded into every cover
    #[arg(long, value_name = "payload")]
    pub payload: PathBuf,

    /// Embedding mode
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// Bits per eligible coefficient (dct mode)
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

    /// CSV file the per-cover rows are appended to
    #[arg(long, value_name = "csv file")]
    pub report: PathBuf,
}

impl BenchArgs {
    pub fn run(self) -> CliResult<()> {
        let password = resolve_password(self.password, self.pass_env)?;
        let summary = bench(&BenchRequest {
            covers: self.covers,
            payload: self.payload,
            mode: self.mode.into(),
            options: EmbedOptions {
                rate: self.rate,
                channel: self.channel.into(),
                encrypt: self.encrypt,
                password,
            },
            report: self.report.clone(),
        })?;
        println!(
            "{} of {} covers succeeded, report appended to {}",
            summary.succeeded,
            summary.total,
            self.report.display()
        );
        Ok(())
    }
}
