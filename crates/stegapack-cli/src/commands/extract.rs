use std::path::PathBuf;

use clap::Args;
use stegapack_core::commands::{extract, ExtractRequest};

use super::resolve_password;
use crate::CliResult;

/// Recover a hidden payload from a stego container
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Stego container produced by the embed command
    #[arg(short, long, value_name = "stego file")]
    pub stego: PathBuf,

    /// Directory the payload is written into
    #[arg(short, long = "out-dir", value_name = "directory")]
    pub out_dir: PathBuf,

    /// Password for encrypted payloads
    #[arg(long, conflicts_with = "pass_env")]
    pub password: Option<String>,

    /// Environment variable to read the password from
    #[arg(long = "pass-env", value_name = "NAME")]
    pub pass_env: Option<String>,
}

impl ExtractArgs {
    pub fn run(self) -> CliResult<()> {
        let password = resolve_password(self.password, self.pass_env)?;
        extract(&ExtractRequest {
            stego: self.stego,
            out_dir: self.out_dir,
            password,
        })?;
        Ok(())
    }
}
