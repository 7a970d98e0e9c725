use std::path::PathBuf;

use clap::Args;
use stegapack_core::metrics::psnr_rmse;

use crate::CliResult;

/// Compute PSNR and RMSE between a cover and a stego image
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// The original cover image
    #[arg(long, value_name = "cover image")]
    pub cover: PathBuf,

    /// The stego image to compare against
    #[arg(long, value_name = "stego image")]
    pub stego: PathBuf,
}

impl MetricsArgs {
    pub fn run(self) -> CliResult<()> {
        let metrics = psnr_rmse(&self.cover, &self.stego)?;
        if metrics.psnr.is_infinite() {
            println!("PSNR: inf dB");
        } else {
            println!("PSNR: {:.4} dB", metrics.psnr);
        }
        println!("RMSE: {:.4}", metrics.rmse);
        Ok(())
    }
}
