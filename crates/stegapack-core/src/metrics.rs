//! Distortion metrics between a cover and its stego counterpart, computed
//! over the triple-channel RGB mean squared error.

use std::path::Path;

use crate::error::StegaError;
use crate::media;
use crate::result::Result;

#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    /// Peak signal-to-noise ratio in dB; infinite when the images are
    /// identical.
    pub psnr: f64,
    pub rmse: f64,
}

pub fn psnr_rmse(cover: &Path, stego: &Path) -> Result<Metrics> {
    let a = media::load_rgb(cover)?;
    let b = media::load_rgb(stego)?;
    if a.dimensions() != b.dimensions() {
        return Err(StegaError::DimensionMismatch);
    }

    let mut sum = 0.0f64;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        for c in 0..3 {
            let d = pa[c] as f64 - pb[c] as f64;
            sum += d * d;
        }
    }
    let mse = sum / (a.width() as f64 * a.height() as f64 * 3.0);

    if mse == 0.0 {
        return Ok(Metrics {
            psnr: f64::INFINITY,
            rmse: 0.0,
        });
    }
    Ok(Metrics {
        psnr: 10.0 * (255.0f64 * 255.0 / mse).log10(),
        rmse: mse.sqrt(),
    })
}
