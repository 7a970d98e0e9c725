//! High-level operations: one strict stage sequence per call, early exit on
//! the first error.

pub mod embed;
pub mod extract;

pub use embed::{embed, EmbedOptions, EmbedReport, EmbedRequest};
pub use extract::{extract, ExtractReport, ExtractRequest};

use std::path::Path;

use crate::error::StegaError;
use crate::result::Result;

/// Default bits per eligible coefficient when the caller does not choose.
pub const DEFAULT_RATE: f64 = 0.05;

pub(crate) fn write_bytes(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StegaError::WriteError {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, data).map_err(|source| StegaError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}
