//! Structure-preserving append codec: the framed blob rides behind the
//! carrier's own bytes, so viewers keep showing the image and the pixel
//! grid is untouched. Survives transports that preserve byte content.

use log::info;

use crate::error::StegaError;
use crate::frame;
use crate::result::Result;

/// Concatenate the framed blob after the cover bytes. Fails if the cover
/// already contains the marker: the frame would no longer be addressable
/// unambiguously.
pub fn embed(cover: &[u8], framed: &[u8]) -> Result<Vec<u8>> {
    if frame::find_marker(cover).is_some() {
        return Err(StegaError::MarkerCollision);
    }

    let mut stego = Vec::with_capacity(cover.len() + framed.len());
    stego.extend_from_slice(cover);
    stego.extend_from_slice(framed);
    info!(
        "append embed: {} cover bytes + {} framed bytes",
        cover.len(),
        framed.len()
    );
    Ok(stego)
}

/// Locate the framed blob in a container. The last marker occurrence wins,
/// in case a cover slipped through with the sequence already inside.
pub fn extract(container: &[u8]) -> Result<&[u8]> {
    let pos = frame::rfind_marker(container).ok_or(StegaError::MarkerNotFound)?;
    Ok(&container[pos..])
}
