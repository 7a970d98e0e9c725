//! Carrier image I/O and colour-space plumbing.
//!
//! Covers are decoded to 8-bit RGB regardless of their container format; the
//! DCT codec then works on a float luminance plane with the chroma planes
//! carried through untouched (ITU-R BT.601 full-range conversion). The
//! per-pixel conversions are shared between the embed and extract paths so
//! both sides always compute the same luminance from the same RGB bytes.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage};
use log::error;

use crate::error::StegaError;
use crate::result::Result;

/// Luminance as floats plus untouched chroma planes.
pub struct YcbcrPlanes {
    pub y: Vec<f32>,
    pub cb: Vec<u8>,
    pub cr: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Decode any supported image to RGB8. The format is sniffed from content,
/// not the extension, so containers with appended trailers still decode.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)
        .map_err(|source| StegaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| StegaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

    let img = reader.decode().map_err(StegaError::ImageDecode)?;
    Ok(img.to_rgb8())
}

/// Encode a pixel grid as baseline JPEG at the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    img.write_with_encoder(encoder).map_err(|err| {
        error!("failed to encode stego image: {err}");
        StegaError::ImageEncode(err)
    })?;
    Ok(buf)
}

/// Decode in-memory image bytes to RGB8, sniffing the format.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(StegaError::ImageDecode)
}

pub fn split_ycbcr(img: &RgbImage) -> YcbcrPlanes {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut y = Vec::with_capacity(width * height);
    let mut cb = Vec::with_capacity(width * height);
    let mut cr = Vec::with_capacity(width * height);

    for px in img.pixels() {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        y.push(luma_of(px[0], px[1], px[2]));
        cb.push(clamp_u8(128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b));
        cr.push(clamp_u8(128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b));
    }

    YcbcrPlanes {
        y,
        cb,
        cr,
        width,
        height,
    }
}

/// BT.601 luminance of one RGB8 pixel, as [`split_ycbcr`] computes it.
fn luma_of(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// One YCbCr sample quantized to an RGB8 pixel, the inverse of
/// [`split_ycbcr`] up to that quantization.
pub fn ycbcr_pixel_to_rgb(y: f32, cb: u8, cr: u8) -> [u8; 3] {
    let cbf = cb as f32 - 128.0;
    let crf = cr as f32 - 128.0;
    [
        clamp_u8(y + 1.402 * crf),
        clamp_u8(y - 0.344_136 * cbf - 0.714_136 * crf),
        clamp_u8(y + 1.772 * cbf),
    ]
}

/// Luminance a decoder reconstructs after this sample has been quantized to
/// RGB8. Composed from the same primitives the real paths use.
pub fn rgb_roundtrip_luma(y: f32, cb: u8, cr: u8) -> f32 {
    let [r, g, b] = ycbcr_pixel_to_rgb(y, cb, cr);
    luma_of(r, g, b)
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Heuristic used for warnings and the bench cover scan; the codecs
/// themselves sniff content.
pub fn has_image_extension(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg" | "png" | "webp" | "bmp" | "tif" | "tiff")
    )
}
