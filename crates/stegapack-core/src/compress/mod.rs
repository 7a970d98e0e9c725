//! Adaptive compression: race deflate against the dictionary coder and keep
//! the smaller stream, tagged with a self-describing signature.

pub mod lz78;

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StegaError;
use crate::result::Result;

pub const SIGNATURE_LEN: usize = 5;

const LZ77_SIGNATURE: &[u8; SIGNATURE_LEN] = b"LZ77\0";
const LZ78_SIGNATURE: &[u8; SIGNATURE_LEN] = b"LZ78\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Lz77,
    Lz78,
}

impl Method {
    pub fn signature(self) -> &'static [u8; SIGNATURE_LEN] {
        match self {
            Method::Lz77 => LZ77_SIGNATURE,
            Method::Lz78 => LZ78_SIGNATURE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Lz77 => "lz77",
            Method::Lz78 => "lz78",
        }
    }
}

/// A self-describing compressed blob together with the race outcome.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub blob: Vec<u8>,
    pub method: Method,
    /// Fractional savings relative to the plaintext, display-only.
    pub ratio: f64,
}

/// Compress with both encoders and keep the smaller output; ties go to
/// deflate. A dictionary coder failure falls back to deflate unconditionally.
pub fn compress_auto(data: &[u8]) -> Result<Compressed> {
    let lz77 = deflate(data)?;
    let lz78 = match lz78::compress(data) {
        Ok(body) => Some(body),
        Err(err) => {
            warn!("dictionary coder failed, falling back to deflate: {err}");
            None
        }
    };

    let (method, body) = match lz78 {
        Some(body) if body.len() < lz77.len() => (Method::Lz78, body),
        _ => (Method::Lz77, lz77),
    };

    let mut blob = Vec::with_capacity(SIGNATURE_LEN + body.len());
    blob.extend_from_slice(method.signature());
    blob.extend_from_slice(&body);

    let ratio = if data.is_empty() {
        0.0
    } else {
        1.0 - blob.len() as f64 / data.len() as f64
    };
    info!(
        "compression chose {} ratio {:.2}% ({} -> {} bytes)",
        method.as_str(),
        ratio * 100.0,
        data.len(),
        blob.len()
    );

    Ok(Compressed {
        blob,
        method,
        ratio,
    })
}

/// Invert [`compress_auto`], dispatching on the blob's signature.
pub fn decompress(blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < SIGNATURE_LEN {
        return Err(StegaError::UnknownSignature);
    }
    let (signature, body) = blob.split_at(SIGNATURE_LEN);
    if signature == LZ77_SIGNATURE {
        inflate(body)
    } else if signature == LZ78_SIGNATURE {
        lz78::decompress(body)
    } else {
        Err(StegaError::UnknownSignature)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|err| StegaError::CompressionFailed(err.to_string()))
}

fn inflate(body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|err| {
            debug!("deflate stream rejected: {err}");
            StegaError::CorruptStream("deflate stream")
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_text() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress_auto(&data).unwrap();
        assert_eq!(decompress(&compressed.blob).unwrap(), data);
    }

    #[test]
    fn roundtrips_seeded_random_data() {
        let mut rng = fastrand::Rng::with_seed(42);
        let data: Vec<u8> = (0..50_000).map(|_| rng.u8(..)).collect();
        let compressed = compress_auto(&data).unwrap();
        assert_eq!(decompress(&compressed.blob).unwrap(), data);
    }

    #[test]
    fn is_deterministic() {
        let data = b"determinism matters".repeat(100);
        let a = compress_auto(&data).unwrap();
        let b = compress_auto(&data).unwrap();
        assert_eq!(a.blob, b.blob);
        assert_eq!(a.method, b.method);
    }

    #[test]
    fn winner_is_no_larger_than_either_encoder_plus_signature() {
        for data in [
            b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec(),
            (0..=255u8).cycle().take(10_000).collect::<Vec<u8>>(),
            b"mixed content 1234 mixed content 1234".repeat(50),
        ] {
            let lz77 = deflate(&data).unwrap().len();
            let lz78 = lz78::compress(&data).unwrap().len();
            let chosen = compress_auto(&data).unwrap();
            assert!(chosen.blob.len() <= lz77.min(lz78) + SIGNATURE_LEN);
        }
    }

    #[test]
    fn blob_is_tagged_with_the_winning_signature() {
        let compressed = compress_auto(b"signature check").unwrap();
        assert_eq!(&compressed.blob[..SIGNATURE_LEN], compressed.method.signature());
    }

    #[test]
    fn rejects_unknown_signature() {
        assert!(matches!(
            decompress(b"NOPE\0data"),
            Err(StegaError::UnknownSignature)
        ));
        assert!(matches!(
            decompress(b"LZ"),
            Err(StegaError::UnknownSignature)
        ));
    }

    #[test]
    fn rejects_corrupt_deflate_stream() {
        let mut blob = LZ77_SIGNATURE.to_vec();
        blob.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00]);
        assert!(decompress(&blob).is_err());
    }

    #[test]
    fn ratio_reflects_savings() {
        let data = vec![b'a'; 10_000];
        let compressed = compress_auto(&data).unwrap();
        assert!(compressed.ratio > 0.9);

        let mut rng = fastrand::Rng::with_seed(1);
        let noise: Vec<u8> = (0..1000).map(|_| rng.u8(..)).collect();
        let compressed = compress_auto(&noise).unwrap();
        assert!(compressed.ratio <= 0.05);
    }
}
