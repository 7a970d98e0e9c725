//! Framing and integrity: the marker, the metadata record and the framed
//! blob that the codecs place into a carrier.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::Mode;
use crate::compress::Method;
use crate::error::StegaError;
use crate::payload::SourceKind;
use crate::result::Result;

/// ASCII sentinel anchoring the framed blob inside a stego container. Long
/// enough that a random collision in cover bytes is negligible; the append
/// embedder still asserts it is absent before committing.
pub const MARKER_TEXT: &str = "::STEGA_PAYLOAD_START::";
pub const MARKER: &[u8] = MARKER_TEXT.as_bytes();

pub const META_LEN_BYTES: usize = 4;
pub const FORMAT_VERSION: u32 = 1;

/// The JSON record between the marker and the payload blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub v: u32,
    pub marker: String,
    pub mode: Mode,
    pub encrypted: bool,
    pub comp: Method,
    pub comp_ratio: f64,
    pub plain_size: u64,
    pub blob_size: u64,
    /// Hex digest of the plaintext payload, never of the compressed or
    /// encrypted blob, so integrity holds regardless of codec choice.
    pub sha256: String,
    pub source_kind: SourceKind,
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_coefs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_preset: Option<String>,
}

/// Assemble `MARKER || meta_len || meta_json || blob`.
pub fn build_frame(meta: &Metadata, blob: &[u8]) -> Result<Vec<u8>> {
    let json =
        serde_json::to_vec(meta).map_err(|err| StegaError::MetadataMalformed(err.to_string()))?;

    let mut frame = Vec::with_capacity(MARKER.len() + META_LEN_BYTES + json.len() + blob.len());
    frame.extend_from_slice(MARKER);
    let mut len = [0u8; META_LEN_BYTES];
    BigEndian::write_u32(&mut len, json.len() as u32);
    frame.extend_from_slice(&len);
    frame.extend_from_slice(&json);
    frame.extend_from_slice(blob);
    Ok(frame)
}

/// Parse a frame whose marker starts at `marker_pos` inside `container`.
/// Returns the metadata and the owned blob bytes.
pub fn parse_frame(container: &[u8], marker_pos: usize) -> Result<(Metadata, Vec<u8>)> {
    let len_start = marker_pos + MARKER.len();
    let meta_start = len_start + META_LEN_BYTES;
    if meta_start > container.len() {
        return Err(StegaError::FrameTruncated);
    }

    let meta_len = BigEndian::read_u32(&container[len_start..meta_start]) as usize;
    let meta_end = meta_start
        .checked_add(meta_len)
        .filter(|&end| end <= container.len())
        .ok_or(StegaError::FrameTruncated)?;

    let meta: Metadata = serde_json::from_slice(&container[meta_start..meta_end])
        .map_err(|err| StegaError::MetadataMalformed(err.to_string()))?;
    if meta.marker != MARKER_TEXT {
        return Err(StegaError::MetadataMalformed(
            "marker field does not match".into(),
        ));
    }

    let blob_end = meta_end
        .checked_add(meta.blob_size as usize)
        .filter(|&end| end <= container.len())
        .ok_or(StegaError::FrameTruncated)?;

    Ok((meta, container[meta_end..blob_end].to_vec()))
}

/// First marker occurrence, used on codec-recovered bitstreams.
pub fn find_marker(buf: &[u8]) -> Option<usize> {
    if buf.len() < MARKER.len() {
        return None;
    }
    buf.windows(MARKER.len()).position(|w| w == MARKER)
}

/// Last marker occurrence, used on raw container bytes so a cover that
/// happens to contain the sequence does not shadow the real frame.
pub fn rfind_marker(buf: &[u8]) -> Option<usize> {
    if buf.len() < MARKER.len() {
        return None;
    }
    buf.windows(MARKER.len()).rposition(|w| w == MARKER)
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta(blob: &[u8]) -> Metadata {
        Metadata {
            v: FORMAT_VERSION,
            marker: MARKER_TEXT.to_string(),
            mode: Mode::Append,
            encrypted: false,
            comp: Method::Lz77,
            comp_ratio: 0.42,
            plain_size: 123,
            blob_size: blob.len() as u64,
            sha256: sha256_hex(b"plaintext"),
            source_kind: SourceKind::File,
            source_name: "secret.bin".to_string(),
            rate: None,
            block_count: None,
            used_coefs: None,
            channel_preset: None,
        }
    }

    #[test]
    fn frame_roundtrips() {
        let blob = b"compressed payload";
        let meta = sample_meta(blob);
        let frame = build_frame(&meta, blob).unwrap();

        assert!(frame.starts_with(MARKER));
        let (parsed, parsed_blob) = parse_frame(&frame, 0).unwrap();
        assert_eq!(parsed.source_name, meta.source_name);
        assert_eq!(parsed.blob_size, meta.blob_size);
        assert_eq!(parsed_blob, blob);
    }

    #[test]
    fn dct_fields_are_omitted_for_append_mode() {
        let meta = sample_meta(b"");
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("rate"));
        assert!(!json.contains("block_count"));
        assert!(json.contains("\"mode\":\"append\""));
    }

    #[test]
    fn finds_last_marker_occurrence() {
        let mut buf = b"prefix".to_vec();
        buf.extend_from_slice(MARKER);
        buf.extend_from_slice(b"middle");
        buf.extend_from_slice(MARKER);
        buf.extend_from_slice(b"tail");

        let last = rfind_marker(&buf).unwrap();
        assert_eq!(last, 6 + MARKER.len() + 6);
        assert_eq!(find_marker(&buf).unwrap(), 6);
    }

    #[test]
    fn no_marker_in_short_or_clean_buffers() {
        assert_eq!(find_marker(b"tiny"), None);
        assert_eq!(rfind_marker(b"nothing to see here"), None);
    }

    #[test]
    fn rejects_truncated_metadata() {
        let blob = b"data";
        let meta = sample_meta(blob);
        let frame = build_frame(&meta, blob).unwrap();

        let cut = MARKER.len() + META_LEN_BYTES + 5;
        assert!(matches!(
            parse_frame(&frame[..cut], 0),
            Err(StegaError::FrameTruncated)
        ));
    }

    #[test]
    fn rejects_truncated_blob() {
        let blob = b"data";
        let meta = sample_meta(blob);
        let frame = build_frame(&meta, blob).unwrap();
        assert!(matches!(
            parse_frame(&frame[..frame.len() - 1], 0),
            Err(StegaError::FrameTruncated)
        ));
    }

    #[test]
    fn rejects_mangled_json() {
        let blob = b"data";
        let meta = sample_meta(blob);
        let mut frame = build_frame(&meta, blob).unwrap();
        frame[MARKER.len() + META_LEN_BYTES] = b'!';
        assert!(matches!(
            parse_frame(&frame, 0),
            Err(StegaError::MetadataMalformed(_))
        ));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = sha256_hex(b"abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
