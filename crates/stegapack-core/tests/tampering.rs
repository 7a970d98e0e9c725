//! Any damage to the framed region of a stego container must surface as a
//! hard error on extraction, never as silently wrong payload bytes.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tempfile::TempDir;

use stegapack_core::commands::{embed, extract, EmbedOptions, EmbedRequest, ExtractRequest};
use stegapack_core::{ErrorKind, StegaError};

fn write_cover(dir: &Path, seed: u64) -> PathBuf {
    let mut rng = fastrand::Rng::with_seed(seed);
    let img = RgbImage::from_fn(320, 240, |_, _| {
        image::Rgb([rng.u8(..), rng.u8(..), rng.u8(..)])
    });
    let path = dir.join("cover.jpg");
    img.save(&path).unwrap();
    path
}

fn make_append_stego(dir: &Path, password: Option<&str>, seed: u64) -> PathBuf {
    let cover = write_cover(dir, seed);
    let payload = dir.join("payload.bin");
    let mut rng = fastrand::Rng::with_seed(seed + 100);
    fs::write(&payload, (0..2048).map(|_| rng.u8(..)).collect::<Vec<u8>>()).unwrap();

    let stego = dir.join("stego.jpg");
    embed(&EmbedRequest {
        mode: stegapack_core::Mode::Append,
        cover,
        payload,
        output: stego.clone(),
        options: EmbedOptions {
            encrypt: password.is_some(),
            password: password.map(str::to_string),
            ..Default::default()
        },
    })
    .unwrap();
    stego
}

fn extract_err(stego: &Path, out: &Path, password: Option<&str>) -> StegaError {
    extract(&ExtractRequest {
        stego: stego.to_path_buf(),
        out_dir: out.to_path_buf(),
        password: password.map(str::to_string),
    })
    .unwrap_err()
}

/// Flip one hex character of the recorded digest inside the metadata JSON.
fn corrupt_digest_in_place(stego: &Path) {
    let mut bytes = fs::read(stego).unwrap();
    let needle = b"\"sha256\":\"";
    let at = bytes
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("metadata digest present")
        + needle.len();
    bytes[at] = if bytes[at] == b'0' { b'1' } else { b'0' };
    fs::write(stego, bytes).unwrap();
}

#[test]
fn corrupted_digest_fails_with_exit_code_5() {
    let dir = TempDir::new().unwrap();
    let stego = make_append_stego(dir.path(), None, 1);
    corrupt_digest_in_place(&stego);

    let err = extract_err(&stego, &dir.path().join("out"), None);
    assert!(matches!(err, StegaError::ChecksumMismatch));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn truncated_frame_is_an_integrity_error() {
    let dir = TempDir::new().unwrap();
    let stego = make_append_stego(dir.path(), None, 2);

    let bytes = fs::read(&stego).unwrap();
    fs::write(&stego, &bytes[..bytes.len() - 16]).unwrap();

    let err = extract_err(&stego, &dir.path().join("out"), None);
    assert!(matches!(err, StegaError::FrameTruncated));
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn corrupted_blob_never_yields_a_payload() {
    let dir = TempDir::new().unwrap();
    let stego = make_append_stego(dir.path(), None, 3);

    // last byte sits inside the compressed blob
    let mut bytes = fs::read(&stego).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&stego, bytes).unwrap();

    assert!(extract(&ExtractRequest {
        stego,
        out_dir: dir.path().join("out"),
        password: None,
    })
    .is_err());
}

#[test]
fn corrupted_ciphertext_fails_authentication() {
    let dir = TempDir::new().unwrap();
    let stego = make_append_stego(dir.path(), Some("pw"), 4);

    let mut bytes = fs::read(&stego).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&stego, bytes).unwrap();

    let err = extract_err(&stego, &dir.path().join("out"), Some("pw"));
    assert!(matches!(err, StegaError::DecryptionFailed));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn container_without_a_frame_reports_a_missing_marker() {
    let dir = TempDir::new().unwrap();
    let cover = write_cover(dir.path(), 5);

    let err = extract_err(&cover, &dir.path().join("out"), None);
    assert!(matches!(err, StegaError::MarkerNotFound));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn non_image_container_without_marker_reports_a_missing_marker() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.bin");
    fs::write(&bogus, b"definitely not an image and definitely no frame").unwrap();

    let err = extract_err(&bogus, &dir.path().join("out"), None);
    assert!(matches!(err, StegaError::MarkerNotFound));
}
