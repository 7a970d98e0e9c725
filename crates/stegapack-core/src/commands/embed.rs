use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::codec::dct::{ChannelPreset, DctEmbedder, EmbedStats};
use crate::codec::{append, Mode};
use crate::compress::{self, Method};
use crate::crypto::{self, SecretKey};
use crate::error::StegaError;
use crate::frame::{self, Metadata, FORMAT_VERSION, MARKER_TEXT};
use crate::media;
use crate::payload::Payload;
use crate::result::Result;

use super::{write_bytes, DEFAULT_RATE};

#[derive(Default, Clone)]
pub struct EmbedOptions {
    /// Bits per eligible coefficient, dct mode only. Clamped to the
    /// preset's cap; defaults to [`DEFAULT_RATE`].
    pub rate: Option<f64>,
    pub channel: ChannelPreset,
    pub encrypt: bool,
    pub password: Option<String>,
}

impl fmt::Debug for EmbedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedOptions")
            .field("rate", &self.rate)
            .field("channel", &self.channel)
            .field("encrypt", &self.encrypt)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug)]
pub struct EmbedRequest {
    pub mode: Mode,
    pub cover: PathBuf,
    pub payload: PathBuf,
    pub output: PathBuf,
    pub options: EmbedOptions,
}

#[derive(Debug)]
pub struct EmbedReport {
    pub mode: Mode,
    pub plain_size: u64,
    pub comp: Method,
    pub comp_ratio: f64,
    pub blob_size: u64,
    pub stego_size: u64,
    pub dct: Option<EmbedStats>,
}

/// Run the full embed pipeline: load, compress, optionally encrypt, frame,
/// place with the selected codec, persist.
pub fn embed(req: &EmbedRequest) -> Result<EmbedReport> {
    if !req.cover.is_file() {
        return Err(StegaError::CoverNotFound(req.cover.clone()));
    }
    if !media::has_image_extension(&req.cover) {
        warn!("cover extension is not a typical image format, proceeding anyway");
    }

    let payload = Payload::load(&req.payload)?;
    let digest = frame::sha256_hex(&payload.data);
    let compressed = compress::compress_auto(&payload.data)?;
    let (method, ratio) = (compressed.method, compressed.ratio);

    let (blob, encrypted) = if req.options.encrypt {
        let password = req
            .options
            .password
            .as_deref()
            .ok_or(StegaError::MissingPassword)?;
        let key = SecretKey::derive(password);
        (crypto::encrypt(&key, &compressed.blob)?, true)
    } else {
        (compressed.blob, false)
    };

    let mut meta = Metadata {
        v: FORMAT_VERSION,
        marker: MARKER_TEXT.to_string(),
        mode: req.mode,
        encrypted,
        comp: method,
        comp_ratio: ratio,
        plain_size: payload.data.len() as u64,
        blob_size: blob.len() as u64,
        sha256: digest,
        source_kind: payload.kind,
        source_name: payload.name.clone(),
        rate: None,
        block_count: None,
        used_coefs: None,
        channel_preset: None,
    };

    let report = match req.mode {
        Mode::Append => {
            let cover_bytes = fs::read(&req.cover).map_err(|source| StegaError::ReadError {
                path: req.cover.clone(),
                source,
            })?;
            let framed = frame::build_frame(&meta, &blob)?;
            let stego = append::embed(&cover_bytes, &framed)?;
            write_bytes(&req.output, &stego)?;

            EmbedReport {
                mode: req.mode,
                plain_size: meta.plain_size,
                comp: method,
                comp_ratio: ratio,
                blob_size: meta.blob_size,
                stego_size: stego.len() as u64,
                dct: None,
            }
        }
        Mode::Dct => {
            let img = media::load_rgb(&req.cover)?;
            let preset = req.options.channel;
            let embedder = DctEmbedder::new(
                &img,
                req.options.rate.unwrap_or(DEFAULT_RATE),
                preset,
            )?;
            let stats = embedder.stats();

            meta.rate = Some(embedder.rate());
            meta.block_count = Some(stats.block_count as u64);
            meta.used_coefs = Some(stats.used as u64);
            meta.channel_preset = Some(preset.as_str().to_string());

            let framed = frame::build_frame(&meta, &blob)?;
            let stego = embedder.embed(&framed)?;
            write_bytes(&req.output, &stego)?;

            EmbedReport {
                mode: req.mode,
                plain_size: meta.plain_size,
                comp: method,
                comp_ratio: ratio,
                blob_size: meta.blob_size,
                stego_size: stego.len() as u64,
                dct: Some(stats),
            }
        }
    };

    info!(
        "embedded {} plaintext bytes into {:?} ({} stego bytes)",
        report.plain_size, req.output, report.stego_size
    );
    Ok(report)
}
