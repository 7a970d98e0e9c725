//! Batch harness: embed one payload into every cover under a directory and
//! append a CSV row of size, latency and distortion figures per cover.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use walkdir::WalkDir;

use crate::codec::Mode;
use crate::commands::{self, EmbedOptions, EmbedRequest};
use crate::error::StegaError;
use crate::media;
use crate::metrics;
use crate::result::Result;

const CSV_HEADER: &str =
    "cover_path,plain_size,comp_method,comp_ratio,stego_size,latency_ms,psnr,rmse,status\n";

#[derive(Debug)]
pub struct BenchRequest {
    pub covers: PathBuf,
    pub payload: PathBuf,
    pub mode: Mode,
    pub options: EmbedOptions,
    pub report: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct BenchSummary {
    pub total: usize,
    pub succeeded: usize,
}

pub fn bench(req: &BenchRequest) -> Result<BenchSummary> {
    let covers = collect_covers(&req.covers)?;
    info!("benchmarking {} covers against {:?}", covers.len(), req.payload);

    let mut report = open_report(&req.report)?;
    let scratch = scratch_dir()?;

    let mut succeeded = 0;
    for (i, cover) in covers.iter().enumerate() {
        let stego = scratch.join(format!("{i:04}.stego"));
        let started = Instant::now();
        let outcome = commands::embed(&EmbedRequest {
            mode: req.mode,
            cover: cover.clone(),
            payload: req.payload.clone(),
            output: stego.clone(),
            options: req.options.clone(),
        });
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let row = match outcome {
            Ok(embed) => match metrics::psnr_rmse(cover, &stego) {
                Ok(m) => {
                    succeeded += 1;
                    format!(
                        "{},{},{},{:.4},{},{:.1},{},{:.4},ok\n",
                        csv_field(&cover.display().to_string()),
                        embed.plain_size,
                        embed.comp.as_str(),
                        embed.comp_ratio,
                        embed.stego_size,
                        latency_ms,
                        fmt_psnr(m.psnr),
                        m.rmse,
                    )
                }
                Err(err) => failure_row(cover, latency_ms, &err),
            },
            Err(err) => failure_row(cover, latency_ms, &err),
        };
        report
            .write_all(row.as_bytes())
            .map_err(|source| StegaError::WriteError {
                path: req.report.clone(),
                source,
            })?;

        let _ = std::fs::remove_file(&stego);
    }
    let _ = std::fs::remove_dir_all(&scratch);

    Ok(BenchSummary {
        total: covers.len(),
        succeeded,
    })
}

fn collect_covers(root: &Path) -> Result<Vec<PathBuf>> {
    let mut covers = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| StegaError::ReadError {
            path: root.to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && media::has_image_extension(entry.path()) {
            covers.push(entry.path().to_path_buf());
        }
    }
    if covers.is_empty() {
        return Err(StegaError::NoCoversFound(root.to_path_buf()));
    }
    Ok(covers)
}

fn open_report(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StegaError::WriteError {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StegaError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    let empty = file
        .metadata()
        .map(|m| m.len() == 0)
        .map_err(|source| StegaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
    if empty {
        file.write_all(CSV_HEADER.as_bytes())
            .map_err(|source| StegaError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(file)
}

fn scratch_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("stegapack-bench-{}", std::process::id()));
    std::fs::create_dir_all(&dir).map_err(|source| StegaError::WriteError {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

fn failure_row(cover: &Path, latency_ms: f64, err: &StegaError) -> String {
    warn!("bench failed on {cover:?}: {err}");
    format!(
        "{},,,,,{:.1},,,{}\n",
        csv_field(&cover.display().to_string()),
        latency_ms,
        csv_field(&err.to_string()),
    )
}

fn fmt_psnr(psnr: f64) -> String {
    if psnr.is_infinite() {
        "inf".to_string()
    } else {
        format!("{psnr:.4}")
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
