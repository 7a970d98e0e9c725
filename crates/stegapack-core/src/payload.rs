//! Payload acquisition: a file is read as-is, a directory is packed into a
//! deterministic zip archive so the rest of the pipeline only ever sees one
//! opaque byte sequence.

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::StegaError;
use crate::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Dir,
}

#[derive(Debug)]
pub struct Payload {
    pub data: Vec<u8>,
    pub name: String,
    pub kind: SourceKind,
}

impl Payload {
    pub fn load(path: &Path) -> Result<Payload> {
        if path.is_dir() {
            info!("payload is a directory, packing into an archive");
            return Ok(Payload {
                data: archive_dir(path)?,
                name: basename(path)?,
                kind: SourceKind::Dir,
            });
        }
        if path.is_file() {
            let mut data = Vec::new();
            File::open(path)
                .and_then(|mut f| f.read_to_end(&mut data))
                .map_err(|source| StegaError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })?;
            return Ok(Payload {
                data,
                name: basename(path)?,
                kind: SourceKind::File,
            });
        }
        Err(StegaError::PayloadNotFound(path.to_path_buf()))
    }
}

fn basename(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| StegaError::PayloadNotFound(path.to_path_buf()))
}

/// Pack a directory into an in-memory zip. Entries are stored uncompressed
/// (the adaptive compressor runs over the whole archive afterwards) and
/// walked in sorted order so the same tree always produces the same bytes.
fn archive_dir(dir: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|err| StegaError::ReadError {
                path: dir.to_path_buf(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(dir)
                .expect("walked entries live under the walk root");
            let name = rel.to_string_lossy().replace('\\', "/");
            debug!("archiving {name}");

            zip.start_file(name.as_str(), options)?;
            let mut file = File::open(entry.path()).map_err(|source| StegaError::ReadError {
                path: entry.path().to_path_buf(),
                source,
            })?;
            std::io::copy(&mut file, &mut zip)?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

/// Unpack an archived directory payload into `dest`.
pub fn unpack_dir(data: &[u8], dest: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut zip = ZipArchive::new(Cursor::new(data))?;
    let mut written = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            debug!("skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StegaError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;
        File::create(&target)
            .and_then(|mut f| f.write_all(&content))
            .map_err(|source| StegaError::WriteError {
                path: target.clone(),
                source,
            })?;
        written.push(target);
    }

    Ok(written)
}
