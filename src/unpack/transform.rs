//! The unpack transform: packed payload in, standard archive out.
//!
//! The stock transform reads the payload as a POSIX tar stream and writes each
//! entry into a zip (jar) archive. Other transforms plug in through
//! [`PackUnpacker`].

use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path};
use tar::Archive as TarArchive;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::PatchFsError;
use crate::fs_ops::io_error_with_help;

/// Reconstitutes a standard archive from a packed payload.
pub trait PackUnpacker {
    /// Read the payload from `input` and write archive entries into `output`.
    /// `origin` is the payload path, for error context. Returns the number of
    /// entries written. Finalizing `output` is the caller's job.
    fn unpack(
        &self,
        origin: &Path,
        input: &mut dyn Read,
        output: &mut ZipWriter<File>,
    ) -> Result<usize, PatchFsError>;
}

/// Tar payload -> zip archive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarPackUnpacker;

impl PackUnpacker for TarPackUnpacker {
    fn unpack(
        &self,
        origin: &Path,
        input: &mut dyn Read,
        output: &mut ZipWriter<File>,
    ) -> Result<usize, PatchFsError> {
        let mut archive = TarArchive::new(input);
        let entries = archive
            .entries()
            .map_err(io_error_with_help("read packed entries", origin))?;

        let mut written = 0;
        for entry in entries {
            let mut entry = entry.map_err(io_error_with_help("read packed entry", origin))?;
            let raw_path = entry
                .path()
                .map_err(io_error_with_help("decode entry path", origin))?
                .into_owned();
            let name = archive_name(origin, &raw_path)?;
            let kind = entry.header().entry_type();
            let mode = entry.header().mode().unwrap_or(0o644);

            let archive_err = |source| PatchFsError::Archive {
                path: origin.to_path_buf(),
                source,
            };

            if kind.is_dir() {
                let options = SimpleFileOptions::default().unix_permissions(mode);
                output.add_directory(name, options).map_err(archive_err)?;
            } else if kind.is_file() {
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .unix_permissions(mode);
                output.start_file(name, options).map_err(archive_err)?;
                io::copy(&mut entry, output)
                    .map_err(io_error_with_help("write archive entry from", origin))?;
            } else {
                debug!(entry = %raw_path.display(), ?kind, "Skipping non-file entry");
                continue;
            }
            written += 1;
        }
        Ok(written)
    }
}

/// Convert a tar entry path into a `/`-separated archive name.
/// Absolute paths and `..` segments mean the payload cannot be trusted.
fn archive_name(origin: &Path, raw: &Path) -> Result<String, PatchFsError> {
    let mut parts = Vec::new();
    for comp in raw.components() {
        match comp {
            Component::Normal(p) => parts.push(p.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(PatchFsError::CorruptPayload {
                    path: origin.to_path_buf(),
                    reason: format!("unsafe entry path '{}'", raw.display()),
                });
            }
        }
    }
    if parts.is_empty() {
        return Err(PatchFsError::CorruptPayload {
            path: origin.to_path_buf(),
            reason: "empty entry path".into(),
        });
    }
    Ok(parts.join("/"))
}
