//! Staging of gzip-compressed payloads.
//! The payload is fully inflated into a sibling `.gunzip` file before the
//! unpack transform sees it, so a truncated or corrupt gzip stream fails here
//! deterministically instead of midway through the archive.

use flate2::read::MultiGzDecoder;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::PatchFsError;
use crate::fs_ops::{copy_streams, describe_io_error, io_error_with_help};

/// Payload names ending in this are inflated before unpacking.
pub const GZIP_SUFFIX: &str = ".gz";
/// Suffix of the inflated sibling file.
pub const GUNZIP_SUFFIX: &str = ".gunzip";

pub fn is_gzipped(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(GZIP_SUFFIX))
        .unwrap_or(false)
}

/// `<path>.gunzip`, next to `path`.
pub fn gunzip_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(GUNZIP_SUFFIX);
    PathBuf::from(name)
}

/// Deletes the file at `path` when dropped (best-effort).
/// Create the guard before the file so a half-written file is covered too.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staging file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %describe_io_error("delete", &self.path, &e),
                "Failed to delete staging file"
            ),
        }
    }
}

/// Inflate `compressed` (read from `origin`) into the file at `dest`.
/// Concatenated gzip members are all inflated, in order.
/// Both streams are closed when this returns.
pub fn gunzip_into(origin: &Path, compressed: File, dest: &Path) -> Result<u64, PatchFsError> {
    let out = File::create(dest).map_err(io_error_with_help("create staging file", dest))?;
    let bytes = copy_streams(MultiGzDecoder::new(compressed), out)
        .map_err(io_error_with_help("gunzip", origin))?;
    debug!(src = %origin.display(), staged = %dest.display(), bytes, "Inflated payload");
    Ok(bytes)
}
