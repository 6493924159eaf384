//! Typed error definitions for patchfs.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

use crate::fs_ops::helpers::hint_suffix;

#[derive(Debug, Error)]
pub enum PatchFsError {
    #[error("{op} '{}': {source}{}", .path.display(), hint_suffix(.source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk root is not a listable directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("Corrupt packed payload {path}: {reason}")]
    CorruptPayload { path: PathBuf, reason: String },

    #[error("Archive write failed for {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

impl PatchFsError {
    /// Wrap an io::Error with the operation and path it came from.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PatchFsError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            PatchFsError::Io { .. } => 10,
            PatchFsError::RootNotDirectory(_) => 20,
            PatchFsError::CorruptPayload { .. } => 30,
            PatchFsError::Archive { .. } => 31,
        }
    }

    /// Underlying io::ErrorKind when this error came from the filesystem.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            PatchFsError::Io { source, .. } => Some(source.kind()),
            PatchFsError::Archive {
                source: ZipError::Io(e),
                ..
            } => Some(e.kind()),
            _ => None,
        }
    }
}
