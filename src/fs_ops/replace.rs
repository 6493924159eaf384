//! Replace a destination file with a source file "by hook or crook".
//!
//! Some platforms refuse to rename over a file that another process holds
//! open, so the replace walks an ordered table of strategies and stops at the
//! first one that works:
//! - `DirectRename`: plain `rename(source, dest)`; overwrites on POSIX.
//! - `DisplaceThenRename`: move `dest` aside to `dest_old`, rename `source`
//!   into place, then drop `dest_old`.
//! - `CopyOver`: stream the bytes of `source` over `dest` in place, then
//!   delete `source`. Works when `dest` is rename-locked but writable.
//!
//! Failures are logged and turned into `false`/`None`; there is no retry.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::helpers::describe_io_error;
use super::io_copy::copy_file;

/// Suffix of the sibling a displaced destination is parked under.
pub const OLD_SUFFIX: &str = "_old";

/// The technique that ended up replacing the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectRename,
    DisplaceThenRename,
    CopyOver,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::DirectRename => "direct-rename",
            Strategy::DisplaceThenRename => "displace-then-rename",
            Strategy::CopyOver => "copy-over",
        };
        f.write_str(s)
    }
}

type StrategyFn = fn(&Path, &Path) -> bool;

/// Tried in order; the first `true` wins.
const STRATEGIES: [(Strategy, StrategyFn); 3] = [
    (Strategy::DirectRename, direct_rename),
    (Strategy::DisplaceThenRename, displace_then_rename),
    (Strategy::CopyOver, copy_over),
];

/// Replace `destination` with `source`. Returns true if any strategy worked.
pub fn replace(source: &Path, destination: &Path) -> bool {
    replace_with_outcome(source, destination).is_some()
}

/// Like [`replace`], but reports which strategy succeeded.
pub fn replace_with_outcome(source: &Path, destination: &Path) -> Option<Strategy> {
    for (strategy, attempt) in STRATEGIES {
        if attempt(source, destination) {
            info!(
                src = %source.display(),
                dest = %destination.display(),
                %strategy,
                "Replaced file"
            );
            return Some(strategy);
        }
        debug!(%strategy, src = %source.display(), "Replace strategy did not succeed");
    }
    None
}

/// `<path>_old`, next to `path`.
pub fn displaced_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(OLD_SUFFIX);
    PathBuf::from(name)
}

fn direct_rename(source: &Path, destination: &Path) -> bool {
    match fs::rename(source, destination) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %describe_io_error("rename", source, &e), "Direct rename failed");
            false
        }
    }
}

fn displace_then_rename(source: &Path, destination: &Path) -> bool {
    if !destination.exists() {
        return false;
    }

    let displaced = displaced_path(destination);
    if displaced.exists() {
        if let Err(e) = fs::remove_file(&displaced) {
            // The renames below will most likely fail too; let them.
            warn!(
                path = %displaced.display(),
                error = %describe_io_error("delete", &displaced, &e),
                "Failed to delete old intermediate file"
            );
        }
    }

    if let Err(e) = fs::rename(destination, &displaced) {
        debug!(error = %describe_io_error("displace", destination, &e), "Could not move destination aside");
        return false;
    }

    match fs::rename(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(&displaced) {
                warn!(
                    path = %displaced.display(),
                    error = %describe_io_error("delete", &displaced, &e),
                    "Failed to delete intermediate file"
                );
            }
            true
        }
        Err(e) => {
            debug!(error = %describe_io_error("rename", source, &e), "Rename into vacated destination failed");
            // Put the original back so the next strategy (or the caller) still finds it.
            if let Err(e) = fs::rename(&displaced, destination) {
                warn!(
                    path = %displaced.display(),
                    error = %describe_io_error("restore", &displaced, &e),
                    "Failed to restore displaced destination"
                );
            }
            false
        }
    }
}

fn copy_over(source: &Path, destination: &Path) -> bool {
    match copy_file(source, destination) {
        Ok(bytes) => {
            debug!(bytes, dest = %destination.display(), "Copied source over destination");
            if let Err(e) = fs::remove_file(source) {
                warn!(
                    src = %source.display(),
                    dest = %destination.display(),
                    error = %describe_io_error("delete", source, &e),
                    "Failed to delete source after brute force copy"
                );
            }
            true
        }
        Err(e) => {
            warn!(
                src = %source.display(),
                dest = %destination.display(),
                code = e.code(),
                error = %e,
                "Failed to copy source over destination"
            );
            false
        }
    }
}
