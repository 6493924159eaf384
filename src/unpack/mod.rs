//! Packed archive unpacking.
//!
//! Pipeline:
//! 1. Create/truncate the target and wrap it in a zip writer.
//! 2. Open the packed payload.
//! 3. If the payload name ends in `.gz`, inflate it into `<payload>.gunzip`
//!    and read from that instead.
//! 4. Run the unpack transform into the zip writer and finalize it.
//!
//! Every handle lives inside [`unpack_into`], so all of them are closed when it
//! returns; the `.gunzip` file is removed by a drop guard declared before any of
//! them. A failed unpack also discards the partially written target.

mod staging;
mod transform;

pub use staging::{gunzip_path, is_gzipped, GUNZIP_SUFFIX, GZIP_SUFFIX};
pub use transform::{PackUnpacker, TarPackUnpacker};

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{info, warn};
use zip::ZipWriter;

use crate::errors::PatchFsError;
use crate::fs_ops::{describe_io_error, io_error_with_help};
use staging::{gunzip_into, TempFileGuard};

/// Unpack `packed` into a standard archive at `target` with the tar transform.
pub fn unpack_packed_archive(packed: &Path, target: &Path) -> bool {
    unpack_packed_archive_with(packed, target, &TarPackUnpacker)
}

/// Unpack `packed` into `target` with a caller-chosen transform.
/// Returns false (and logs why) on any failure.
pub fn unpack_packed_archive_with(
    packed: &Path,
    target: &Path,
    unpacker: &dyn PackUnpacker,
) -> bool {
    let target_file = match File::create(target) {
        Ok(f) => f,
        Err(e) => {
            warn!(
                jar = %packed.display(),
                error = %describe_io_error("create target", target, &e),
                "Failed to unpack packed archive"
            );
            return false;
        }
    };

    match unpack_into(packed, target, target_file, unpacker) {
        Ok(entries) => {
            info!(jar = %packed.display(), target = %target.display(), entries, "Unpacked packed archive");
            true
        }
        Err(e) => {
            warn!(
                jar = %packed.display(),
                code = e.code(),
                error = %e,
                "Failed to unpack packed archive"
            );
            discard_partial_target(target);
            false
        }
    }
}

fn unpack_into(
    packed: &Path,
    target: &Path,
    target_file: File,
    unpacker: &dyn PackUnpacker,
) -> Result<usize, PatchFsError> {
    // Declared first so it drops last, after every handle onto the staged file.
    let mut staged: Option<TempFileGuard> = None;

    let mut archive = ZipWriter::new(target_file);
    let packed_in = File::open(packed).map_err(io_error_with_help("open packed", packed))?;

    let input = if is_gzipped(packed) {
        let guard = staged.insert(TempFileGuard::new(gunzip_path(packed)));
        gunzip_into(packed, packed_in, guard.path())?;
        File::open(guard.path()).map_err(io_error_with_help("reopen staging file", guard.path()))?
    } else {
        packed_in
    };

    let mut reader = BufReader::new(input);
    let entries = unpacker.unpack(packed, &mut reader, &mut archive)?;
    archive.finish().map_err(|source| PatchFsError::Archive {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(entries)
}

fn discard_partial_target(target: &Path) {
    match fs::remove_file(target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %target.display(),
            error = %describe_io_error("delete", target, &e),
            "Failed to discard partial archive"
        ),
    }
}
