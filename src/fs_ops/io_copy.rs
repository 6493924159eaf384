//! Streaming byte copy.
//!
//! Features:
//! - Opens the source first so a missing source never truncates the target.
//! - Creates or truncates the target in place (same inode), which still works
//!   when the target is locked against rename/delete but open for writing.
//! - Buffered I/O with 1 MiB buffers to reduce syscall count.
//!
//! Both handles are owned by this function and dropped on every return path.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::helpers::io_error_with_help;
use crate::errors::PatchFsError;

pub(crate) const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

/// Copy the bytes of `source` over `target`, creating or truncating it.
/// Returns the number of bytes written.
pub fn copy_file(source: &Path, target: &Path) -> Result<u64, PatchFsError> {
    let src_f = File::open(source).map_err(io_error_with_help("open source", source))?;
    let dst_f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(target)
        .map_err(io_error_with_help("open target", target))?;

    copy_streams(src_f, dst_f).map_err(io_error_with_help("copy into", target))
}

/// Drain `reader` into `writer` through large buffers and flush.
pub(crate) fn copy_streams<R: Read, W: Write>(reader: R, writer: W) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, reader);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, writer);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}
