//! I/O error hints.
//!
//! Turns raw OS error codes into short, actionable hints so a failed replace or
//! unpack can be diagnosed from the log line alone (locked files on Windows,
//! read-only mounts, cross-device renames, ...).
//!
//! Usage:
//!   // in functions returning Result<_, PatchFsError>
//!   File::open(p).map_err(io_error_with_help("open source", p))?;
//!
//!   // when the error is only logged
//!   warn!(error = %describe_io_error("delete", p, &e), "...");

use std::io;
use std::path::Path;

use crate::errors::PatchFsError;

/// Platform-aware hint for an io::Error, with the OS code appended.
/// Returns an empty string when there is nothing useful to add.
pub fn hint_suffix(e: &io::Error) -> String {
    let mut hint = String::new();

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let text = match code {
                libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
                libc::EXDEV => "cross-filesystem; rename not possible, copy instead",
                libc::EBUSY | libc::ETXTBSY => "file busy; another process holds it open",
                libc::ENOENT => "path not found; verify it exists",
                libc::EEXIST | libc::ENOTEMPTY => "target already exists and cannot be replaced",
                libc::EISDIR => "is a directory; expected a regular file",
                libc::ENOSPC => "insufficient space on device",
                libc::EROFS => "read-only filesystem; cannot write here",
                libc::ELOOP => "too many symbolic link levels (ELOOP); possible symlink cycle",
                libc::ENAMETOOLONG => "filename or path too long",
                libc::EMFILE => "process file descriptor limit reached",
                _ => "",
            };
            push_hint(&mut hint, text);
        }
        #[cfg(windows)]
        {
            use windows_sys::Win32::Foundation::{
                ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_DISK_FULL, ERROR_FILE_EXISTS,
                ERROR_FILE_NOT_FOUND, ERROR_LOCK_VIOLATION, ERROR_NOT_SAME_DEVICE,
                ERROR_PATH_NOT_FOUND, ERROR_SHARING_VIOLATION, ERROR_WRITE_PROTECT,
            };
            let text = match code as u32 {
                ERROR_ACCESS_DENIED => "access denied; the file may be open or read-only",
                ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION => {
                    "sharing violation; file is in use by another process"
                }
                ERROR_NOT_SAME_DEVICE => "not same device; rename not possible, copy instead",
                ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => "path not found; verify it exists",
                ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => {
                    "target already exists and cannot be replaced"
                }
                ERROR_DISK_FULL => "insufficient disk space",
                ERROR_WRITE_PROTECT => "write protected / read-only media",
                _ => "",
            };
            push_hint(&mut hint, text);
        }
        hint.push_str(&format!(" [os code: {}]", code));
    } else {
        let text = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied; check ownership and write permissions",
            io::ErrorKind::NotFound => "path not found; verify it exists",
            io::ErrorKind::AlreadyExists => "target already exists",
            io::ErrorKind::UnexpectedEof => "stream ended early; input is truncated",
            io::ErrorKind::InvalidData => "input is corrupt or not in the expected format",
            _ => "",
        };
        push_hint(&mut hint, text);
    }

    hint
}

fn push_hint(buf: &mut String, text: &str) {
    if !text.is_empty() {
        buf.push_str(" (");
        buf.push_str(text);
        buf.push(')');
    }
}

/// One-line description of a failed operation, for log fields.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    format!("{} '{}': {}{}", op, path.display(), e, hint_suffix(e))
}

/// Adapter for `.map_err(...)`: io::Error -> PatchFsError::Io carrying op and path.
pub fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> PatchFsError + 'a {
    move |e: io::Error| PatchFsError::io(op, path, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_fallback_hint() {
        let e = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert!(hint_suffix(&e).contains("truncated"));
    }

    #[test]
    fn unknown_kind_has_no_hint() {
        let e = io::Error::other("boom");
        assert_eq!(hint_suffix(&e), "");
    }

    #[cfg(unix)]
    #[test]
    fn os_code_is_appended() {
        let e = io::Error::from_raw_os_error(libc::EROFS);
        let msg = describe_io_error("write", Path::new("/tmp/x"), &e);
        assert!(msg.contains("read-only filesystem"), "msg was: {msg}");
        assert!(msg.contains("[os code: "), "msg was: {msg}");
        assert!(msg.starts_with("write '/tmp/x'"), "msg was: {msg}");
    }

    #[test]
    fn adapter_keeps_kind() {
        let p = Path::new("/tmp/test.txt");
        let err = io_error_with_help("create", p)(io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::AlreadyExists));
    }
}
