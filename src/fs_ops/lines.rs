//! Line reader.
//! Reads a text resource to the end and returns its lines in order. The reader
//! is taken by value, so it is closed when this returns, whichever way.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use super::helpers::io_error_with_help;
use crate::errors::PatchFsError;

/// Read every line of `reader`.
///
/// - `\n`, `\r\n` and a lone `\r` all end a line and are stripped.
/// - Blank lines come back as empty strings.
/// - A trailing terminator does not add an empty last line.
/// - Non UTF-8 input fails with `ErrorKind::InvalidData`.
pub fn read_lines<R: Read>(reader: R) -> io::Result<Vec<String>> {
    let mut bin = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut chunk = Vec::new();
    loop {
        chunk.clear();
        if bin.read_until(b'\n', &mut chunk)? == 0 {
            break;
        }
        // A chunk holds at most one `\n`, at its end; any `\r` left inside
        // after trimming the terminator is a line break of its own.
        let body = match chunk.strip_suffix(b"\n") {
            Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
            None => chunk.strip_suffix(b"\r").unwrap_or(&chunk[..]),
        };
        for piece in body.split(|&b| b == b'\r') {
            lines.push(decode_line(piece)?);
        }
    }
    Ok(lines)
}

fn decode_line(bytes: &[u8]) -> io::Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Open `path` and read its lines.
pub fn read_lines_from_path(path: &Path) -> Result<Vec<String>, PatchFsError> {
    let file = File::open(path).map_err(io_error_with_help("open", path))?;
    read_lines(file).map_err(io_error_with_help("read lines from", path))
}
