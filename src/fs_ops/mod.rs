//! Filesystem operations: replace, copy and line reading.

pub mod helpers;
mod io_copy;
mod lines;
mod replace;

pub use helpers::{describe_io_error, io_error_with_help};
pub use io_copy::copy_file;
pub(crate) use io_copy::copy_streams;
pub use lines::{read_lines, read_lines_from_path};
pub use replace::{displaced_path, replace, replace_with_outcome, Strategy, OLD_SUFFIX};
