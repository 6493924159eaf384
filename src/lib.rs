//! Core library for `patchfs`.
//!
//! Small, stateless filesystem operations for application updaters:
//! - replace a file even where the OS refuses to rename over open files,
//! - read a text resource into lines,
//! - unpack a (optionally gzipped) packed payload into a standard archive,
//! - walk a directory tree while other processes mutate it.
//!
//! Each call is independent; callers own retry policy and path selection.
//!
//! `config`, `output` and `platform` support the `patchfs` binary and are not
//! part of the core API, so nothing from them is re-exported here.

pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod unpack;
pub mod walk;

pub use errors::PatchFsError;
pub use fs_ops::{
    Strategy, copy_file, read_lines, read_lines_from_path, replace, replace_with_outcome,
};
pub use unpack::{PackUnpacker, TarPackUnpacker, unpack_packed_archive, unpack_packed_archive_with};
pub use walk::{Visitor, collect_tree, walk_tree};
