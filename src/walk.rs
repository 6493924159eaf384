//! Iterative tree walker.
//!
//! Visits every file and directory below a root without recursion. Entries are
//! re-checked when they are popped, not when they are pushed, so anything
//! deleted by another process mid-walk is skipped silently. Visitation order is
//! stack order and must not be relied on.
//!
//! Symlinks are reported but never followed, so a link pointing back up the
//! tree cannot make the walk loop.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::PatchFsError;

/// Called once per existing path found by [`walk_tree`].
pub trait Visitor {
    fn visit(&mut self, path: &Path);
}

impl<F: FnMut(&Path)> Visitor for F {
    fn visit(&mut self, path: &Path) {
        self(path)
    }
}

/// Walk everything below `root` (the root itself is not visited).
///
/// Fails only if `root` cannot be listed. Directories that vanish or become
/// unreadable during the walk are skipped.
pub fn walk_tree<V: Visitor>(root: &Path, mut visitor: V) -> Result<(), PatchFsError> {
    let mut stack: VecDeque<PathBuf> = list_children(root).map_err(|e| {
        if e.kind() == io::ErrorKind::NotADirectory {
            PatchFsError::RootNotDirectory(root.to_path_buf())
        } else {
            PatchFsError::io("list walk root", root, e)
        }
    })?;

    while let Some(current) = stack.pop_front() {
        let meta = match fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(_) => {
                debug!(path = %current.display(), "Entry vanished before visit");
                continue;
            }
        };
        visitor.visit(&current);
        if meta.is_dir() {
            match list_children(&current) {
                Ok(children) => {
                    for child in children {
                        stack.push_front(child);
                    }
                }
                Err(e) => debug!(path = %current.display(), error = %e, "Skipping unlistable directory"),
            }
        }
    }
    Ok(())
}

/// Every path [`walk_tree`] would visit, in visitation order.
pub fn collect_tree(root: &Path) -> Result<Vec<PathBuf>, PatchFsError> {
    let mut paths = Vec::new();
    walk_tree(root, |p: &Path| paths.push(p.to_path_buf()))?;
    Ok(paths)
}

fn list_children(dir: &Path) -> io::Result<VecDeque<PathBuf>> {
    let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
    Ok(readable_entries(dir, entries))
}

/// Keep the entries that could be read; one bad entry does not hide its siblings.
fn readable_entries<I>(dir: &Path, entries: I) -> VecDeque<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .collect()
}
