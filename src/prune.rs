//! Best-effort removal of directories left empty by promotion.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Removes every empty directory under `root`, deepest first, and returns
/// the number removed. The root itself is never removed.
///
/// Deepest-first ordering lets a parent become empty once its children are
/// gone and still be removed in the same pass. `remove_dir` refuses
/// non-empty directories, so failures (races, permissions) are simply
/// skipped; this phase is cleanup, never fatal.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if entry.file_type().is_dir() && fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}
