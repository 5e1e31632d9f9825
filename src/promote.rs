//! Promotion phase: flatten the tree onto its root.
//!
//! Walks every file under the target directory. Useful files found in
//! subfolders are moved up to the root (name collisions resolved with a
//! `_copia` rename); junk files are deleted and their size accumulated as
//! freed space; archive files are recorded for the extraction phase.
//! Files already at the root are left untouched.
//!
//! Per-file failures are logged and skipped — the walk always finishes.

use crate::classify::{Disposition, Ruleset};
use crate::error::{OrganizeError, OrganizeResult};
use crate::fsutil::resolve_collision;
use crate::output::OutputFormatter;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Aggregate result of one promotion pass.
#[derive(Debug, Default)]
pub struct PromoteStats {
    /// Files moved (or that would be moved) to the root.
    pub moved: usize,
    /// Junk files removed (or that would be removed).
    pub removed: usize,
    /// Space freed by junk removal, in binary megabytes.
    pub freed_mb: f64,
    /// Human-readable `from → to` descriptions of the moves.
    pub moved_list: Vec<String>,
    /// Relative paths of the removed junk files.
    pub removed_list: Vec<String>,
    /// Names of archive files now present at the root, in discovery order.
    /// Handed to the extraction phase.
    pub archives_found: Vec<String>,
}

/// Promotes useful files to the root and deletes junk.
///
/// In dry-run mode every detection, log line and counter behaves the same
/// but nothing on disk changes. Fails with
/// [`OrganizeError::RootNotFound`] before any work if `root` is missing.
pub fn promote(
    root: &Path,
    ruleset: &Ruleset,
    dry_run: bool,
    verbose: bool,
) -> OrganizeResult<PromoteStats> {
    if !root.exists() {
        return Err(OrganizeError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut stats = PromoteStats::default();

    // Materialize the walk before mutating, so files moved to the root are
    // never yielded a second time.
    let entries: Vec<_> = WalkDir::new(root).min_depth(1).into_iter().collect();

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                OutputFormatter::warning(&format!("Error while walking: {}", e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let at_root = entry.depth() == 1;

        if at_root {
            // Root files stay put; archives among them still feed the
            // extraction phase.
            if let Disposition::Keep { archive: true } = ruleset.classify(&name) {
                stats.archives_found.push(name);
            }
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        match ruleset.classify(&name) {
            Disposition::Keep { archive } => {
                let target = resolve_collision(root.join(&name));
                let target_name = target
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| name.clone());

                if verbose {
                    OutputFormatter::plain(&format!(
                        "MOVING: {} → {}",
                        relative.display(),
                        target_name
                    ));
                }

                if !dry_run {
                    if let Err(e) = fs::rename(path, &target) {
                        OutputFormatter::error(&format!(
                            "Failed to move {}: {}",
                            relative.display(),
                            e
                        ));
                        continue;
                    }
                }

                stats.moved += 1;
                stats
                    .moved_list
                    .push(format!("{} → {}", relative.display(), target_name));
                if archive {
                    stats.archives_found.push(target_name);
                }
            }
            Disposition::Junk => {
                let size_mb = entry
                    .metadata()
                    .map(|m| m.len() as f64 / BYTES_PER_MB)
                    .unwrap_or(0.0);

                if verbose {
                    OutputFormatter::plain(&format!(
                        "REMOVING: {} ({:.2} MB)",
                        relative.display(),
                        size_mb
                    ));
                }

                if !dry_run {
                    if let Err(e) = fs::remove_file(path) {
                        OutputFormatter::error(&format!(
                            "Failed to remove {}: {}",
                            relative.display(),
                            e
                        ));
                        continue;
                    }
                }

                stats.removed += 1;
                stats.freed_mb += size_mb;
                stats.removed_list.push(relative.display().to_string());
            }
        }
    }

    Ok(stats)
}
