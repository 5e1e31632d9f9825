//! Categorization phase: sort root-level files into category folders.
//!
//! Runs over the direct children of the root only, after promotion and
//! extraction have flattened the tree and relocated the archives. Archive
//! files and the organizer's own entry point are skipped; files whose
//! extension maps to no category are left in place.

use crate::classify::{extension_of, is_archive_extension, is_organizer_file, Ruleset};
use crate::error::{OrganizeError, OrganizeResult};
use crate::fsutil::resolve_collision;
use crate::output::OutputFormatter;
use std::fs;
use std::path::Path;

/// Aggregate result of one categorization pass.
#[derive(Debug, Default)]
pub struct CategorizeStats {
    /// Files moved (or that would be moved) into category folders.
    pub moved: usize,
    /// Category folders newly created by this pass.
    pub dirs_created: usize,
    /// Ordered `name → Category/` descriptions of the moves.
    pub moves: Vec<String>,
}

/// Moves root-level files into per-category subfolders by extension.
///
/// Prints a per-category preview before moving anything. In dry-run mode
/// the same counts and move list are produced without touching the
/// filesystem. Destination collisions are resolved once with the same
/// `_copia` rename used during promotion.
pub fn categorize_by_extension(
    root: &Path,
    ruleset: &Ruleset,
    dry_run: bool,
    verbose: bool,
) -> OrganizeResult<CategorizeStats> {
    if !root.exists() {
        return Err(OrganizeError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut names: Vec<String> = fs::read_dir(root)
        .map_err(|e| OrganizeError::Io {
            context: format!("Failed to read directory {}", root.display()),
            source: e,
        })?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if entry.file_type().ok()?.is_file() {
                Some(entry.file_name().to_string_lossy().to_string())
            } else {
                None
            }
        })
        .collect();
    names.sort();

    // Preview counts, in category table order.
    let mut rows: Vec<(&str, usize)> = ruleset
        .categories()
        .iter()
        .map(|(category, _)| (category.dir_name(), 0))
        .collect();
    for name in &names {
        if let Some(category) = categorizable(ruleset, name) {
            if let Some(row) = rows.iter_mut().find(|(dir, _)| *dir == category.dir_name()) {
                row.1 += 1;
            }
        }
    }
    let total: usize = rows.iter().map(|(_, count)| count).sum();
    OutputFormatter::summary_table(&rows, total);

    let mut stats = CategorizeStats::default();

    for name in &names {
        let category = match categorizable(ruleset, name) {
            Some(c) => c,
            None => continue,
        };
        let category_dir = root.join(category.dir_name());

        if !dry_run && !category_dir.exists() {
            match fs::create_dir(&category_dir) {
                Ok(()) => stats.dirs_created += 1,
                Err(e) => {
                    OutputFormatter::error(&format!(
                        "Failed to create {}: {}",
                        category_dir.display(),
                        e
                    ));
                    continue;
                }
            }
        }

        if verbose {
            OutputFormatter::plain(&format!("MOVING: {} → {}/", name, category.dir_name()));
        }

        if !dry_run {
            let target = resolve_collision(category_dir.join(name));
            if let Err(e) = fs::rename(root.join(name), &target) {
                OutputFormatter::error(&format!("Failed to move {}: {}", name, e));
                continue;
            }
        }

        stats.moved += 1;
        stats
            .moves
            .push(format!("{} → {}/", name, category.dir_name()));
    }

    Ok(stats)
}

/// The category a root file should move to, or `None` when it must stay:
/// the organizer itself, archives (owned by the staging flow) and
/// extensions outside the category table.
fn categorizable(ruleset: &Ruleset, name: &str) -> Option<crate::classify::Category> {
    if is_organizer_file(name) {
        return None;
    }
    let ext = extension_of(name);
    if is_archive_extension(&ext) {
        return None;
    }
    ruleset.category_for(&ext)
}
