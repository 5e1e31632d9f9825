//! Small filesystem helpers shared by the phases.

use std::path::{Path, PathBuf};

/// Infix appended before the extension when a move target already exists.
pub const COPY_INFIX: &str = "_copia";

/// Returns the `_copia` variant of a path: `report.pdf` → `report_copia.pdf`.
pub fn copia_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let renamed = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, COPY_INFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, COPY_INFIX),
    };
    path.with_file_name(renamed)
}

/// Resolves a destination collision with a single `_copia` rename.
///
/// Only one attempt is made: if the `_copia` name is also taken, the
/// returned path collides and the underlying rename decides the outcome
/// (overwrite on Unix). Known limitation, kept from the single-attempt
/// collision policy.
pub fn resolve_collision(target: PathBuf) -> PathBuf {
    if target.exists() {
        copia_path(&target)
    } else {
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copia_path_with_extension() {
        assert_eq!(
            copia_path(Path::new("/tmp/report.pdf")),
            PathBuf::from("/tmp/report_copia.pdf")
        );
    }

    #[test]
    fn test_copia_path_without_extension() {
        assert_eq!(
            copia_path(Path::new("/tmp/README")),
            PathBuf::from("/tmp/README_copia")
        );
    }

    #[test]
    fn test_resolve_collision_free_target_is_unchanged() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("a.txt");
        assert_eq!(resolve_collision(target.clone()), target);
    }

    #[test]
    fn test_resolve_collision_taken_target_gets_infix() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("a.txt");
        fs::write(&target, "x").expect("Failed to write file");
        assert_eq!(
            resolve_collision(target),
            temp.path().join("a_copia.txt")
        );
    }
}
