//! Integration tests for limpa
//!
//! These tests exercise the complete three-phase pipeline the way an
//! operator would run it: promotion and pruning over a nested tree,
//! archive extraction into the staging area, and categorization of the
//! flattened root.

use limpa::classify::Ruleset;
use limpa::extract::{extract_all, STAGING_DIR};
use limpa::{categorize_by_extension, load_ruleset, promote, prune_empty_dirs};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture that sets up a temporary directory with a configurable
/// file structure.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (parents included) at a path relative to the root.
    fn create_file(&self, rel_path: &str, content: &[u8]) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    /// Create a real zip archive with the given entries.
    fn create_zip(&self, rel_path: &str, entries: &[(&str, &str)]) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let file = File::create(&file_path).expect("Failed to create zip file");
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), options)
                .expect("Failed to start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip");
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Sorted relative listing of every file and directory under the root,
    /// for byte-for-byte dry-run comparisons.
    fn snapshot(&self) -> Vec<PathBuf> {
        let mut listing: Vec<PathBuf> = walkdir::WalkDir::new(self.path())
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.path().strip_prefix(self.path()).unwrap().to_path_buf())
            .collect();
        listing.sort();
        listing
    }
}

// ============================================================================
// End-to-end pipeline
// ============================================================================

/// The canonical scenario: one subfolder holding a document, a junk file
/// and a zip archive, pushed through all three phases.
#[test]
fn test_full_pipeline_scenario() {
    let fixture = TestFixture::new();
    fixture.create_file("sub/report.pdf", b"pdf content");
    fixture.create_file("sub/thumbs.db", b"junk bytes");
    fixture.create_zip("sub/archive.zip", &[("inside.txt", "hello")]);
    let ruleset = Ruleset::default();

    // Phase 1: promote + prune.
    let stats = promote(fixture.path(), &ruleset, false, false).expect("promote failed");
    let pruned = prune_empty_dirs(fixture.path());

    assert_eq!(stats.moved, 2);
    assert_eq!(stats.removed, 1);
    assert!(stats.freed_mb > 0.0);
    assert_eq!(stats.archives_found, vec!["archive.zip".to_string()]);
    assert_eq!(pruned, 1);
    fixture.assert_file_exists("report.pdf");
    fixture.assert_file_exists("archive.zip");
    fixture.assert_not_exists("sub");

    // Phase 2: extraction.
    let extract_stats = extract_all(fixture.path(), &stats.archives_found, false);
    assert_eq!(extract_stats.extracted, 1);
    assert_eq!(extract_stats.relocated, 1);
    assert!(extract_stats.errors.is_empty());
    fixture.assert_file_exists(&format!("{}/archive_quak/inside.txt", STAGING_DIR));
    fixture.assert_file_exists(&format!("{}/archive.zip", STAGING_DIR));
    fixture.assert_not_exists("archive.zip");

    // Phase 3: categorization.
    let cat_stats =
        categorize_by_extension(fixture.path(), &ruleset, false, false).expect("categorize failed");
    assert_eq!(cat_stats.moved, 1);
    assert_eq!(cat_stats.dirs_created, 1);
    fixture.assert_file_exists("Documentos/report.pdf");
}

#[test]
fn test_promoted_zip_is_extracted_under_its_root_name() {
    let fixture = TestFixture::new();
    fixture.create_zip("lectures/notes.zip", &[("aula1.md", "conteúdo")]);
    let ruleset = Ruleset::default();

    let stats = promote(fixture.path(), &ruleset, false, false).expect("promote failed");
    fixture.assert_file_exists("notes.zip");
    assert_eq!(stats.archives_found, vec!["notes.zip".to_string()]);

    extract_all(fixture.path(), &stats.archives_found, true);
    fixture.assert_file_exists(&format!("{}/notes_quak/aula1.md", STAGING_DIR));
    fixture.assert_file_exists(&format!("{}/notes.zip", STAGING_DIR));
    fixture.assert_not_exists("notes.zip");
}

// ============================================================================
// Dry-run guarantees
// ============================================================================

#[test]
fn test_dry_run_leaves_the_tree_identical() {
    let fixture = TestFixture::new();
    fixture.create_file("sub/report.pdf", b"pdf");
    fixture.create_file("sub/thumbs.db", b"junk");
    fixture.create_file("deep/a/b/code.py", b"print()");
    fixture.create_file("loose.txt", b"txt");
    let ruleset = Ruleset::default();

    let before = fixture.snapshot();

    let promote_stats =
        promote(fixture.path(), &ruleset, true, false).expect("promote failed");
    let cat_stats =
        categorize_by_extension(fixture.path(), &ruleset, true, false).expect("categorize failed");

    assert_eq!(fixture.snapshot(), before);
    // Counts still report what would happen.
    assert_eq!(promote_stats.moved, 2);
    assert_eq!(promote_stats.removed, 1);
    assert_eq!(cat_stats.moved, 1);
    assert_eq!(cat_stats.dirs_created, 0);
}

// ============================================================================
// Collision handling
// ============================================================================

#[test]
fn test_two_same_named_files_both_survive_promotion() {
    let fixture = TestFixture::new();
    fixture.create_file("a/x.pdf", b"first");
    fixture.create_file("b/x.pdf", b"second");
    let ruleset = Ruleset::default();

    promote(fixture.path(), &ruleset, false, false).expect("promote failed");

    fixture.assert_file_exists("x.pdf");
    fixture.assert_file_exists("x_copia.pdf");
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_promote_and_prune_twice_is_a_noop_the_second_time() {
    let fixture = TestFixture::new();
    fixture.create_file("sub/report.pdf", b"pdf");
    fixture.create_file("sub/nested/notes.txt", b"txt");
    fixture.create_file("sub/thumbs.db", b"junk");
    let ruleset = Ruleset::default();

    promote(fixture.path(), &ruleset, false, false).expect("first promote failed");
    prune_empty_dirs(fixture.path());

    let second = promote(fixture.path(), &ruleset, false, false).expect("second promote failed");
    let pruned = prune_empty_dirs(fixture.path());

    assert_eq!(second.moved, 0);
    assert_eq!(second.removed, 0);
    assert_eq!(pruned, 0);
}

// ============================================================================
// Pruning edge cases
// ============================================================================

#[test]
fn test_prune_removes_emptied_folders_and_keeps_occupied_ones() {
    let fixture = TestFixture::new();
    fixture.create_file("emptied/report.pdf", b"pdf");
    fixture.create_file("occupied/report.pdf", b"pdf");
    fixture.create_file("occupied/leftover.bin", b"bin");
    let ruleset = Ruleset::default();

    promote(fixture.path(), &ruleset, false, false).expect("promote failed");
    // Promotion emptied both folders; put a file back into one of them to
    // model a directory that still holds something when pruning runs.
    fixture.create_file("occupied/leftover.bin", b"bin");

    let pruned = prune_empty_dirs(fixture.path());

    assert_eq!(pruned, 1);
    fixture.assert_not_exists("emptied");
    fixture.assert_file_exists("occupied/leftover.bin");
}

// ============================================================================
// Configuration overrides
// ============================================================================

#[test]
fn test_config_overrides_shape_the_whole_pipeline() {
    let fixture = TestFixture::new();
    fixture.create_file(
        "limpa.toml",
        br#"
[rules]
extra_junk = ["ads.html"]

[rules.extra_extensions]
Documentos = ["epub"]
"#,
    );
    fixture.create_file("sub/book.epub", b"epub");
    fixture.create_file("sub/ads.html", b"ad");
    let ruleset = load_ruleset(fixture.path(), None).expect("load ruleset failed");

    let stats = promote(fixture.path(), &ruleset, false, false).expect("promote failed");
    assert_eq!(stats.moved, 1);
    assert_eq!(stats.removed, 1);
    fixture.assert_file_exists("book.epub");

    categorize_by_extension(fixture.path(), &ruleset, false, false).expect("categorize failed");
    fixture.assert_file_exists("Documentos/book.epub");
}

// ============================================================================
// Extraction failure isolation
// ============================================================================

#[test]
fn test_failed_archive_does_not_block_the_rest() {
    let fixture = TestFixture::new();
    fixture.create_file("broken.zip", b"not a zip at all");
    fixture.create_zip("fine.zip", &[("ok.txt", "ok")]);
    let ruleset = Ruleset::default();

    let stats = promote(fixture.path(), &ruleset, false, false).expect("promote failed");
    let mut archives = stats.archives_found;
    archives.sort();
    assert_eq!(archives, vec!["broken.zip".to_string(), "fine.zip".to_string()]);

    let extract_stats = extract_all(fixture.path(), &archives, true);
    assert_eq!(extract_stats.extracted, 1);
    assert_eq!(extract_stats.errors.len(), 1);
    assert_eq!(extract_stats.errors[0].archive, "broken.zip");
    // The broken one stays at the root, its empty folder cleaned up.
    fixture.assert_file_exists("broken.zip");
    fixture.assert_not_exists(&format!("{}/broken_quak", STAGING_DIR));
    fixture.assert_file_exists(&format!("{}/fine_quak/ok.txt", STAGING_DIR));
}
