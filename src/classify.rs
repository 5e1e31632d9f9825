/// File classification tables and the keep/junk decision.
///
/// This module holds the static rule tables the whole pipeline runs on:
/// the junk-name set, the ordered category table and the archive extension
/// set. Classification is a pure function over those tables.
///
/// # Examples
///
/// ```
/// use limpa::classify::{Disposition, Ruleset};
///
/// let rules = Ruleset::default();
/// assert_eq!(rules.classify("notes.pdf"), Disposition::Keep { archive: false });
/// assert_eq!(rules.classify("stuff.zip"), Disposition::Keep { archive: true });
/// assert_eq!(rules.classify("Thumbs.db"), Disposition::Junk);
/// ```
use std::collections::HashSet;

/// Extensions treated as archives throughout the pipeline.
pub const ARCHIVE_EXTENSIONS: [&str; 3] = ["zip", "rar", "7z"];

/// The tool's own entry-point names, never categorized.
pub const ORGANIZER_NAMES: [&str; 2] = ["limpa", "limpa.exe"];

/// What the pipeline should do with a file, decided by name and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Useful file: promoted to the root and later categorized.
    /// `archive` marks it as a candidate for the extraction phase.
    Keep { archive: bool },
    /// Deleted during promotion. Anything not explicitly allowed is junk.
    Junk,
}

/// A broad file category, mapped to a subfolder of the organized root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Office documents (PDF, DOC, PPT, XLS, ...)
    Documents,
    /// Source code and build artifacts (Java, Python, C, JAR, ...)
    Code,
    /// Plain-text formats (TXT, MD, CSV)
    Text,
    /// Images (PNG, JPG, GIF, SVG)
    Images,
    /// Archives (ZIP, RAR, 7Z) — relocated to the staging area, never
    /// moved into a category folder.
    Archives,
}

impl Category {
    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use limpa::classify::Category;
    ///
    /// assert_eq!(Category::Documents.dir_name(), "Documentos");
    /// assert_eq!(Category::Images.dir_name(), "Imagens");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Documents => "Documentos",
            Category::Code => "Código",
            Category::Text => "Texto",
            Category::Images => "Imagens",
            Category::Archives => "Compactados",
        }
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Documents => "Office documents",
            Category::Code => "Source code",
            Category::Text => "Plain text",
            Category::Images => "Images",
            Category::Archives => "Compressed archives",
        }
    }
}

/// The immutable rule tables driving classification and categorization.
///
/// Built once at startup (defaults plus optional TOML overrides, see
/// [`crate::config`]) and shared read-only by every phase. The category
/// table is ordered: when an extension appears in more than one category,
/// the first declaration wins. The allowed-extension set is the union of
/// all category extensions, so the two tables cannot drift apart.
#[derive(Debug, Clone)]
pub struct Ruleset {
    junk_names: HashSet<String>,
    categories: Vec<(Category, Vec<String>)>,
    allowed: HashSet<String>,
}

impl Ruleset {
    /// Creates the default ruleset with the standard tables.
    pub fn new() -> Self {
        let junk_names = [
            "index.html",
            "index.htm",
            "index.php",
            "thumbs.db",
            ".ds_store",
            "desktop.ini",
            "comet_html_doc.xml",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let categories = vec![
            (
                Category::Documents,
                to_owned(&["pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx"]),
            ),
            (
                Category::Code,
                to_owned(&[
                    "java", "py", "c", "cpp", "h", "hpp", "js", "html", "css", "sql", "class",
                    "jar",
                ]),
            ),
            (Category::Text, to_owned(&["txt", "md", "csv"])),
            (Category::Images, to_owned(&["png", "jpg", "jpeg", "gif", "svg"])),
            (Category::Archives, to_owned(&ARCHIVE_EXTENSIONS)),
        ];

        let mut ruleset = Self {
            junk_names,
            categories,
            allowed: HashSet::new(),
        };
        ruleset.rebuild_allowed();
        ruleset
    }

    /// Adds a filename to the junk set (case-insensitive match).
    pub fn add_junk_name(&mut self, name: &str) {
        self.junk_names.insert(name.to_lowercase());
    }

    /// Adds an extension to a category and to the allowed set.
    ///
    /// The extension is normalized: lowercased, leading dot stripped.
    pub fn add_extension(&mut self, category: Category, ext: &str) {
        let ext = normalize_extension(ext);
        if let Some((_, exts)) = self.categories.iter_mut().find(|(c, _)| *c == category) {
            if !exts.contains(&ext) {
                exts.push(ext.clone());
            }
        }
        self.allowed.insert(ext);
    }

    /// Decides what to do with a file, from its base name alone.
    ///
    /// A junk-name match always wins, even when the extension would
    /// otherwise be keepable (`index.html` is junk despite `html` being an
    /// allowed extension). Anything with an extension outside the allowed
    /// set is junk too.
    pub fn classify(&self, name: &str) -> Disposition {
        if self.junk_names.contains(&name.to_lowercase()) {
            return Disposition::Junk;
        }
        let ext = extension_of(name);
        if self.allowed.contains(&ext) {
            Disposition::Keep {
                archive: is_archive_extension(&ext),
            }
        } else {
            Disposition::Junk
        }
    }

    /// Returns the category for an extension, first match in declaration
    /// order, or `None` when no category lists it.
    pub fn category_for(&self, ext: &str) -> Option<Category> {
        let ext = normalize_extension(ext);
        self.categories
            .iter()
            .find(|(_, exts)| exts.contains(&ext))
            .map(|(category, _)| *category)
    }

    /// The category table in declaration order, for previews and the
    /// `--extensions` listing.
    pub fn categories(&self) -> &[(Category, Vec<String>)] {
        &self.categories
    }

    fn rebuild_allowed(&mut self) {
        self.allowed = self
            .categories
            .iter()
            .flat_map(|(_, exts)| exts.iter().cloned())
            .collect();
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased extension of a file name, without the dot. Empty when the
/// name has no extension.
pub fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Whether an already-normalized extension is an archive extension.
pub fn is_archive_extension(ext: &str) -> bool {
    ARCHIVE_EXTENSIONS.contains(&ext)
}

/// Whether a root-level file is the organizer itself.
pub fn is_organizer_file(name: &str) -> bool {
    ORGANIZER_NAMES
        .iter()
        .any(|n| name.eq_ignore_ascii_case(n))
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

fn to_owned(exts: &[&str]) -> Vec<String> {
    exts.iter().map(|s| s.to_string()).collect()
}
