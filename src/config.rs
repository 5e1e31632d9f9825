//! Optional ruleset overrides loaded from a TOML file.
//!
//! The built-in tables cover the common case; a `limpa.toml` placed in the
//! target directory (or passed via `--config`) can extend them with extra
//! junk filenames and extra extensions per category. Overrides are merged
//! into the [`Ruleset`](crate::classify::Ruleset) once at startup; the
//! tables are immutable afterwards.
//!
//! # Configuration File Format
//!
//! ```toml
//! [rules]
//! extra_junk = ["lixo.tmp", "ads.html"]
//!
//! [rules.extra_extensions]
//! Documentos = ["epub", "odt"]
//! Código = ["rs"]
//! ```

use crate::classify::{Category, Ruleset};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default override filename, looked up inside the target directory.
pub const DEFAULT_CONFIG_NAME: &str = "limpa.toml";

/// Errors that can occur while loading ruleset overrides.
#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// A category name in `extra_extensions` does not match any category
    /// folder name.
    UnknownCategory(String),
    /// IO error while reading the configuration file.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::UnknownCategory(name) => {
                write!(
                    f,
                    "Unknown category '{}': expected one of Documentos, Código, Texto, Imagens, Compactados",
                    name
                )
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Ruleset overrides as deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub rules: RuleOverrides,
}

/// The `[rules]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleOverrides {
    /// Extra filenames to delete during promotion (case-insensitive).
    #[serde(default)]
    pub extra_junk: Vec<String>,

    /// Extra extensions per category folder name. BTreeMap keeps merge
    /// order deterministic.
    #[serde(default)]
    pub extra_extensions: BTreeMap<String, Vec<String>>,
}

impl RulesConfig {
    /// Loads overrides for a run on `root`.
    ///
    /// With an explicit `config_path` the file must exist. Without one,
    /// `<root>/limpa.toml` is used when present and an empty override set
    /// is returned otherwise.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::ConfigNotFound(p.to_path_buf()));
                }
                p.to_path_buf()
            }
            None => {
                let default = root.join(DEFAULT_CONFIG_NAME);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Merges these overrides into a ruleset.
    pub fn apply(&self, ruleset: &mut Ruleset) -> Result<(), ConfigError> {
        for name in &self.rules.extra_junk {
            ruleset.add_junk_name(name);
        }
        for (category_name, extensions) in &self.rules.extra_extensions {
            let category = category_by_name(category_name)
                .ok_or_else(|| ConfigError::UnknownCategory(category_name.clone()))?;
            for ext in extensions {
                ruleset.add_extension(category, ext);
            }
        }
        Ok(())
    }
}

/// Builds the effective ruleset for a run: defaults plus overrides.
pub fn load_ruleset(root: &Path, config_path: Option<&Path>) -> Result<Ruleset, ConfigError> {
    let config = RulesConfig::load(root, config_path)?;
    let mut ruleset = Ruleset::default();
    config.apply(&mut ruleset)?;
    Ok(ruleset)
}

fn category_by_name(name: &str) -> Option<Category> {
    [
        Category::Documents,
        Category::Code,
        Category::Text,
        Category::Images,
        Category::Archives,
    ]
    .into_iter()
    .find(|c| c.dir_name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Disposition;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_config_yields_defaults() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let ruleset = load_ruleset(temp.path(), None).expect("load should succeed");
        assert_eq!(
            ruleset.classify("notes.txt"),
            Disposition::Keep { archive: false }
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let missing = temp.path().join("nope.toml");
        let result = load_ruleset(temp.path(), Some(&missing));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_overrides_are_merged() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp.path().join(DEFAULT_CONFIG_NAME);
        fs::write(
            &config_path,
            r#"
[rules]
extra_junk = ["ads.html"]

[rules.extra_extensions]
Documentos = ["epub"]
"#,
        )
        .expect("Failed to write config");

        let ruleset = load_ruleset(temp.path(), None).expect("load should succeed");
        assert_eq!(ruleset.classify("ads.html"), Disposition::Junk);
        assert_eq!(
            ruleset.classify("book.epub"),
            Disposition::Keep { archive: false }
        );
        assert_eq!(ruleset.category_for("epub"), Some(Category::Documents));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp.path().join(DEFAULT_CONFIG_NAME);
        fs::write(
            &config_path,
            r#"
[rules.extra_extensions]
Musica = ["mp3"]
"#,
        )
        .expect("Failed to write config");

        let result = load_ruleset(temp.path(), None);
        assert!(matches!(result, Err(ConfigError::UnknownCategory(_))));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&config_path, "not [valid toml").expect("Failed to write config");

        let result = load_ruleset(temp.path(), None);
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }
}
