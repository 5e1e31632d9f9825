//! Fatal error types shared by the organization phases.
//!
//! Only precondition failures surface through this type: a missing target
//! directory or an unreadable configuration file aborts the run before any
//! phase touches the filesystem. Per-file failures inside a phase are logged
//! and counted, never raised (see the phase modules).

use crate::config::ConfigError;
use std::path::PathBuf;

/// Errors that abort a run before or instead of processing.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target directory does not exist.
    RootNotFound {
        path: PathBuf,
    },
    /// The ruleset configuration could not be loaded.
    Config(ConfigError),
    /// An I/O failure outside the per-file recovery paths.
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            Self::Config(e) => write!(f, "{}", e),
            Self::Io { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::RootNotFound { .. } => None,
        }
    }
}

impl From<ConfigError> for OrganizeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result type for the organization phases.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_not_found_display() {
        let err = OrganizeError::RootNotFound {
            path: PathBuf::from("/missing/dir"),
        };
        assert_eq!(err.to_string(), "Directory not found: /missing/dir");
    }

    #[test]
    fn test_io_display_includes_context() {
        let err = OrganizeError::Io {
            context: "Failed to read directory /tmp/x".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("Failed to read directory"));
    }
}
