//! limpa - flatten, clean and organize a downloaded course folder
//!
//! This library implements a three-phase pipeline over a single local
//! directory: promote useful files from subfolders to the root (deleting
//! junk and pruning emptied folders), extract discovered archives into a
//! staging area, and sort the remaining root files into category folders
//! by extension. Each phase is stateless and independently invokable; the
//! filesystem is the only state shared between them.

pub mod categorize;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fsutil;
pub mod output;
pub mod promote;
pub mod prune;

pub use categorize::{categorize_by_extension, CategorizeStats};
pub use classify::{Category, Disposition, Ruleset};
pub use config::{load_ruleset, ConfigError, RulesConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use extract::{extract_all, ExtractStats};
pub use promote::{promote, PromoteStats};
pub use prune::prune_empty_dirs;

pub use cli::{run, Cli};
