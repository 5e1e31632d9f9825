//! Command-line interface module for limpa.
//!
//! Parses the invocation surface (target directory plus the three
//! independent flags) and drives the pipeline: promote + prune, then
//! extraction, then categorization. Execute mode asks a yes/no question
//! before each mutating phase; declining one phase never aborts the ones
//! after it. The default invocation is a non-mutating dry run.

use crate::categorize::categorize_by_extension;
use crate::classify::Ruleset;
use crate::config;
use crate::error::{OrganizeError, OrganizeResult};
use crate::extract::{extract_all, STAGING_DIR};
use crate::output::OutputFormatter;
use crate::promote::{promote, PromoteStats};
use crate::prune::prune_empty_dirs;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

/// Flatten, clean and organize a downloaded course folder.
#[derive(Debug, Parser)]
#[command(name = "limpa", version, about)]
pub struct Cli {
    /// Directory to organize
    pub dir: PathBuf,

    /// Apply the changes (default is a dry run that only reports)
    #[arg(long)]
    pub execute: bool,

    /// Suppress per-file progress output (aggregate stats still print)
    #[arg(long)]
    pub quiet: bool,

    /// Print the allowed extensions per category and exit
    #[arg(long)]
    pub extensions: bool,

    /// Ruleset override file (default: <dir>/limpa.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Runs the pipeline with interactive stdin confirmations.
pub fn run(cli: &Cli) -> OrganizeResult<()> {
    run_with_confirm(cli, &mut prompt_confirm)
}

/// Runs the pipeline with a pluggable confirmation callback, so the gate
/// logic is testable without a terminal.
pub fn run_with_confirm(
    cli: &Cli,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> OrganizeResult<()> {
    // The extensions listing short-circuits all processing: it prints the
    // effective table when the overrides load, and falls back to the
    // defaults (with a warning) when they do not.
    if cli.extensions {
        let ruleset = match config::load_ruleset(&cli.dir, cli.config.as_deref()) {
            Ok(ruleset) => ruleset,
            Err(e) => {
                OutputFormatter::warning(&format!("Ignoring configuration: {}", e));
                Ruleset::default()
            }
        };
        print_extensions(&ruleset);
        return Ok(());
    }

    let ruleset = config::load_ruleset(&cli.dir, cli.config.as_deref())?;

    if !cli.dir.exists() {
        return Err(OrganizeError::RootNotFound {
            path: cli.dir.clone(),
        });
    }

    let dry_run = !cli.execute;
    let verbose = !cli.quiet;

    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved or removed.");
        OutputFormatter::info("Use --execute to apply the changes.");
    } else {
        OutputFormatter::warning("EXECUTE MODE - files will be moved and junk will be removed!");
    }

    // Phase 1: promote + prune. The first mutation sits behind the first
    // gate; declining it skips this phase only.
    let mut archives: Vec<String> = Vec::new();
    if dry_run || confirm("Proceed with promotion and cleanup? [y/n]") {
        OutputFormatter::header(&format!(
            "{} Processing: {}",
            if dry_run { "[DRY RUN]" } else { "[EXECUTE]" },
            cli.dir.display()
        ));
        let stats = promote(&cli.dir, &ruleset, dry_run, verbose)?;
        let pruned = if dry_run {
            0
        } else {
            prune_empty_dirs(&cli.dir)
        };
        print_promote_summary(&stats, pruned, dry_run);
        archives = stats.archives_found;
    } else {
        OutputFormatter::info("Promotion skipped.");
    }

    if dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
        return Ok(());
    }

    // Phase 2: extraction, gated when archives were found.
    if !archives.is_empty() {
        OutputFormatter::header(&format!("Found {} archive(s):", archives.len()));
        for name in &archives {
            OutputFormatter::plain(&format!("  - {}", name));
        }
        if confirm("Extract all archives? [y/n]") {
            let stats = extract_all(&cli.dir, &archives, verbose);
            OutputFormatter::success(&format!("Archives extracted: {}", stats.extracted));
            OutputFormatter::plain(&format!(
                "Archives relocated to {}/: {}",
                STAGING_DIR, stats.relocated
            ));
            if !stats.errors.is_empty() {
                OutputFormatter::warning("Some archives failed to extract:");
                for failure in &stats.errors {
                    OutputFormatter::error(&format!("  {}", failure));
                }
            }
        } else {
            OutputFormatter::info("Extraction skipped.");
        }
    }

    // Phase 3: categorization.
    if confirm("Organize files by extension (Documentos, Código, Imagens, ...)? [y/n]") {
        let stats = categorize_by_extension(&cli.dir, &ruleset, false, verbose)?;
        OutputFormatter::success(&format!("Files organized: {}", stats.moved));
        OutputFormatter::plain(&format!("Folders created: {}", stats.dirs_created));
    } else {
        OutputFormatter::info("Categorization skipped.");
    }

    Ok(())
}

/// Prints the per-phase statistics block after promotion.
fn print_promote_summary(stats: &PromoteStats, pruned: usize, dry_run: bool) {
    OutputFormatter::header("STATISTICS");
    OutputFormatter::plain(&format!("Files moved to root:   {}", stats.moved));
    OutputFormatter::plain(&format!("Junk files removed:    {}", stats.removed));
    OutputFormatter::plain(&format!("Empty folders removed: {}", pruned));
    OutputFormatter::plain(&format!("Space freed:           {:.2} MB", stats.freed_mb));
    if !stats.archives_found.is_empty() {
        OutputFormatter::plain(&format!(
            "Archives found:        {}",
            stats.archives_found.len()
        ));
    }
    if dry_run {
        OutputFormatter::dry_run_notice("Nothing was modified.");
    }
}

/// Prints the category table for `--extensions`.
fn print_extensions(ruleset: &Ruleset) {
    OutputFormatter::header("ALLOWED EXTENSIONS");
    for (category, extensions) in ruleset.categories() {
        let mut sorted: Vec<&str> = extensions.iter().map(|s| s.as_str()).collect();
        sorted.sort_unstable();
        OutputFormatter::plain(&format!("\n{}:", category.dir_name()));
        OutputFormatter::plain(&format!("  {}", sorted.join(", ")));
    }
}

/// Interactive yes/no gate. Anything other than `y` declines.
fn prompt_confirm(question: &str) -> bool {
    print!("{} ", question);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}
