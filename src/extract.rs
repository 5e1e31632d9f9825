//! Extraction phase: expand discovered archives into a staging area.
//!
//! Every archive the promotion phase found at the root gets a
//! `ZIPS/<stem>_quak/` folder holding its expanded contents, after which
//! the archive file itself is relocated into `ZIPS/`. Zip files are
//! decoded in-process; rar and 7z are delegated to whichever external
//! decoder program is installed, tried in a fixed order with a bounded
//! timeout each. Failures are collected per archive and reported after the
//! whole batch has been attempted.

use crate::classify::extension_of;
use crate::fsutil::resolve_collision;
use crate::output::OutputFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Root-level folder holding relocated archives and their extractions.
pub const STAGING_DIR: &str = "ZIPS";

/// Suffix of the per-archive extraction folder: `notes.zip` → `notes_quak/`.
pub const EXTRACT_DIR_SUFFIX: &str = "_quak";

/// Bound on each external decoder invocation.
const DECODER_TIMEOUT: Duration = Duration::from_secs(60);

/// Aggregate result of one extraction pass.
#[derive(Debug, Default)]
pub struct ExtractStats {
    /// Archives successfully expanded.
    pub extracted: usize,
    /// Archive files relocated into the staging folder.
    pub relocated: usize,
    /// Per-archive failures, in attempt order. Never raised: the batch is
    /// always attempted to the end.
    pub errors: Vec<ExtractFailure>,
}

/// One archive that could not be extracted, with the reason.
#[derive(Debug)]
pub struct ExtractFailure {
    pub archive: String,
    pub reason: ExtractFailureReason,
}

impl std::fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.archive, self.reason)
    }
}

/// Why an archive failed to extract.
#[derive(Debug)]
pub enum ExtractFailureReason {
    /// The zip file is corrupt or not a zip at all.
    InvalidZip(String),
    /// No installed external decoder managed to expand the archive
    /// (not found, non-zero exit or timeout, for every candidate).
    NoDecoder(String),
    /// Extension with no decoding path at all.
    UnsupportedFormat(String),
    /// I/O failure while reading the archive or writing its contents.
    Io(String),
}

impl std::fmt::Display for ExtractFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidZip(msg) => write!(f, "invalid or corrupt zip ({})", msg),
            Self::NoDecoder(ext) => {
                write!(f, "no working decoder for .{} (install 7-Zip or WinRAR)", ext)
            }
            Self::UnsupportedFormat(ext) => write!(f, "unsupported format .{}", ext),
            Self::Io(msg) => write!(f, "I/O error ({})", msg),
        }
    }
}

/// Argument convention of an external decoder program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderFlavor {
    /// `7z x <archive> -o<dest> -y`
    SevenZip,
    /// `unrar x -y <archive> <dest>`
    Unrar,
}

/// One candidate external decoder: a program location plus its argument
/// convention.
struct ExternalDecoder {
    program: &'static str,
    flavor: DecoderFlavor,
}

/// Candidates in trial order: well-known Windows install paths first, then
/// bare command names resolved through PATH.
const EXTERNAL_DECODERS: [ExternalDecoder; 7] = [
    ExternalDecoder {
        program: "C:\\Program Files\\7-Zip\\7z.exe",
        flavor: DecoderFlavor::SevenZip,
    },
    ExternalDecoder {
        program: "C:\\Program Files (x86)\\7-Zip\\7z.exe",
        flavor: DecoderFlavor::SevenZip,
    },
    ExternalDecoder {
        program: "C:\\Program Files\\WinRAR\\UnRAR.exe",
        flavor: DecoderFlavor::Unrar,
    },
    ExternalDecoder {
        program: "C:\\Program Files (x86)\\WinRAR\\UnRAR.exe",
        flavor: DecoderFlavor::Unrar,
    },
    ExternalDecoder {
        program: "7z",
        flavor: DecoderFlavor::SevenZip,
    },
    ExternalDecoder {
        program: "7zz",
        flavor: DecoderFlavor::SevenZip,
    },
    ExternalDecoder {
        program: "unrar",
        flavor: DecoderFlavor::Unrar,
    },
];

impl ExternalDecoder {
    fn command(&self, archive: &Path, dest: &Path) -> Command {
        let mut cmd = Command::new(self.program);
        match self.flavor {
            DecoderFlavor::SevenZip => {
                cmd.arg("x")
                    .arg(archive)
                    .arg(format!("-o{}", dest.display()))
                    .arg("-y");
            }
            DecoderFlavor::Unrar => {
                cmd.arg("x").arg("-y").arg(archive).arg(dest);
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Runs this decoder, bounded by `timeout`. Any failure mode (program
    /// missing, non-zero exit, timeout) yields `false` so the caller can
    /// fall through to the next candidate.
    fn try_decode(&self, archive: &Path, dest: &Path, timeout: Duration) -> bool {
        let mut child = match self.command(archive, dest).spawn() {
            Ok(child) => child,
            Err(_) => return false,
        };
        match child.wait_timeout(timeout) {
            Ok(Some(status)) => status.success(),
            Ok(None) => {
                // Timed out: kill and reap before moving on.
                let _ = child.kill();
                let _ = child.wait();
                false
            }
            Err(_) => false,
        }
    }
}

/// Extracts every named archive found at the root.
///
/// No-op when `archive_names` is empty (the staging folder is not even
/// created). Archives that vanished since promotion are skipped with a
/// warning. Returns the counts and the full failure list; at-least-one
/// failure never aborts the batch.
pub fn extract_all(root: &Path, archive_names: &[String], verbose: bool) -> ExtractStats {
    let mut stats = ExtractStats::default();

    if archive_names.is_empty() {
        OutputFormatter::success("No archives found to extract.");
        return stats;
    }

    let staging = root.join(STAGING_DIR);
    if let Err(e) = fs::create_dir_all(&staging) {
        OutputFormatter::error(&format!(
            "Failed to create staging folder {}: {}",
            staging.display(),
            e
        ));
        return stats;
    }

    let progress = if verbose {
        None
    } else {
        Some(OutputFormatter::create_progress_bar(
            archive_names.len() as u64,
        ))
    };

    for name in archive_names {
        let archive_path = root.join(name);
        if let Some(pb) = &progress {
            pb.set_message(name.clone());
        }

        if !archive_path.exists() {
            OutputFormatter::warning(&format!("Archive not found: {}", name));
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            continue;
        }

        let dest = extraction_dir(&staging, name);
        let dest_preexisting = dest.exists();
        if let Err(e) = fs::create_dir_all(&dest) {
            stats.errors.push(ExtractFailure {
                archive: name.clone(),
                reason: ExtractFailureReason::Io(e.to_string()),
            });
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            continue;
        }

        if verbose {
            OutputFormatter::plain(&format!(
                "EXTRACTING: {} → {}/{}/",
                name,
                STAGING_DIR,
                dest.file_name().unwrap_or_default().to_string_lossy()
            ));
        }

        match decode(&archive_path, &dest) {
            Ok(()) => {
                stats.extracted += 1;
                if verbose {
                    OutputFormatter::success(&format!("Extracted {}", name));
                }
                // Relocate the original archive into the staging folder.
                let target = resolve_collision(staging.join(name));
                match fs::rename(&archive_path, &target) {
                    Ok(()) => stats.relocated += 1,
                    Err(e) => {
                        OutputFormatter::warning(&format!("Failed to relocate {}: {}", name, e))
                    }
                }
            }
            Err(reason) => {
                if verbose {
                    OutputFormatter::error(&format!("{}: {}", name, reason));
                }
                stats.errors.push(ExtractFailure {
                    archive: name.clone(),
                    reason,
                });
                // A freshly created destination that stayed empty is noise.
                if !dest_preexisting && dir_is_empty(&dest) {
                    let _ = fs::remove_dir(&dest);
                }
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    stats
}

/// The per-archive extraction folder: `<staging>/<stem>_quak`.
pub fn extraction_dir(staging: &Path, archive_name: &str) -> PathBuf {
    let stem = Path::new(archive_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| archive_name.to_string());
    staging.join(format!("{}{}", stem, EXTRACT_DIR_SUFFIX))
}

fn decode(archive: &Path, dest: &Path) -> Result<(), ExtractFailureReason> {
    let ext = extension_of(&archive.file_name().unwrap_or_default().to_string_lossy());
    match ext.as_str() {
        "zip" => decode_zip(archive, dest),
        "rar" | "7z" => decode_external(archive, dest, &ext),
        other => Err(ExtractFailureReason::UnsupportedFormat(other.to_string())),
    }
}

/// Native in-process zip decoding. A file that cannot be parsed as a zip
/// fails distinctly from one that cannot be read.
fn decode_zip(archive: &Path, dest: &Path) -> Result<(), ExtractFailureReason> {
    let file = fs::File::open(archive).map_err(|e| ExtractFailureReason::Io(e.to_string()))?;
    let mut zip =
        zip::ZipArchive::new(file).map_err(|e| ExtractFailureReason::InvalidZip(e.to_string()))?;
    zip.extract(dest).map_err(|e| match e {
        zip::result::ZipError::Io(io) => ExtractFailureReason::Io(io.to_string()),
        other => ExtractFailureReason::InvalidZip(other.to_string()),
    })
}

/// Tries each external decoder candidate in order; first success wins.
/// 7z archives only get 7-Zip-flavored candidates, rar gets them all.
fn decode_external(archive: &Path, dest: &Path, ext: &str) -> Result<(), ExtractFailureReason> {
    decode_with_candidates(&EXTERNAL_DECODERS, archive, dest, ext, DECODER_TIMEOUT)
}

fn decode_with_candidates(
    candidates: &[ExternalDecoder],
    archive: &Path,
    dest: &Path,
    ext: &str,
    timeout: Duration,
) -> Result<(), ExtractFailureReason> {
    for decoder in candidates
        .iter()
        .filter(|d| ext == "rar" || d.flavor == DecoderFlavor::SevenZip)
    {
        if decoder.try_decode(archive, dest, timeout) {
            return Ok(());
        }
    }
    Err(ExtractFailureReason::NoDecoder(ext.to_string()))
}

fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
