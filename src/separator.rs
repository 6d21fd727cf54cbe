use crate::error::{Result, StemError};
use crate::types::StemSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A source-separation backend that turns one mixed audio file into stems.
///
/// Implementations block for the full run of the underlying tool; there is no
/// cancellation and no progress reporting.
pub trait Separator: Send + Sync {
    /// Tool name, for logs and error messages.
    fn name(&self) -> &'static str;

    /// Separate `input` into stems under `out_dir`, returning the final
    /// label-to-path mapping with every stem file directly in `out_dir`.
    fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemSet>;
}

/// Which external tool to invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Demucs,
    Spleeter,
}

impl Backend {
    pub fn separator(self) -> Box<dyn Separator> {
        match self {
            Backend::Demucs => Box::new(DemucsSeparator::new()),
            Backend::Spleeter => Box::new(SpleeterSeparator::new()),
        }
    }
}

/// Runs `demucs --mp3 -o <out> <input>` and flattens its
/// `<out>/<model>/<song>/*.mp3` layout.
pub struct DemucsSeparator {
    program: String,
}

impl DemucsSeparator {
    pub fn new() -> Self {
        Self {
            program: env::var("STEMSERVE_DEMUCS_BIN").unwrap_or_else(|_| "demucs".into()),
        }
    }
}

impl Default for DemucsSeparator {
    fn default() -> Self {
        Self::new()
    }
}

impl Separator for DemucsSeparator {
    fn name(&self) -> &'static str {
        "demucs"
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemSet> {
        fs::create_dir_all(out_dir)?;

        info!("running demucs on {}", input.display());
        let status = Command::new(&self.program)
            .arg("--mp3")
            .arg("-o")
            .arg(out_dir)
            .arg(input)
            .status()
            .map_err(|e| StemError::ToolSpawn {
                tool: self.name(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(StemError::ToolFailed {
                tool: self.name(),
                status,
            });
        }

        collect_stems(out_dir)
    }
}

/// Runs `spleeter separate -p spleeter:4stems -o <out> -c mp3 <input>` and
/// flattens its `<out>/<song>/*.mp3` layout.
pub struct SpleeterSeparator {
    program: String,
}

impl SpleeterSeparator {
    pub fn new() -> Self {
        Self {
            program: env::var("STEMSERVE_SPLEETER_BIN").unwrap_or_else(|_| "spleeter".into()),
        }
    }
}

impl Default for SpleeterSeparator {
    fn default() -> Self {
        Self::new()
    }
}

impl Separator for SpleeterSeparator {
    fn name(&self) -> &'static str {
        "spleeter"
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemSet> {
        fs::create_dir_all(out_dir)?;

        info!("running spleeter on {}", input.display());
        let status = Command::new(&self.program)
            .arg("separate")
            .args(["-p", "spleeter:4stems"])
            .arg("-o")
            .arg(out_dir)
            .args(["-c", "mp3"])
            .arg(input)
            .status()
            .map_err(|e| StemError::ToolSpawn {
                tool: self.name(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(StemError::ToolFailed {
                tool: self.name(),
                status,
            });
        }

        collect_stems(out_dir)
    }
}

/// Flatten the nested directory layout a separation tool leaves behind.
///
/// Demucs writes `<out>/<model>/<song>/<stem>.mp3`, spleeter writes
/// `<out>/<song>/<stem>.mp3`. Starting at `out_dir`, descend while the
/// current level holds no mp3 files and exactly one subdirectory, move every
/// mp3 found at the deepest level up into `out_dir` (labelled by file stem),
/// then delete the intermediate tree. Anything else is a layout violation.
pub fn collect_stems(out_dir: &Path) -> Result<StemSet> {
    let mut deepest = out_dir.to_path_buf();

    loop {
        if !mp3_files(&deepest)?.is_empty() {
            break;
        }
        let mut dirs: Vec<PathBuf> = entries_sorted(&deepest)?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();
        match dirs.len() {
            0 => {
                return Err(layout_err(
                    out_dir,
                    format!("no stem files or subdirectories in {}", deepest.display()),
                ))
            }
            1 => deepest = dirs.remove(0),
            n => {
                return Err(layout_err(
                    out_dir,
                    format!("expected one directory in {}, found {n}", deepest.display()),
                ))
            }
        }
    }

    let mut stems = StemSet::new();
    for src in mp3_files(&deepest)? {
        let label = src
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| layout_err(out_dir, format!("unusable file name: {}", src.display())))?
            .to_string();
        let file_name = src
            .file_name()
            .ok_or_else(|| layout_err(out_dir, format!("unusable file name: {}", src.display())))?
            .to_owned();
        let dest = out_dir.join(file_name);
        if src != dest {
            fs::rename(&src, &dest)?;
        }
        debug!("stem {label} -> {}", dest.display());
        stems.insert(label, dest);
    }

    // Delete the now-mostly-empty intermediate tree.
    if deepest != out_dir {
        if let Ok(rel) = deepest.strip_prefix(out_dir) {
            if let Some(top) = rel.components().next() {
                fs::remove_dir_all(out_dir.join(top))?;
            }
        }
    }

    Ok(stems)
}

fn layout_err(dir: &Path, reason: String) -> StemError {
    StemError::Layout {
        dir: dir.to_path_buf(),
        reason,
    }
}

fn entries_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn mp3_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(entries_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("mp3"))
        .collect())
}
