use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Central error type for the stemserve crate.
#[derive(Debug, Error)]
pub enum StemError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to start {tool}: {reason}")]
    ToolSpawn { tool: &'static str, reason: String },

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: &'static str, status: ExitStatus },

    /// The separation tool left its output directory in a shape we do not
    /// recognize (a single chain of directories ending in mp3 files).
    #[error("unexpected output layout under {}: {reason}", dir.display())]
    Layout { dir: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StemError>;
