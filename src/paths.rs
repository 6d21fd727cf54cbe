use crate::types::Token;
use std::path::{Path, PathBuf};

/// `<uploads>/<token>.mp3`. Uploaded bytes are stored under this name as-is,
/// whatever their real container format.
pub fn upload_path(uploads_dir: &Path, token: &Token) -> PathBuf {
    uploads_dir.join(format!("{token}.mp3"))
}

/// `<stems>/<token>/`, the output directory for one upload's stems.
pub fn token_stem_dir(stems_dir: &Path, token: &Token) -> PathBuf {
    stems_dir.join(token.as_str())
}
