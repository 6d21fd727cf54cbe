use crate::error::Result;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Remove entries directly under `dir` whose modification time is older than
/// `ttl`. Upload files and per-token stem directories are swept the same way.
/// Entries that cannot be inspected or removed are skipped with a warning so
/// one bad entry does not abort the sweep. Returns the number removed.
pub fn prune_older_than(dir: &Path, ttl: Duration) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        // A clock that moved backwards makes the entry look fresh; keep it.
        let age = match now.duration_since(modified) {
            Ok(age) => age,
            Err(_) => continue,
        };
        if age <= ttl {
            continue;
        }

        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!("pruned {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("failed to prune {}: {e}", path.display()),
        }
    }

    Ok(removed)
}
