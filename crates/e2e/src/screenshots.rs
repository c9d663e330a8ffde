//! Failure screenshot housekeeping

use std::path::Path;
use tracing::debug;

use crate::error::E2eResult;

/// Delete `<dir>/<prefix>*.png` left over from an earlier run.
///
/// A missing directory counts as nothing to delete.
pub fn clear_failure_screenshots(dir: &Path, prefix: &str) -> E2eResult<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(".png") {
            std::fs::remove_file(entry.path())?;
            debug!("Removed stale screenshot {}", entry.path().display());
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_only_failure_pngs() {
        let dir = TempDir::new().unwrap();
        for name in ["failure-1.png", "failure-2.png", "failure.txt", "baseline.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = clear_failure_screenshots(dir.path(), "failure").unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("failure-1.png").exists());
        assert!(dir.path().join("failure.txt").exists());
        assert!(dir.path().join("baseline.png").exists());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let removed = clear_failure_screenshots(&dir.path().join("none"), "failure").unwrap();
        assert_eq!(removed, 0);
    }
}
