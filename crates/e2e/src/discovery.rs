//! Test file discovery
//!
//! Maps positional selectors onto scripts in the fixed test directory.
//! A selector may be a name prefix (`00`, `05-settings`), a full file name,
//! or a path. Selected files keep the order they were given in.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use webtest_common::config::PathsConfig;

use crate::error::{E2eError, E2eResult};

/// Resolves selectors against the test directory
#[derive(Debug, Clone)]
pub struct TestDiscovery {
    test_dir: PathBuf,
    extension: String,
}

impl TestDiscovery {
    pub fn new(test_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            test_dir: test_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.test_dir, &paths.test_extension)
    }

    /// Every test script in the directory, sorted by file name
    pub fn all(&self) -> E2eResult<Vec<PathBuf>> {
        if !self.test_dir.is_dir() {
            return Err(E2eError::TestDirMissing(self.test_dir.clone()));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.test_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && self.is_test_script(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Resolve selectors in order; no selectors means the whole directory
    pub fn resolve(&self, selectors: &[String]) -> E2eResult<Vec<PathBuf>> {
        let available = self.all()?;
        if selectors.is_empty() {
            info!("Selected all {} test file(s)", available.len());
            return absolutize_all(available);
        }

        let mut files = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let path = self.resolve_one(selector, &available)?;
            debug!("{} -> {}", selector, path.display());
            files.push(path);
        }
        Ok(files)
    }

    fn resolve_one(&self, selector: &str, available: &[PathBuf]) -> E2eResult<PathBuf> {
        let by_prefix = available.iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(selector))
                .unwrap_or(false)
        });

        let candidate = match by_prefix {
            Some(path) => path.clone(),
            None if Path::new(selector).exists() => PathBuf::from(selector),
            None => self.test_dir.join(selector),
        };

        candidate.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => E2eError::TestNotFound(selector.to_string()),
            _ => E2eError::Io(e),
        })
    }

    fn is_test_script(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy() == self.extension.as_str())
            .unwrap_or(false)
    }
}

fn absolutize_all(files: Vec<PathBuf>) -> E2eResult<Vec<PathBuf>> {
    files
        .into_iter()
        .map(|f| f.canonicalize().map_err(E2eError::from))
        .collect()
}

/// Drop files whose name contains any of the flaky patterns
pub fn skip_flaky(files: Vec<PathBuf>, patterns: &[String]) -> Vec<PathBuf> {
    if patterns.is_empty() {
        return files;
    }
    files
        .into_iter()
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match patterns.iter().find(|p| name.contains(p.as_str())) {
                Some(pattern) => {
                    info!("Skipping flaky test {} (matches '{}')", name, pattern);
                    false
                }
                None => true,
            }
        })
        .collect()
}
