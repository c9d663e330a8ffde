//! Checks run before the session starts
//!
//! Problems are fatal unless the run is forced, in which case they are only
//! logged.

use std::net::TcpListener;
use std::path::Path;
use tracing::warn;

use webtest_common::WebtestConfig;

use crate::error::{E2eError, E2eResult};

/// Collect everything that would make the run fail for setup reasons
pub fn check(config: &WebtestConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if !program_exists(&config.runner.binary) {
        issues.push(format!(
            "test runner not found at {} (install frontend dependencies first)",
            config.runner.binary.display()
        ));
    }

    if !config.paths.test_dir.is_dir() {
        issues.push(format!(
            "test directory {} does not exist",
            config.paths.test_dir.display()
        ));
    }

    if let Some(program) = config.server.command.first() {
        if !program_exists(Path::new(program)) {
            issues.push(format!("server command {} not found", program));
        }
    }

    if config.server.port != 0
        && TcpListener::bind((config.server.host.as_str(), config.server.port)).is_err()
    {
        issues.push(format!(
            "port {} is already in use; is another test server still running?",
            config.server.port
        ));
    }

    issues
}

/// A path is checked as given; a bare name is looked up on `PATH`
fn program_exists(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// Fail on issues, or downgrade them to warnings with `force`
pub fn enforce(issues: &[String], force: bool) -> E2eResult<()> {
    if issues.is_empty() {
        return Ok(());
    }
    if force {
        for issue in issues {
            warn!("Ignoring preflight problem: {}", issue);
        }
        return Ok(());
    }
    let list = issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    Err(E2eError::Preflight(list))
}
