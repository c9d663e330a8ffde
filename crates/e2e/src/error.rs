//! Error types for E2E runs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Failed to launch {}: {source}", binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Test directory not found: {}", .0.display())]
    TestDirMissing(PathBuf),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Database fixture command `{command}` failed ({status})")]
    DatabaseFixture { command: String, status: String },

    #[error("Preflight check failed:\n{0}\nRe-run with --force to ignore")]
    Preflight(String),

    #[error("Config error: {0}")]
    Config(#[from] webtest_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
