//! Error types for webtest

use thiserror::Error;

/// Result type alias using webtest Error
pub type Result<T> = std::result::Result<T, Error>;

/// webtest error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
