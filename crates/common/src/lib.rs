//! webtest common library
//!
//! Shared configuration, error type and child-process environment for the
//! webtest crates.

pub mod config;
pub mod env;
pub mod error;

pub use config::WebtestConfig;
pub use env::ChildEnvironment;
pub use error::{Error, Result};

/// webtest version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "webtest.toml";
