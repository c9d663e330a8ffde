//! webtest E2E driver
//!
//! This crate drives an external browser-test binary over a directory of
//! test scripts:
//! - Resolves test selectors to files in the fixed test directory
//! - Spawns the application server as a subprocess and waits for health
//! - Resets the test database through helper commands
//! - Runs one test file at a time, stopping at the first failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     webtest (Rust)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestDiscovery::resolve(selectors) -> Vec<PathBuf>          │
//! │  TestSession::start()                                       │
//! │    ├── DatabaseFixture::reset()                             │
//! │    ├── ServerHandle::spawn() -> wait_for_healthy()          │
//! │    └── DatabaseFixture::generate_credentials()              │
//! │  TestRunner::run(files)                                     │
//! │    └── for trial in 1..=N                                   │
//! │          ├── clear_failure_screenshots()                    │
//! │          └── for file: Launcher::run_file(file) -> code     │
//! │                 (stop at first non-zero)                    │
//! │  TestSession::stop()   (also on drop)                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod database;
pub mod discovery;
pub mod error;
pub mod launcher;
pub mod preflight;
pub mod runner;
pub mod screenshots;
pub mod server;
pub mod session;

pub use database::{DatabaseFixture, Fixture};
pub use discovery::TestDiscovery;
pub use error::{E2eError, E2eResult};
pub use launcher::{Launcher, ProcessLauncher, RunnerFlags};
pub use runner::{RunOptions, StdinPause, SuiteOutcome, TestRunner};
pub use session::{SessionConfig, TestSession};
