//! webtest configuration
//!
//! Loaded from `webtest.toml`. Every section is optional; missing keys fall
//! back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebtestConfig {
    /// Test, screenshot and result locations
    pub paths: PathsConfig,

    /// Test server process
    pub server: ServerSettings,

    /// Database fixture helpers
    pub database: DatabaseSettings,

    /// External browser-test binary
    pub runner: RunnerSettings,

    /// Environment handed to child processes
    pub env: EnvSettings,

    /// Failure report text
    pub report: ReportSettings,
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Fixed directory holding the browser test scripts
    pub test_dir: PathBuf,

    /// Extension of test scripts, without the dot
    pub test_extension: String,

    /// Where the runner drops screenshots of failed tests
    pub screenshot_dir: PathBuf,

    /// File name prefix of failure screenshots
    pub screenshot_prefix: String,

    /// Directory for the JSON run summary
    pub output_dir: PathBuf,

    /// Directory for the runner's xunit XML output
    pub xunit_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from("frontend_tests/browser_tests"),
            test_extension: "js".to_string(),
            screenshot_dir: PathBuf::from("var/browser-tests"),
            screenshot_prefix: "failure".to_string(),
            output_dir: PathBuf::from("var/test-results"),
            xunit_dir: PathBuf::from("var/xunit-test-results/browser"),
        }
    }
}

/// Test server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Command line that starts the application in test mode
    pub command: Vec<String>,

    /// Host the server binds to
    pub host: String,

    /// Port to listen on (0 = find a free port)
    pub port: u16,

    /// Poll `health_path` until it answers 2xx before running tests
    pub health_check: bool,

    /// Readiness endpoint
    pub health_path: String,

    /// How long to wait for the server to become healthy
    pub startup_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            command: vec!["tools/run-test-server".to_string()],
            host: "127.0.0.1".to_string(),
            port: 9981,
            health_check: true,
            health_path: "/health".to_string(),
            startup_timeout_secs: 60,
        }
    }
}

/// Database fixture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Command that restores the test database to its fixture state
    pub reset_command: Vec<String>,

    /// Command that writes login credentials for the fixture users; empty skips it
    pub credentials_command: Vec<String>,

    /// Reset the database after each test file
    pub reset_between_files: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            reset_command: vec!["tools/reset-test-database".to_string()],
            credentials_command: vec!["tools/generate-test-credentials".to_string()],
            reset_between_files: true,
        }
    }
}

/// External browser-test binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Path to the test binary
    pub binary: PathBuf,

    /// Subcommand placed right before the test file; empty for none
    pub subcommand: String,

    /// Port the remote debugger listens on with `--remote-debug`
    pub remote_debug_port: u16,

    /// Name fragments of tests skipped by `--skip-flaky-tests`
    pub flaky_tests: Vec<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("node_modules/.bin/casperjs"),
            subcommand: "test".to_string(),
            remote_debug_port: 7777,
            flaky_tests: Vec::new(),
        }
    }
}

/// Child process environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    /// Variable telling the application it runs under browser tests
    pub test_mode_var: String,

    /// Variable pointing the runner at its headless browser
    pub executable_var: String,

    /// Value of `executable_var`; left unset when empty
    pub executable_path: PathBuf,

    /// Variables stripped from every child
    pub suppressed: Vec<String>,

    /// Variable that marks a continuous-integration run
    pub ci_var: String,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            test_mode_var: "WEBTEST_BROWSER_TESTS".to_string(),
            executable_var: "PHANTOMJS_EXECUTABLE".to_string(),
            executable_path: PathBuf::from("node_modules/.bin/phantomjs"),
            suppressed: ["http_proxy", "https_proxy", "HTTP_PROXY", "HTTPS_PROXY"]
                .into_iter()
                .map(String::from)
                .collect(),
            ci_var: "CI".to_string(),
        }
    }
}

/// Failure report text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Name of the suite used in messages
    pub suite_name: String,

    /// Where to read about debugging failures
    pub docs_url: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            suite_name: "browser frontend".to_string(),
            docs_url: "https://webtest.readthedocs.io/en/latest/debugging.html".to_string(),
        }
    }
}

impl WebtestConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot start a run
    pub fn validate(&self) -> Result<()> {
        if self.server.command.is_empty() {
            return Err(Error::InvalidConfig("server.command is empty".to_string()));
        }
        if self.database.reset_command.is_empty() {
            return Err(Error::InvalidConfig(
                "database.reset_command is empty".to_string(),
            ));
        }
        if self.runner.binary.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("runner.binary is empty".to_string()));
        }
        if self.paths.test_extension.starts_with('.') {
            return Err(Error::InvalidConfig(
                "paths.test_extension must not start with '.'".to_string(),
            ));
        }
        Ok(())
    }

    /// Xunit result file handed to the runner
    pub fn xunit_file(&self) -> PathBuf {
        self.paths.xunit_dir.join("result.xml")
    }

    /// JSON summary written after each run
    pub fn summary_file(&self) -> PathBuf {
        self.paths.output_dir.join("test-results.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = WebtestConfig::load(&dir.path().join("webtest.toml")).unwrap();
        assert_eq!(config.runner.remote_debug_port, 7777);
        assert_eq!(config.paths.test_extension, "js");
        assert!(config.database.reset_between_files);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("webtest.toml");
        std::fs::write(
            &path,
            r#"
[runner]
binary = "bin/runner"
flaky_tests = ["10-admin"]

[server]
command = ["./manage.py", "runserver"]
health_path = "/ready"

[database]
credentials_command = []
"#,
        )
        .unwrap();

        let config = WebtestConfig::load(&path).unwrap();
        assert_eq!(config.runner.binary, PathBuf::from("bin/runner"));
        assert_eq!(config.runner.flaky_tests, vec!["10-admin".to_string()]);
        assert_eq!(config.runner.subcommand, "test");
        assert_eq!(config.server.command.len(), 2);
        assert_eq!(config.server.health_path, "/ready");
        assert!(config.server.health_check);
        assert!(config.database.credentials_command.is_empty());
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_server_command_rejected() {
        let mut config = WebtestConfig::default();
        config.server.command.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_dotted_extension_rejected() {
        let mut config = WebtestConfig::default();
        config.paths.test_extension = ".js".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_paths() {
        let config = WebtestConfig::default();
        assert_eq!(
            config.xunit_file(),
            PathBuf::from("var/xunit-test-results/browser/result.xml")
        );
        assert_eq!(
            config.summary_file(),
            PathBuf::from("var/test-results/test-results.json")
        );
    }
}
