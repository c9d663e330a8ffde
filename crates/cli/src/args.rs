//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use webtest_common::{DEFAULT_CONFIG_FILE, VERSION};
use webtest_e2e::RunnerFlags;

/// Run the browser frontend test suite against a scoped test server
#[derive(Parser, Debug)]
#[command(name = "webtest")]
#[command(author, version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, env = "WEBTEST_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Skip tests listed as flaky in the configuration
    #[arg(long = "skip-flaky-tests")]
    pub skip_flaky: bool,

    /// Run the selected tests N times, stopping at the first failing trial
    #[arg(long = "loop", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub loop_count: Option<u32>,

    /// Run even if preflight checks find problems
    #[arg(long)]
    pub force: bool,

    /// Verbose output from webtest and the test runner
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable the runner's remote debugger
    #[arg(long)]
    pub remote_debug: bool,

    /// Export results to an xunit XML file
    #[arg(long)]
    pub xunit_export: bool,

    /// Tests to run, by number (`05`), file name, or path; all when empty
    #[arg(value_name = "TEST")]
    pub tests: Vec<String>,
}

impl Cli {
    pub fn runner_flags(&self) -> RunnerFlags {
        RunnerFlags {
            verbose: self.verbose,
            remote_debug: self.remote_debug,
            xunit_export: self.xunit_export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["webtest"]).unwrap();
        assert!(!cli.skip_flaky);
        assert_eq!(cli.loop_count, None);
        assert!(cli.tests.is_empty());
        assert_eq!(cli.runner_flags(), RunnerFlags::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "webtest",
            "--skip-flaky-tests",
            "--loop",
            "5",
            "--force",
            "--verbose",
            "--remote-debug",
            "--xunit-export",
            "05",
            "01-login.js",
        ])
        .unwrap();

        assert!(cli.skip_flaky);
        assert!(cli.force);
        assert_eq!(cli.loop_count, Some(5));
        assert_eq!(cli.tests, vec!["05", "01-login.js"]);
        assert_eq!(
            cli.runner_flags(),
            RunnerFlags {
                verbose: true,
                remote_debug: true,
                xunit_export: true,
            }
        );
    }

    #[test]
    fn test_loop_zero_rejected() {
        assert!(Cli::try_parse_from(["webtest", "--loop", "0"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        use clap::CommandFactory;

        let err = Cli::try_parse_from(["webtest", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(Cli::command().render_version().contains(VERSION));
    }

    #[test]
    fn test_loop_needs_value() {
        assert!(Cli::try_parse_from(["webtest", "--loop"]).is_err());
    }
}
