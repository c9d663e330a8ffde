//! External browser-test binary invocation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

use webtest_common::config::RunnerSettings;
use webtest_common::ChildEnvironment;

use crate::error::{E2eError, E2eResult};

/// Flags from the command line that change how the runner is invoked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerFlags {
    pub verbose: bool,
    pub remote_debug: bool,
    pub xunit_export: bool,
}

impl RunnerFlags {
    /// Runner arguments, in the order they go before the test file
    pub fn to_args(&self, remote_debug_port: u16, xunit_file: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if self.remote_debug {
            args.push(format!("--remote-debugger-port={}", remote_debug_port));
            args.push("--remote-debugger-autorun=yes".to_string());
        }
        if self.verbose {
            args.push("--verbose".to_string());
            args.push("--log-level=debug".to_string());
        }
        if self.xunit_export {
            args.push(format!("--xunit={}", xunit_file.display()));
        }
        args
    }
}

/// Runs one test file and reports its exit code
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn run_file(&self, file: &Path) -> E2eResult<i32>;
}

/// Launches the configured test binary as a child process
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    binary: PathBuf,
    args: Vec<String>,
    subcommand: Option<String>,
    env: ChildEnvironment,
}

impl ProcessLauncher {
    pub fn new(
        settings: &RunnerSettings,
        flags: &RunnerFlags,
        xunit_file: &Path,
        env: ChildEnvironment,
    ) -> Self {
        Self {
            binary: settings.binary.clone(),
            args: flags.to_args(settings.remote_debug_port, xunit_file),
            subcommand: (!settings.subcommand.is_empty()).then(|| settings.subcommand.clone()),
            env,
        }
    }

    /// Build the command for a single test file
    pub fn command_for(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);
        if let Some(sub) = &self.subcommand {
            cmd.arg(sub);
        }
        cmd.arg(file);
        self.env.apply(&mut cmd);
        cmd
    }

    /// Printable command line
    pub fn describe(&self, file: &Path) -> String {
        let cmd = self.command_for(file);
        std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn run_file(&self, file: &Path) -> E2eResult<i32> {
        info!("Running {}", self.describe(file));

        let status = tokio::process::Command::from(self.command_for(file))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| E2eError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        let code = exit_code(status);
        debug!("{} exited with {}", file.display(), code);
        Ok(code)
    }
}

/// Exit code of a finished child; signals map to 128 + signal number
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
