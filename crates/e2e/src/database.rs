//! Database fixture helpers
//!
//! The fixture itself lives in the application; this module only drives the
//! helper commands that restore it and write test credentials.

use async_trait::async_trait;
use std::process::Command;
use tracing::{debug, info};

use webtest_common::config::DatabaseSettings;
use webtest_common::ChildEnvironment;

use crate::error::{E2eError, E2eResult};
use crate::launcher::exit_code;

/// Restores shared state between test files
#[async_trait]
pub trait Fixture: Send + Sync {
    async fn reset(&self) -> E2eResult<()>;
}

/// Test database driven through external helper commands
#[derive(Debug, Clone)]
pub struct DatabaseFixture {
    reset_command: Vec<String>,
    credentials_command: Vec<String>,
    reset_between_files: bool,
    env: ChildEnvironment,
}

impl DatabaseFixture {
    pub fn new(settings: &DatabaseSettings, env: ChildEnvironment) -> Self {
        Self {
            reset_command: settings.reset_command.clone(),
            credentials_command: settings.credentials_command.clone(),
            reset_between_files: settings.reset_between_files,
            env,
        }
    }

    /// Whether the runner should reset after every test file
    pub fn reset_between_files(&self) -> bool {
        self.reset_between_files
    }

    /// Write credentials for the fixture users
    pub async fn generate_credentials(&self) -> E2eResult<()> {
        if self.credentials_command.is_empty() {
            return Ok(());
        }
        info!("Generating test credentials");
        self.run_helper(&self.credentials_command).await
    }

    async fn run_helper(&self, argv: &[String]) -> E2eResult<()> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        self.env.apply(&mut cmd);

        let command = argv.join(" ");
        debug!("Running fixture helper: {}", command);

        let status = tokio::process::Command::from(cmd)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| E2eError::Launch {
                binary: program.into(),
                source,
            })?;

        if !status.success() {
            return Err(E2eError::DatabaseFixture {
                command,
                status: format!("exit code {}", exit_code(status)),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Fixture for DatabaseFixture {
    async fn reset(&self) -> E2eResult<()> {
        info!("Resetting test database");
        self.run_helper(&self.reset_command).await
    }
}
