//! Scoped test server + database session
//!
//! The session owns the server process. Stopping it is guaranteed: either
//! through [`TestSession::stop`] or, when the session is dropped, through
//! the server handle's own teardown.

use tracing::info;

use webtest_common::{ChildEnvironment, WebtestConfig};

use crate::database::{DatabaseFixture, Fixture};
use crate::error::E2eResult;
use crate::server::{ServerConfig, ServerHandle};

/// Everything needed to bring a session up
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server: ServerConfig,
    pub database: DatabaseFixture,
}

impl SessionConfig {
    pub fn from_config(config: &WebtestConfig, env: ChildEnvironment) -> Self {
        let mut server = ServerConfig::from_settings(&config.server, env.clone());
        server.log_file = Some(config.paths.output_dir.join("server.log"));
        Self {
            server,
            database: DatabaseFixture::new(&config.database, env),
        }
    }
}

/// A running test server pointed at a freshly reset database
pub struct TestSession {
    server: Option<ServerHandle>,
    database: DatabaseFixture,
}

impl TestSession {
    /// Reset the database, start the server, then write credentials
    pub async fn start(config: SessionConfig) -> E2eResult<Self> {
        config.database.reset().await?;

        let server = ServerHandle::spawn(config.server).await?;
        let session = Self {
            server: Some(server),
            database: config.database,
        };

        // Credentials are generated while the server points at the test database
        session.database.generate_credentials().await?;

        info!("Test session ready at {}", session.base_url());
        Ok(session)
    }

    pub fn base_url(&self) -> &str {
        self.server.as_ref().map(|s| s.base_url()).unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Fixture to reset between test files, if configured
    pub fn between_files(&self) -> Option<&dyn Fixture> {
        self.database
            .reset_between_files()
            .then_some(&self.database as &dyn Fixture)
    }

    /// Tear the session down; dropping the session does the same
    pub async fn stop(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop().await?;
            info!("Test session stopped");
        }
        Ok(())
    }
}
