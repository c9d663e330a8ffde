//! Server management - spawning and health checking the application under test

use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use webtest_common::config::ServerSettings;
use webtest_common::ChildEnvironment;

use crate::error::{E2eError, E2eResult};

/// Grace period between SIGTERM and a forced kill
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Handle to a running server process
pub struct ServerHandle {
    child: Child,
    base_url: String,
    port: u16,
    stopped: bool,
}

impl ServerHandle {
    /// Spawn the test server and wait until it is ready
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let base_url = format!("http://{}:{}", config.host, port);

        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| E2eError::ServerStartup("empty server command".to_string()))?;

        info!("Spawning test server on port {}", port);

        let mut cmd = Command::new(program);
        cmd.args(args);
        config.env.apply(&mut cmd);
        cmd.env("WEBTEST_SERVER_PORT", port.to_string())
            .env("WEBTEST_SERVER_HOST", &config.host)
            .stdin(Stdio::null());

        match &config.log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let log = File::create(path)?;
                cmd.stdout(log.try_clone()?).stderr(log);
                debug!("Server output goes to {}", path.display());
            }
            None => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e))
        })?;

        let mut handle = ServerHandle {
            child,
            base_url,
            port,
            stopped: false,
        };

        if let Some(path) = &config.health_path {
            handle.wait_for_healthy(path, config.startup_timeout).await?;
            info!("Server is healthy at {}", handle.base_url);
        }

        Ok(handle)
    }

    /// Poll the health endpoint until it answers 2xx
    async fn wait_for_healthy(&mut self, path: &str, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}{}", self.base_url, path);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            if let Some(status) = self.child.try_wait()? {
                return Err(E2eError::ServerStartup(format!(
                    "server exited before becoming healthy ({})",
                    status
                )));
            }

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Connection refused is expected while server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Stop the server; safe to call more than once
    pub async fn stop(&mut self) -> E2eResult<()> {
        if !self.terminate()? {
            return Ok(());
        }
        let deadline = Instant::now() + STOP_GRACE;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                return Ok(());
            }
            sleep(Duration::from_millis(50)).await;
        }
        warn!("Server ignored SIGTERM, killing");
        self.force_kill()
    }

    /// Same as [`ServerHandle::stop`], for contexts that cannot await
    fn stop_blocking(&mut self) -> E2eResult<()> {
        if !self.terminate()? {
            return Ok(());
        }
        let deadline = Instant::now() + STOP_GRACE;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        warn!("Server ignored SIGTERM, killing");
        self.force_kill()
    }

    /// Ask the server to exit; returns true while it may still be shutting down
    fn terminate(&mut self) -> E2eResult<bool> {
        if self.stopped {
            return Ok(false);
        }
        self.stopped = true;

        if self.child.try_wait()?.is_some() {
            debug!("Server already exited");
            return Ok(false);
        }

        info!("Stopping server (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                return Ok(true);
            }
        }

        self.force_kill()?;
        Ok(false)
    }

    fn force_kill(&mut self) -> E2eResult<()> {
        let _ = self.child.kill();
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop_blocking();
    }
}

/// Configuration for spawning a server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Command line of the server
    pub command: Vec<String>,

    pub host: String,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Readiness endpoint; `None` means ready once spawned
    pub health_path: Option<String>,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Where server stdout/stderr go; discarded when `None`
    pub log_file: Option<PathBuf>,

    /// Test environment
    pub env: ChildEnvironment,
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings, env: ChildEnvironment) -> Self {
        Self {
            command: settings.command.clone(),
            host: settings.host.clone(),
            port: (settings.port != 0).then_some(settings.port),
            health_path: settings
                .health_check
                .then(|| settings.health_path.clone()),
            startup_timeout: Duration::from_secs(settings.startup_timeout_secs),
            log_file: None,
            env,
        }
    }
}

/// Find a free port to use
pub fn find_free_port() -> std::io::Result<u16> {
    use std::net::TcpListener;

    Ok(TcpListener::bind("127.0.0.1:0")?.local_addr()?.port())
}
