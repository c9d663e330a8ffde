//! One webtest run: preflight, discovery, session, runner loop, report

use tracing::{debug, info, warn};

use webtest_common::env::running_under_ci;
use webtest_common::{ChildEnvironment, WebtestConfig};
use webtest_e2e::discovery::skip_flaky;
use webtest_e2e::runner::{prepare_output_dirs, write_results};
use webtest_e2e::{
    preflight, ProcessLauncher, RunOptions, SessionConfig, StdinPause, TestDiscovery, TestRunner,
    TestSession,
};

use crate::args::Cli;
use crate::output;

/// Exit code after SIGINT
const INTERRUPTED: i32 = 130;

/// Exit code after SIGTERM
#[cfg(unix)]
const TERMINATED: i32 = 143;

/// Execute the run and return the process exit code
pub async fn execute(cli: Cli) -> anyhow::Result<i32> {
    let config = WebtestConfig::load(&cli.config)?;
    debug!("Loaded configuration from {}", cli.config.display());

    preflight::enforce(&preflight::check(&config), cli.force)?;

    let mut files = TestDiscovery::from_config(&config.paths).resolve(&cli.tests)?;
    if cli.skip_flaky {
        if config.runner.flaky_tests.is_empty() {
            warn!("--skip-flaky-tests given, but runner.flaky_tests is empty");
        }
        files = skip_flaky(files, &config.runner.flaky_tests);
    }

    let flags = cli.runner_flags();
    prepare_output_dirs(&config, flags.xunit_export)?;
    if flags.remote_debug {
        info!(
            "Remote debugger enabled on port {}",
            config.runner.remote_debug_port
        );
    }

    let env = ChildEnvironment::from_settings(&config.env);
    let launcher = ProcessLauncher::new(&config.runner, &flags, &config.xunit_file(), env.clone());
    let mut runner = TestRunner::new(
        launcher,
        StdinPause,
        RunOptions::from_config(&config, cli.loop_count),
    );

    let interrupt = shutdown_signal();
    tokio::pin!(interrupt);

    let mut session = tokio::select! {
        biased;
        signal = &mut interrupt => return interrupted(signal?),
        session = TestSession::start(SessionConfig::from_config(&config, env)) => session?,
    };

    let outcome = tokio::select! {
        biased;
        signal = &mut interrupt => Err(signal),
        outcome = runner.run(&files, session.between_files()) => Ok(outcome),
    };
    session.stop().await?;

    let outcome = match outcome {
        Ok(outcome) => outcome?,
        Err(signal) => return interrupted(signal?),
    };

    write_results(&outcome, &config.summary_file())?;
    output::print_summary(&outcome);

    if outcome.exit_code != 0 {
        output::print_failure_help(&config.report, running_under_ci(&config.env.ci_var));
    }
    Ok(outcome.exit_code)
}

/// Resolves with the exit code to use once SIGINT or SIGTERM arrives
async fn shutdown_signal() -> std::io::Result<i32> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|_| INTERRUPTED),
            _ = terminate.recv() => Ok(TERMINATED),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| INTERRUPTED)
    }
}

fn interrupted(code: i32) -> anyhow::Result<i32> {
    warn!("Interrupted, shutting down the test session");
    Ok(code)
}
