//! webtest CLI - Main Entry Point
//!
//! Runs the browser frontend test suite file by file against a scoped test
//! server and database, and exits with the first failing file's code.

use clap::Parser;

mod app;
mod args;
mod output;

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let code = match app::execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(code);
}
