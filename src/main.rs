//! sg300-batch - Entry point
//!
//! Parses CLI arguments, validates the host and command list, asks for the
//! SSH password and runs the batch. Ctrl+C or SIGTERM closes the session,
//! restores the terminal and exits with status 130.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sg300_batch::app;
use sg300_batch::config::{Args, Config};
use sg300_batch::error::Sg300Error;
use sg300_batch::prompt::TerminalPrompt;
use sg300_batch::terminal::TerminalState;

/// Exit code used when interrupted by a signal
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries command output
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("sg300-batch v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Target {}@{}:{}, {} command(s)",
        config.username,
        config.host,
        config.port,
        config.commands.len()
    );

    let terminal = TerminalState::capture();
    let mut prompt = TerminalPrompt;
    let mut console = std::io::stdout();
    let result = app::run(&config, &mut prompt, &mut console, shutdown_signal()).await;

    match result {
        Ok(report) => {
            info!(
                "Completed {} command(s), transcript at {}",
                report.commands_run,
                report.log_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(Sg300Error::Interrupted) => {
            terminal.restore();
            let _ = console.flush();
            error!("Run interrupted");
            // A password read still waiting on the blocking pool would
            // stall runtime shutdown
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Completes on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), aborting...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, aborting...");
        }
    }
}
