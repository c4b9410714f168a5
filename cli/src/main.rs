//! rewind-rx
//!
//! Subscribes to one DMR talkgroup on a Rewind relay server and writes the
//! raw audio frame payloads to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rewind::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Receive a DMR talkgroup from a Rewind relay server
#[derive(Parser, Debug)]
#[command(name = "rewind-rx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("rewind-rx v{}", env!("CARGO_PKG_VERSION"));

    let config = match ClientConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        path = %args.config.display(),
        host = %config.server_host,
        port = config.server_port,
        talkgroup = config.talkgroup,
        "configuration loaded"
    );

    match RewindClient::new(config)
        .run(std::io::stdout(), shutdown_signal())
        .await
    {
        Ok(()) => {
            info!("session closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "session ended");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("interrupted"),
        () = terminate => info!("terminated"),
    }
}
