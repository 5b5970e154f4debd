mod cli;
mod commands;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use reeldeck_core::config::AppConfig;
use reeldeck_core::store::{SharedStore, SqliteStore};

use crate::cli::Cli;
use crate::commands::App;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e}");
            if e.is_unauthorized() {
                eprintln!("Trakt rejected the session, run `reeldeck login` again.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    let db_path = AppConfig::ensure_db_path()?;
    tracing::debug!(path = %db_path.display(), "Opening store");
    let store: SharedStore = Arc::new(SqliteStore::open(&db_path)?);

    let app = App { config, store };
    commands::run(&app, cli.command).await
}

/// Log to stderr and to a daily rolling file. `RUST_LOG` overrides the
/// default `reeldeck=info` filter. The returned guard flushes the file writer.
fn init_logging() -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reeldeck=info"))
    };
    let stderr = fmt::layer().with_writer(std::io::stderr).with_filter(filter());

    let log_dir = AppConfig::log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        tracing_subscriber::registry().with(stderr).init();
        tracing::warn!(error = %e, dir = %log_dir.display(), "File logging disabled");
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "reeldeck.log"));
    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter());

    tracing_subscriber::registry().with(stderr).with(file).init();
    Some(guard)
}
