//! Tracing setup.
//!
//! `serve` and `search` log to stdout. `browse` owns the terminal, so its logs
//! go to `.logs/deezer-discover.YYYY-MM-DD.log` with daily rotation.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "deezer-discover";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("deezer_discover=debug,tower_http=debug,info")
        } else {
            EnvFilter::new("deezer_discover=info,tower_http=info,warn")
        }
    })
}

pub fn setup_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter(verbose))
        .init();
}

/// Installs file logging. Logs are flushed until the returned guard drops.
pub fn setup_file_tracing(verbose: bool) -> std::io::Result<WorkerGuard> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter(verbose))
        .init();

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(guard)
}
