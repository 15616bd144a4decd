//! Logging setup and output directories

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_DIR: &str = "output/logs";
pub const LOG_FILE_PREFIX: &str = "dex-arb-engine.log";

/// Keeps the non-blocking file writer flushing; hold it for the life of `main`.
pub struct LoggingGuard {
    _file: WorkerGuard,
}

/// Console plus hourly rolling file output, filtered by `RUST_LOG` (default `info`).
///
/// With `LOG_FORMAT=json` the file layer writes one JSON object per event.
pub fn setup_logging() -> Result<LoggingGuard> {
    let file_appender = tracing_appender::rolling::hourly(LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let json_file = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let (json_layer, compact_layer) = if json_file {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_current_span(false);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(false)
            .compact();
        (None, Some(layer))
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_level(true)
        )
        .with(json_layer)
        .with(compact_layer)
        .with(filter)
        .init();

    Ok(LoggingGuard { _file: guard })
}

/// Creates the log, opportunity and audit directories under `root`.
pub fn setup_output_directories(root: &Path) -> Result<()> {
    for dir in ["logs", "opportunities", "audit"] {
        fs::create_dir_all(root.join(dir))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_tree_is_created() {
        let dir = tempfile::tempdir().unwrap();
        setup_output_directories(dir.path()).unwrap();

        for sub in ["logs", "opportunities", "audit"] {
            assert!(dir.path().join(sub).is_dir());
        }
    }
}
