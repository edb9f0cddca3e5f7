//! Logging setup: console plus an optional daily rotating file

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_PREFIX: &str = "monitor";
const LOG_SUFFIX: &str = "log";
const RETENTION_DAYS: i64 = 14;
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete `monitor.YYYY-MM-DD.log` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path, now: DateTime<Local>) -> anyhow::Result<usize> {
    let cutoff = now - chrono::Duration::days(RETENTION_DAYS);
    let mut removed = 0;

    if !log_dir.exists() {
        return Ok(0);
    }
    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = log_date(name) else {
            continue;
        };
        let Some(midnight) = date
            .and_hms_opt(0, 0, 0)
            .and_then(|d| Local.from_local_datetime(&d).single())
        else {
            continue;
        };
        if midnight < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

fn log_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix(LOG_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(LOG_SUFFIX)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

async fn periodic_cleanup(log_dir: PathBuf) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir, Local::now()) {
            tracing::warn!(error = %e, "Log cleanup failed");
        }
    }
}

/// Initialize logging
///
/// `RUST_LOG` overrides `level` when set. With `log_dir`, JSON lines also go
/// to a daily file there, pruned after two weeks. Must run inside a tokio
/// runtime when `log_dir` is given.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(dir)?;
            tokio::spawn(periodic_cleanup(dir.to_path_buf()));
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_thread_ids(true)
                    .with_writer(std::sync::Mutex::new(appender)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
