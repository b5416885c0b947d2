//! Tracing subscriber setup
//!
//! File output always goes through a non-blocking rolling appender. Text mode
//! also mirrors events to stdout; JSON mode writes one flattened object per
//! event with the enclosing span (e.g. the HTTP request span) attached.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Noisy dependencies held at `warn` unless `RUST_LOG` says otherwise.
/// sqlx logs every statement at `info`.
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper", "h2"];

/// Directives for `level` applied to this crate and the HTTP trace layer
pub fn filter_directives(level: &str) -> String {
    let mut directives = vec![level.to_string(), format!("tower_http={}", level)];
    directives.extend(QUIET_TARGETS.iter().map(|t| format!("{}=warn", t)));
    directives.join(",")
}

/// Map the config `rotation` value; validation rejects anything else
pub fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender =
        RollingFileAppender::new(rotation(&config.rotation), &config.log_dir, &config.log_file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(writer)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(true)
            .with_writer(writer)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    tracing::info!(
        app = %config.app,
        level = %config.log_level,
        json = config.use_json,
        dir = %config.log_dir,
        "Logging initialised"
    );
    guard
}
