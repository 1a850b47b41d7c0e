//! Process-wide tracing subscriber.
//!
//! `RUST_LOG` takes precedence; otherwise `LOG_LEVEL` applies to everything
//! except sqlx, which is held at `warn`. Development and test get the
//! human-readable formatter. Staging and production emit JSON lines to
//! stdout and also write daily-rotated files under `logs/`: every event to
//! `combined.<date>.log` (14 days kept), errors alone to `error.<date>.log`
//! (30 days kept).

use std::path::Path;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{AppConfig, Environment};

pub const SERVICE_NAME: &str = "template-backend";

pub const LOG_DIR: &str = "logs";

pub fn init(config: &AppConfig) {
    let level = config.log_level.as_str();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sqlx=warn")));

    let mut file_error = None;

    // try_init: a subscriber may already be installed (tests, embedding)
    let result = match config.environment {
        Environment::Staging | Environment::Production => {
            let dir = Path::new(LOG_DIR);
            let (combined, errors) = match (daily_file(dir, "combined", 14), daily_file(dir, "error", 30)) {
                (Ok(combined), Ok(errors)) => (Some(combined), Some(errors)),
                (Err(e), _) | (_, Err(e)) => {
                    file_error = Some(e);
                    (None, None)
                }
            };

            let combined_layer = combined.map(|writer| {
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_ansi(false)
                    .with_writer(writer)
            });
            let error_layer = errors.map(|writer| {
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(LevelFilter::ERROR)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_current_span(false))
                .with(combined_layer)
                .with(error_layer)
                .try_init()
        }
        Environment::Development | Environment::Test => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init()
        }
    };

    if result.is_ok() {
        tracing::debug!(
            service = SERVICE_NAME,
            environment = config.environment.as_str(),
            level,
            "Logging initialised"
        );
        if let Some(e) = file_error {
            tracing::warn!(dir = LOG_DIR, error = %e, "File logging disabled");
        }
    }
}

fn daily_file(dir: &Path, prefix: &str, keep: usize) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(keep)
        .build(dir)
}
