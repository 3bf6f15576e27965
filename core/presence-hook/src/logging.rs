//! Logging setup: stderr plus a daily rolling file.
//!
//! `PRESENCE_DEBUG_LOG=1` forces debug output; otherwise `RUST_LOG` applies,
//! defaulting to `info`. The returned guard must live until exit so the file
//! writer flushes.

use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEBUG_ENV: &str = "PRESENCE_DEBUG_LOG";
const LOG_DIR_NAME: &str = "edmc-discord-presence";
const LOG_FILE_PREFIX: &str = "presence-hook.log";

pub fn init() -> Option<WorkerGuard> {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let appender = dirs::data_local_dir()
        .map(|dir| dir.join(LOG_DIR_NAME).join("logs"))
        .and_then(|log_dir| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(log_dir)
                .ok()
        });

    let Some(appender) = appender else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_ansi(false).with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Some(guard)
}
