//! Tracing setup.
//!
//! CLI runs log compactly to stderr. While the TUI owns the terminal, logs
//! go to `quill/quill.log` instead. The filter defaults to `warn` and can
//! be overridden with `QUILL_LOG` (or `RUST_LOG`), e.g. `QUILL_LOG=debug`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file inside `quill/` used while the TUI is running
pub const LOG_FILE: &str = "quill.log";

/// Where log lines are written
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("QUILL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(target: LogTarget) {
    let result = match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(env_filter())
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init(),
        LogTarget::File(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("warning: could not open log file {}: {}", path.display(), e);
                    return;
                }
            };
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
        }
    };
    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
