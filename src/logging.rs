//! Tracing setup for each output mode.

use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "autovideo=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Human-readable lines on stderr (text and JSON modes).
    Stderr,
    /// Only errors, on stderr.
    Silent,
    /// Append to a file so the alternate screen stays clean.
    File,
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(target: LogTarget, log_path: Option<&Path>) {
    let res = match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(env_filter(DEFAULT_FILTER))
            .try_init(),
        LogTarget::Silent => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(EnvFilter::new("error"))
            .try_init(),
        LogTarget::File => {
            let Some(file) = log_path.and_then(open_log_file) else {
                // Nowhere to write without disturbing the terminal.
                return;
            };
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(env_filter(DEFAULT_FILTER))
                .try_init()
        }
    };
    let _ = res;
}

fn open_log_file(path: &Path) -> Option<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}
