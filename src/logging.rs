//! Diagnostic logging via `tracing`.
//!
//! The chat screen owns the terminal, so it logs to a file; one-shot commands
//! log to stderr. `TIMMGPT_LOG` accepts any `EnvFilter` directive.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::io::project_dirs;

pub const LOG_ENV_VAR: &str = "TIMMGPT_LOG";

pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `<data dir>/timmgpt.log`, when a data directory can be determined.
pub fn default_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("timmgpt.log"))
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber. Calling it twice leaves the first one in
/// place.
pub fn init_logging(target: LogTarget, default_level: &str) -> std::io::Result<()> {
    let filter = filter(default_level);
    match target {
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init();
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init();
        }
    }
    Ok(())
}
