//! File logging.
//!
//! The TUI owns the terminal, so log output goes to a file. The level comes
//! from `HSTUI_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "HSTUI_LOG";

/// Default log file location.
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hstui")
        .join("hstui.log")
}

/// Install the global subscriber writing to `path`.
///
/// Returns the appender guard, which must stay alive until exit so buffered
/// lines are flushed. Returns `None` (after a note on stderr) if the log file
/// cannot be set up; logging is never fatal.
pub fn init(path: &Path) -> Option<WorkerGuard> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("hstui: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let Some(file_name) = path.file_name() else {
        eprintln!("hstui: log path {} has no file name", path.display());
        return None;
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("hstui: logging disabled: {e}");
        return None;
    }

    tracing::info!(path = %path.display(), "logging initialized");
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_without_file_name_disables_logging() {
        assert!(init(Path::new("/")).is_none());
    }

    #[test]
    fn test_default_log_path_is_in_hstui_dir() {
        let path = default_log_path();
        assert_eq!(path.file_name().unwrap(), "hstui.log");
        assert!(path.parent().unwrap().ends_with("hstui"));
    }
}
