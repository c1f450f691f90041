//! Subscriber setup for hosts embedding the engine. The library only emits
//! `tracing` events; nothing is written anywhere until a host calls [`init`],
//! usually through [`crate::EngineConfig::init_logging`].

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

pub const DEFAULT_LEVEL: &str = "info";
pub const LOG_FILE_PREFIX: &str = "dxquiz-engine.log";
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// `EnvFilter` directives, e.g. `info` or `dxquiz_engine=debug,warn`.
    pub level: String,
    /// Daily-rolled log files are written here when set.
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// `DXQ_LOG_LEVEL`, then `RUST_LOG`, for the filter. File output is off
    /// unless `DXQ_FILE_LOGS` is `1` or `true`; `DXQ_LOG_DIR` picks the
    /// directory.
    pub fn from_env() -> Self {
        let level = std::env::var("DXQ_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let file_logs = std::env::var("DXQ_FILE_LOGS")
            .is_ok_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true"));
        let file_dir = file_logs.then(|| {
            std::env::var("DXQ_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
        });
        Self { level, file_dir }
    }

    /// Parsed filter; `None` when the directives are malformed.
    pub fn filter(&self) -> Option<EnvFilter> {
        EnvFilter::try_new(self.level.trim()).ok()
    }
}

/// Keeps the non-blocking file writer alive; dropping it flushes.
#[derive(Debug)]
pub struct LogGuard {
    installed: bool,
    file: Option<WorkerGuard>,
}

impl LogGuard {
    /// False when another global subscriber was already in place.
    pub fn installed(&self) -> bool {
        self.installed
    }

    pub fn writes_files(&self) -> bool {
        self.file.is_some()
    }
}

/// Installs the global subscriber: stdout always, plus a daily file when
/// `settings.file_dir` is set. A malformed filter falls back to
/// [`DEFAULT_LEVEL`] with a warning. Calling again is harmless; the first
/// subscriber stays. Fails only when the log directory cannot be created.
pub fn init(settings: &LogSettings) -> Result<LogGuard> {
    let (filter, rejected) = match settings.filter() {
        Some(filter) => (filter, false),
        None => (EnvFilter::new(DEFAULT_LEVEL), true),
    };

    let (file_layer, worker) = match &settings.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    if rejected {
        tracing::warn!(level = %settings.level, fallback = DEFAULT_LEVEL, "invalid log filter");
    }
    if installed {
        tracing::debug!(files = worker.is_some(), "logging initialized");
    }
    Ok(LogGuard {
        installed,
        file: worker.filter(|_| installed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_filter_is_rejected() {
        let bad = LogSettings {
            level: "not a [valid filter".to_string(),
            file_dir: None,
        };
        assert!(bad.filter().is_none());
        assert!(LogSettings::default().filter().is_some());
    }

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        let _first = init(&LogSettings::default()).unwrap();
        let second = init(&LogSettings {
            level: "not a [valid filter".to_string(),
            file_dir: None,
        })
        .unwrap();
        assert!(!second.installed());
        assert!(!second.writes_files());
    }

    #[test]
    fn test_file_dir_created_on_init() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("nested").join("logs");
        let settings = LogSettings {
            level: "debug".to_string(),
            file_dir: Some(logs.clone()),
        };
        let _guard = init(&settings).unwrap();
        assert!(logs.is_dir());
    }

    #[test]
    fn test_uncreatable_dir_is_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let settings = LogSettings {
            level: DEFAULT_LEVEL.to_string(),
            file_dir: Some(file.path().join("logs")),
        };
        assert_eq!(init(&settings).unwrap_err().code(), "IO");
    }
}
