use std::fs;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber: a daily-rolled file under `config.dir`
/// plus a console layer on stderr, so `--json` output on stdout stays clean.
///
/// `RUST_LOG` takes precedence over `config.filter`.
pub fn init_logging(config: &LoggingConfig) {
    let filter = build_filter(config);

    let file_layer = match file_writer(config) {
        Some((writer, guard)) => {
            // The worker must outlive every span; the process exit flushes it.
            std::mem::forget(guard);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            Some(if config.json { layer.json().boxed() } else { layer.boxed() })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// `None` when file logging is off or the directory cannot be created.
fn file_writer(config: &LoggingConfig) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if !config.file {
        return None;
    }
    if let Err(e) = fs::create_dir_all(&config.dir) {
        eprintln!("⚠️  Cannot create log directory {}: {}", config.dir.display(), e);
        return None;
    }
    let appender = rolling::daily(&config.dir, &config.file_name);
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_writer_disabled() {
        let config = LoggingConfig {
            file: false,
            ..LoggingConfig::default()
        };
        assert!(file_writer(&config).is_none());
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let root = TempDir::new().unwrap();
        let config = LoggingConfig {
            dir: root.path().join("nested/logs"),
            ..LoggingConfig::default()
        };

        assert!(file_writer(&config).is_some());
        assert!(config.dir.is_dir());
    }
}
