use std::io::IsTerminal;
use std::path::Path;

use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

use crate::Cli;

const DEFAULT_LOG_FILENAME: &str = "estr.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Logs go to stderr unless a file is given; stdout carries results only.
/// The returned guard flushes file output and must outlive the command.
pub fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let level = cli.log_level.as_tracing_level();
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let (writer, guard) = match &cli.log_file {
        Some(path) => {
            let (directory, filename) = log_file_location(path);
            let appender = tracing_appender::rolling::never(directory, filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };
    let to_file = guard.is_some();

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(!to_file && std::io::stderr().is_terminal());
    let layer = match (cli.log_json, to_file) {
        (true, _) => layer.json().boxed(),
        (false, true) => layer.boxed(),
        // short-lived command output needs no timestamps
        (false, false) => layer.without_time().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
    guard
}

fn log_file_location(path: &Path) -> (&Path, &str) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILENAME);
    (directory, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn log_level_converts_to_tracing_level() {
        assert_eq!(LogLevel::Trace.as_tracing_level(), Level::TRACE);
        assert_eq!(LogLevel::Debug.as_tracing_level(), Level::DEBUG);
        assert_eq!(LogLevel::Info.as_tracing_level(), Level::INFO);
        assert_eq!(LogLevel::Warn.as_tracing_level(), Level::WARN);
        assert_eq!(LogLevel::Error.as_tracing_level(), Level::ERROR);
    }

    #[test]
    fn log_file_location_splits_directory_and_name() {
        assert_eq!(
            log_file_location(Path::new("logs/estr-debug.log")),
            (Path::new("logs"), "estr-debug.log")
        );
        assert_eq!(
            log_file_location(Path::new("trace.log")),
            (Path::new("."), "trace.log")
        );
        assert_eq!(log_file_location(Path::new("/")), (Path::new("."), DEFAULT_LOG_FILENAME));
    }

    #[test]
    fn warn_filters_info_messages() {
        let warn_level = LogLevel::Warn.as_tracing_level();
        let info_level = LogLevel::Info.as_tracing_level();
        assert!(warn_level < info_level);
    }
}
