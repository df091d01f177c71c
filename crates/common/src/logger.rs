use crate::error::BioBlockError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// File name of the service log inside the log directory
pub const LOG_FILE_NAME: &str = "bioblock.log";

/// Dependencies that are too chatty at debug level
const QUIET_TARGETS: [&str; 4] = ["actix_server=warn", "hyper=warn", "reqwest=warn", "calamine=warn"];

/// Open `<log_dir>/bioblock.log` for appending, creating the directory
fn open_log_file(log_dir: &Path) -> Result<(File, PathBuf), BioBlockError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        BioBlockError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            BioBlockError::config(format!("Failed to open log file {}: {}", path.display(), e))
        })?;

    Ok((file, path))
}

/// Server logging: console plus an append-only file without ANSI colors
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), BioBlockError> {
    let (log_file, log_path) = open_log_file(log_dir)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(build_filter(log_level));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(build_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| BioBlockError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging to {} at level {}", log_path.display(), log_level);
    Ok(())
}

/// Console-only logging for one-shot CLI commands
pub fn setup_console_logging(log_level: &str) -> Result<(), BioBlockError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(build_filter(log_level))
        .try_init()
        .map_err(|e| BioBlockError::config(format!("Failed to initialize logging: {}", e)))
}

/// `RUST_LOG` wins over the configured level
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = parse_log_level(log_level).as_str().to_lowercase();
    let directives = std::iter::once(level.as_str())
        .chain(QUIET_TARGETS)
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}

/// Parse a level name, case-insensitive. Unknown names fall back to INFO.
pub fn parse_log_level(level: &str) -> Level {
    level
        .trim()
        .to_lowercase()
        .parse::<Level>()
        .or_else(|_| match level.trim().to_lowercase().as_str() {
            "warning" => Ok(Level::WARN),
            _ => Err(()),
        })
        .unwrap_or_else(|_| {
            eprintln!("Unknown log level '{}', using info", level);
            Level::INFO
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level(" Error "), Level::ERROR);
        assert_eq!(parse_log_level("WARNING"), Level::WARN);
        assert_eq!(parse_log_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("nested/log");

        let (_, path) = open_log_file(&log_dir).unwrap();

        assert_eq!(path, log_dir.join(LOG_FILE_NAME));
        assert!(path.exists());
    }
}
