//! Disk logging.
//!
//! Two sinks, both file-based because the terminal is in raw mode: a
//! `tracing` subscriber for diagnostics (render degradation, discarded stale
//! completions), and a session activity log recording task lifecycle lines
//! in daily files named `session_<date>.log`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::model::LoggingConfig;

/// Expand a leading `~` against the home directory.
fn expand_log_dir(log_dir: &str) -> PathBuf {
    if let Some(rest) = log_dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(log_dir)
}

#[derive(Clone)]
struct FileWriter(Arc<Mutex<File>>);

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => file.write(buf),
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Install the tracing subscriber writing to `trace.log` in the log
/// directory. Never writes to stderr.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let log_dir = expand_log_dir(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join("trace.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let writer = FileWriter(Arc::new(Mutex::new(file)));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.trace_filter.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .init();
    Ok(())
}

/// Writes session activity lines to daily log files.
///
/// The file handle is cached for the lifetime of the logger. Falls back to
/// `/dev/null` if a log file cannot be created.
pub struct SessionLogger {
    enabled: bool,
    log_dir: String,
    handle: Option<(String, File)>,
}

impl SessionLogger {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            log_dir: config.log_dir.clone(),
            handle: None,
        }
    }

    /// Append one activity line with a timestamp. No-op when disabled.
    pub fn log(&mut self, line: &str) {
        if !self.enabled {
            return;
        }

        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let filename = format!("session_{}.log", date);

        if self.handle.as_ref().map(|(name, _)| name.as_str()) != Some(&filename) {
            let log_dir = expand_log_dir(&self.log_dir);
            let _ = fs::create_dir_all(&log_dir);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join(&filename))
                .unwrap_or_else(|_| {
                    // Fallback: a handle that goes nowhere
                    OpenOptions::new()
                        .write(true)
                        .open(if cfg!(unix) { "/dev/null" } else { "NUL" })
                        .unwrap()
                });
            self.handle = Some((filename, file));
        }

        if let Some((_, file)) = self.handle.as_mut() {
            let timestamp = chrono::Local::now().format("%H:%M:%S");
            let _ = writeln!(file, "[{}] {}", timestamp, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: false,
            log_dir: dir.path().display().to_string(),
            trace_filter: "info".to_string(),
        };
        let mut logger = SessionLogger::new(&config);
        logger.log("generated task 1");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn writes_daily_file_with_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: true,
            log_dir: dir.path().display().to_string(),
            trace_filter: "info".to_string(),
        };
        let mut logger = SessionLogger::new(&config);
        logger.log("generated task 42");
        logger.log("verify task 42: submitted 17, correct");

        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let contents =
            fs::read_to_string(dir.path().join(format!("session_{}.log", date))).unwrap();
        assert!(contents.contains("generated task 42"));
        assert!(contents.contains("submitted 17"));
        assert_eq!(contents.lines().count(), 2);
    }
}
