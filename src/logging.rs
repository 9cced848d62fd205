//! Process log file and tracing setup.
//!
//! Logs go to stdout and to `<root>/logs/botlogs@YYYY-MM-DD@HHhMMm.log`, the
//! timestamp being the process start time. The file is opened by an explicit
//! [`LogFile::create`] call and flushed by [`LogFile::close`].

use chrono::{DateTime, Local};
use parking_lot::{Mutex, MutexGuard};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{BotError, Result};

const LOG_DIR: &str = "logs";

/// File name for a log started at `started_at`
pub fn log_file_name(started_at: &DateTime<Local>) -> String {
    format!("botlogs@{}.log", started_at.format("%Y-%m-%d@%Hh%Mm"))
}

/// The process log file
pub struct LogFile {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl LogFile {
    /// Create `<root>/logs/` if needed and open a fresh log file in it.
    pub fn create(root: &Path, started_at: DateTime<Local>) -> Result<Self> {
        let dir = root.join(LOG_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| BotError::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;

        let path = dir.join(log_file_name(&started_at));
        let file = File::create(&path).map_err(|e| BotError::Open {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A writer handle for a tracing `fmt` layer
    pub fn writer(&self) -> LogWriter {
        LogWriter {
            file: self.file.clone(),
        }
    }

    /// Flush and sync the file. Events logged afterwards are still written
    /// but no longer synced.
    pub fn close(&self) -> io::Result<()> {
        let mut file = self.file.lock();
        file.flush()?;
        file.sync_all()
    }
}

/// Cloneable handle writing into a [`LogFile`]
#[derive(Clone)]
pub struct LogWriter {
    file: Arc<Mutex<File>>,
}

/// Holds the file lock for the duration of one event
pub struct LogWriterGuard<'a>(MutexGuard<'a, File>);

impl Write for LogWriterGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriterGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriterGuard(self.file.lock())
    }
}

/// Subscriber logging to stdout and to `log_file`
pub fn subscriber(log_file: &LogFile, level: LevelFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file.writer())
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .with(level)
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(log_file: &LogFile, level: LevelFilter) -> Result<()> {
    subscriber(log_file, level)
        .try_init()
        .map_err(|e| BotError::LogInit {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_name() {
        let started = Local.with_ymd_and_hms(2024, 3, 5, 7, 9, 41).unwrap();
        assert_eq!(log_file_name(&started), "botlogs@2024-03-05@07h09m.log");
    }

    #[test]
    fn test_create_log_file() {
        let dir = TempDir::new().unwrap();
        let started = Local.with_ymd_and_hms(2024, 11, 30, 23, 59, 0).unwrap();

        let log_file = LogFile::create(dir.path(), started).unwrap();
        assert_eq!(
            log_file.path(),
            dir.path().join("logs").join("botlogs@2024-11-30@23h59m.log")
        );
        assert!(log_file.path().is_file());
    }

    #[test]
    fn test_events_reach_the_file() {
        let dir = TempDir::new().unwrap();
        let log_file = LogFile::create(dir.path(), Local::now()).unwrap();

        tracing::subscriber::with_default(subscriber(&log_file, LevelFilter::INFO), || {
            tracing::info!("store ready at {}", "/srv/bot");
            tracing::debug!("filtered out");
        });
        log_file.close().unwrap();

        let content = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(content.contains("store ready at /srv/bot"));
        assert!(content.contains("INFO"));
        assert!(!content.contains("filtered out"));
        assert!(!content.contains('\u{1b}'));
    }
}
