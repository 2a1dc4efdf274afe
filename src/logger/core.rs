//! Logging primitives for the APS graph builder.
//!
//! A purposely minimal logging surface: a consistently-typed `LogLevel`
//! and a `Logger` trait that is easy to implement in tests and small
//! binaries. Corpus builds are long-running batch jobs, so the only hard
//! requirements are periodic progress lines and a persistent record of
//! each build; for filtering or structured fields, wrap these primitives
//! with a more featureful logger.
//!
//! Implementors of `Logger` must be `Send + Sync + 'static` so trait
//! objects can be stored in the global facade and shared between threads.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns a short string representation suitable for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Minimal logger interface used throughout the project.
///
/// Must be `Send + Sync + 'static` for global usage. The core requirement
/// is a single `log` method; convenience helpers like `info` and `warn`
/// are implemented in terms of `log` so tests can provide a tiny
/// implementation without implementing all helpers.
pub trait Logger: Send + Sync + 'static {
    /// Emit a log record at the given level.
    fn log(&self, _level: LogLevel, _message: &str) {}

    /// Flush any buffered records.
    fn flush(&self) {}

    /// Convenience methods
    fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// No-op logger used by default in tests and when logging is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str) {
        // intentionally do nothing
    }
}

/// Small stdout logger used by the CLI.
///
/// Writes a compact JSON object to stdout with a timestamp, level and
/// message so build logs are easy to parse by structured log collectors.
/// Example: {"ts":"...","level":"INFO","msg":"..."}
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let ts = chrono::Utc::now().to_rfc3339();
        let json = serde_json::json!({
            "ts": ts,
            "level": level.as_str(),
            "msg": message,
        });
        println!("{}", json);
    }

    fn flush(&self) {
        // stdout is line-buffered; nothing to do
    }
}

/// File-backed logger that appends to a versioned `build_N.log`.
///
/// Each build run gets its own log file: the version is the count of
/// `build_*.log` files already present in the log directory, so logs
/// from earlier runs are never clobbered. Records are formatted as
/// `<timestamp> <LEVEL> - <message>`, one per line.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogger {
    /// Creates a logger writing to the next `build_N.log` under `dir`.
    ///
    /// The directory is created if it does not exist.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let version = fs::read_dir(dir)?
            .flatten()
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with("build_") && name.ends_with(".log")
            })
            .count();
        let path = dir.join(format!("build_{}.log", version));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file this logger writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for FileLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let ts = chrono::Utc::now().to_rfc3339();
        if let Ok(mut file) = self.file.lock() {
            // A failed write on a diagnostics channel must not kill the build.
            let _ = writeln!(file, "{} {} - {}", ts, level.as_str(), message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
