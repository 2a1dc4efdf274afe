//! Top-level logger exports and a small global facade.
//!
//! This module re-exports the core logging primitives and exposes a simple
//! global facade for programs that prefer a process-wide logger instance.
//!
//! - `Logger`: trait defining the logging surface
//! - `LogLevel`: enum of levels
//! - `NoopLogger`: default no-op implementation
//! - `StdoutLogger`: simple stdout-backed logger used by the CLI
//! - `FileLogger`: versioned `build_N.log` file sink
//!
//! ```rust,no_run
//! use aps_graph::logger;
//! logger::init_logger(logger::StdoutLogger);
//! logger::info("build started");
//! ```

pub mod core;

pub use core::{FileLogger, LogLevel, Logger, NoopLogger, StdoutLogger};

use std::sync::RwLock;

/// Global logger facade.
///
/// A process-wide logger reference used by the convenience helpers below.
/// Initialization leaks the boxed logger so the facade can hand out a
/// reference with a 'static lifetime; the `RwLock` makes the facade
/// swappable, which test setup relies on (`set_logger_for_tests`).
/// Callers are expected to call `init_logger` once early in `main` and
/// then use the helpers like `info` and `error`.
static GLOBAL_LOGGER: RwLock<Option<&'static dyn Logger>> = RwLock::new(None);

/// Initialize the global logger for the lifetime of the program.
pub fn init_logger<L: Logger>(logger: L) {
    // Leak the logger so it can be referenced with a 'static lifetime.
    let boxed: Box<dyn Logger> = Box::new(logger);
    let leaked: &'static dyn Logger = Box::leak(boxed);
    if let Ok(mut global) = GLOBAL_LOGGER.write() {
        *global = Some(leaked);
    }
}

/// For tests: set a logger that will be used by the global facade.
pub fn set_logger_for_tests<L: Logger>(logger: L) {
    init_logger(logger);
}

/// Log using the global logger if set, otherwise no-op.
pub fn log(level: LogLevel, message: &str) {
    if let Ok(global) = GLOBAL_LOGGER.read() {
        if let Some(logger) = *global {
            logger.log(level, message);
        }
    }
}

/// Convenience functions
pub fn info(msg: &str) {
    log(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log(LogLevel::Debug, msg);
}

pub fn warn(msg: &str) {
    log(LogLevel::Warn, msg);
}

pub fn error(msg: &str) {
    log(LogLevel::Error, msg);
}
