//! Logger utility for application-wide logging
//!
//! This module provides a logger that works alongside the standard log
//! crate and appends to a file. The binary installs it as the global logger
//! when a log file is configured; commands also use it as an operation
//! journal. Both share one file handle.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use log::{Log, Record, Metadata, LevelFilter};

/// File-backed logger
pub struct Logger {
    /// File handle for log output; `None` discards messages
    file: Arc<Mutex<Option<File>>>,
    /// Most verbose level recorded through the `log` facade
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger appending to `log_file`
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be opened
    pub fn new(log_file: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Path::new(log_file))?;
        Ok(Logger {
            file: Arc::new(Mutex::new(Some(file))),
            level: LevelFilter::Info,
        })
    }

    /// Creates a logger that discards everything
    pub fn disabled() -> Self {
        Logger {
            file: Arc::new(Mutex::new(None)),
            level: LevelFilter::Off,
        }
    }

    /// Another logger writing through the same file handle
    pub fn share(&self) -> Self {
        Logger {
            file: Arc::clone(&self.file),
            level: self.level,
        }
    }

    /// Set the most verbose level accepted from the `log` facade
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Whether messages are written anywhere
    pub fn is_enabled(&self) -> bool {
        self.file.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Appends a line to the log file
    ///
    /// # Arguments
    ///
    /// * `message` - The message to log
    pub fn log(&self, message: &str) -> io::Result<()> {
        if let Some(file) = &mut *self.file.lock().unwrap_or_else(|e| e.into_inner()) {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Opens `log_file` once and installs it as the global logger
    ///
    /// Returns a logger sharing the same handle, for use as the command
    /// journal.
    pub fn init_global_logger(log_file: &str, level: LevelFilter) -> io::Result<Logger> {
        let journal = Logger::new(log_file)?;
        journal.install_global(level);
        Ok(journal)
    }

    /// Install a logger sharing this one's file as the global logger
    pub fn install_global(&self, level: LevelFilter) {
        if log::set_boxed_logger(Box::new(self.share().with_level(level))).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }
        log::set_max_level(level);
    }
}

// Implement the Log trait to make our Logger work with the log crate
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = Logger::log(self, &message);

            // Stdout carries command output, so echo to stderr
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}
