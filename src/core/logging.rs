//! Structured logging for audioshelf runs
//!
//! Diagnostics go to stderr by default so that reports printed on stdout
//! (including `--json` output) stay machine-readable. A size-rotated log
//! file can be used instead for unattended runs.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logger instance that manages the logging system
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the logging system based on configuration
    ///
    /// This sets up the global tracing subscriber with the specified format,
    /// level, and output destination.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        // Parse log level
        let level = parse_log_level(&config.level)?;
        
        // RUST_LOG wins over the configured level
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = match config.output.as_str() {
            "stderr" => {
                let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
                (non_blocking, Some(guard))
            }
            "stdout" => {
                let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
                (non_blocking, Some(guard))
            }
            "file" => {
                let log_file = config.log_file.as_ref()
                    .context("log_file must be specified when output is 'file'")?;

                if let Some(parent) = log_file.parent() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create log directory")?;
                }

                let file_appender = create_rolling_appender(
                    log_file,
                    config.max_file_size,
                    config.max_backups,
                )?;
                
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                (non_blocking, Some(guard))
            }
            _ => {
                anyhow::bail!("Invalid output configuration: {}", config.output);
            }
        };
        
        // Create the formatting layer based on format configuration
        let fmt_layer = match config.format.as_str() {
            "json" => {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true)
                    .boxed()
            }
            "text" => {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    .boxed()
            }
            _ => {
                anyhow::bail!("Invalid format configuration: {}", config.format);
            }
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::debug!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}

/// Create a rolling file appender with size-based rotation
fn create_rolling_appender(
    log_file: &Path,
    max_file_size: usize,
    max_backups: usize,
) -> Result<RollingFileAppender> {
    let directory = log_file.parent()
        .context("Log file must have a parent directory")?;
    
    let filename = log_file.file_name()
        .context("Log file must have a filename")?
        .to_str()
        .context("Log filename must be valid UTF-8")?;
    
    Ok(RollingFileAppender::new(
        directory.to_path_buf(),
        filename.to_string(),
        max_file_size,
        max_backups,
    ))
}

/// Rolling file appender that rotates based on file size
pub struct RollingFileAppender {
    directory: std::path::PathBuf,
    filename: String,
    max_file_size: usize,
    max_backups: usize,
    current_file: std::sync::Mutex<Option<std::fs::File>>,
    current_size: std::sync::atomic::AtomicUsize,
}

impl RollingFileAppender {
    /// Create a new rolling file appender
    pub fn new(
        directory: std::path::PathBuf,
        filename: String,
        max_file_size: usize,
        max_backups: usize,
    ) -> Self {
        Self {
            directory,
            filename,
            max_file_size,
            max_backups,
            current_file: std::sync::Mutex::new(None),
            current_size: std::sync::atomic::AtomicUsize::new(0),
        }
    }
    
    /// Get the current log file path
    fn current_path(&self) -> std::path::PathBuf {
        self.directory.join(&self.filename)
    }
    
    /// Get the backup file path for a given index
    fn backup_path(&self, index: usize) -> std::path::PathBuf {
        self.directory.join(format!("{}.{}", self.filename, index))
    }
    
    /// Rotate log files
    fn rotate(&self) -> std::io::Result<()> {
        *self.lock_file() = None;

        // Shift backups up by one, dropping the oldest
        for i in (1..self.max_backups).rev() {
            let from = self.backup_path(i);
            let to = self.backup_path(i + 1);
            
            if from.exists() {
                if to.exists() {
                    std::fs::remove_file(&to)?;
                }
                std::fs::rename(&from, &to)?;
            }
        }
        
        // Move current file to backup.1
        let current = self.current_path();
        if current.exists() {
            let backup = self.backup_path(1);
            if backup.exists() {
                std::fs::remove_file(&backup)?;
            }
            std::fs::rename(&current, &backup)?;
        }

        self.current_size.store(0, std::sync::atomic::Ordering::SeqCst);
        
        Ok(())
    }
    
    /// A panic while logging must not disable logging for the rest of the run
    fn lock_file(&self) -> std::sync::MutexGuard<'_, Option<std::fs::File>> {
        self.current_file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write to the current log file, opening it first if needed
    fn write_current(&self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file_guard = self.lock_file();

        let file = match file_guard.take() {
            Some(file) => file,
            None => self.open_current()?,
        };
        std::io::Write::write(file_guard.insert(file), buf)
    }

    /// Open the current log file in append mode and pick up its size
    fn open_current(&self) -> std::io::Result<std::fs::File> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())?;

        let metadata = file.metadata()?;
        self.current_size.store(
            metadata.len() as usize,
            std::sync::atomic::Ordering::SeqCst
        );

        Ok(file)
    }
}

impl std::io::Write for RollingFileAppender {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let current_size = self.current_size.load(std::sync::atomic::Ordering::SeqCst);
        if current_size > 0 && current_size + buf.len() > self.max_file_size {
            self.rotate()?;
        }

        let written = self.write_current(buf)?;
        self.current_size.fetch_add(written, std::sync::atomic::Ordering::SeqCst);
        
        Ok(written)
    }
    
    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = self.lock_file().as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
