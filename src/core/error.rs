//! Error type system for audioshelf
//!
//! This module provides the error taxonomy shared by the reconciliation
//! pipeline:
//! - A fatal catalog error that aborts the run before any file is touched
//! - A small closed set of recoverable kinds (I/O, tag decode/encode) that
//!   the walker and prune engine downgrade to "skipped"
//! - Context chaining for I/O errors that keeps them recoverable

use std::fmt;
use std::path::Path;

/// Main error type for the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    // Catalog errors
    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    // Traversal errors
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // Per-item errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tag error: {0}")]
    Tag(#[from] id3::Error),
}

impl ReconcileError {
    /// Get the error type name for log fields and reports
    pub fn error_type(&self) -> &'static str {
        match self {
            ReconcileError::CatalogLoad(_) => "CatalogLoad",
            ReconcileError::InvalidPath(_) => "InvalidPath",
            ReconcileError::Io(_) => "Io",
            ReconcileError::Tag(_) => "Tag",
        }
    }

    /// Check if this error may be downgraded to a skipped item
    ///
    /// Only filesystem and tag failures are contained at the per-file and
    /// per-folder boundaries. Everything else propagates to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReconcileError::Io(_) | ReconcileError::Tag(_))
    }
}

/// Result type alias for operations that can fail with ReconcileError
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Context extension trait for adding context to I/O errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add the offending path to an error
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap_io(context.into(), e))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap_io(f(), e))
    }

    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| wrap_io(path.display().to_string(), e))
    }
}

fn wrap_io(context: String, e: std::io::Error) -> ReconcileError {
    ReconcileError::Io(std::io::Error::new(e.kind(), format!("{}: {}", context, e)))
}

/// Reason a file or folder ended up in the skipped list
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkipReason {
    pub kind: String,
    pub message: String,
}

impl SkipReason {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn from_error(error: &ReconcileError) -> Self {
        Self::new(error.error_type(), error.to_string())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
