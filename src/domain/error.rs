//! Error types for the launcher core.
//!
//! This module defines the centralized error type [`LauncherError`] and a type alias
//! [`Result`] used across the crate. Only the outer layers (persistence, the worker
//! thread and configuration) produce errors; the gesture and reflow state machines
//! treat unknown keys and stale geometry as silent no-ops instead.

use thiserror::Error;

/// The main error type for launcher operations.
///
/// # Examples
///
/// ```
/// use arc_launcher::domain::LauncherError;
///
/// fn validate_density(density: f64) -> Result<(), LauncherError> {
///     if density <= 0.0 {
///         return Err(LauncherError::Config("density must be positive".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_density(0.0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Reading or writing persisted launcher state failed.
    ///
    /// Covers malformed JSON as well as serialization failures. Callers loading
    /// the item list fall back to a synthesized default when they see this.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Communication with the persistence worker failed.
    ///
    /// Occurs when the worker thread has exited or its channel is closed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;
