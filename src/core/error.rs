//! Error types for the offload pipeline
//!
//! Setup errors abort the session before any copying starts; per-file
//! errors are caught at the task level and recorded in the session result.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the offload pipeline
#[derive(Error, Debug)]
pub enum OffloadError {
    /// No mounted volume with a DCIM directory was found
    #[error("No DCIM volume found. Make sure the card is inserted and mounted.")]
    NoVolumesFound,

    /// A destination path is missing or cannot be written to
    #[error("Destination '{0}' does not exist or is not writable")]
    DestinationUnwritable(PathBuf),

    /// The source contains two files that would collide at the destination
    #[error("Source contains more than one {0}")]
    SourceCollision(String),

    /// A volume's DCIM tree could not be read at all
    #[error("Failed to scan '{path}': {message}")]
    ScanError { path: PathBuf, message: String },

    /// Copying a single file failed
    #[error("Copy failed for '{filename}': {message}")]
    CopyError { filename: String, message: String },

    /// The session was interrupted by an external signal
    #[error("Interrupted")]
    Interrupted,

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, OffloadError>;
