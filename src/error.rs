//! Error types for cardqr operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using cardqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cardqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    DirectoryCreation {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },

    /// The payload does not fit any symbol version at the configured level
    #[error("Failed to encode QR code for {identifier}: {reason}")]
    QrEncode {
        /// Card identifier being encoded
        identifier: String,
        /// Encoder message
        reason: String,
    },

    /// Writing a rendered image failed
    #[error("Failed to write {} for {identifier}: {reason}", path.display())]
    Write {
        /// Card identifier being written
        identifier: String,
        /// Target file
        path: PathBuf,
        /// Image/filesystem message
        reason: String,
    },

    /// The run was stopped before every card was written
    #[error("Generation stopped after {written} card(s); re-run to finish the batch")]
    Interrupted {
        /// Cards completed before the stop took effect
        written: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
