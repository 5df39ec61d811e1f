//! Error types for glyphterm.

use thiserror::Error;

use crate::Dimensions;

/// Main error type for glyphterm operations.
#[derive(Debug, Error)]
pub enum Error {
    /// PTY allocation or I/O setup errors
    #[error("PTY error: {0}")]
    PtyError(String),

    /// Child shell could not be started
    #[error("Failed to spawn shell '{shell}': {reason}")]
    Spawn {
        /// Shell that was being started
        shell: String,
        /// Underlying failure
        reason: String,
    },

    /// Event bridge receiver has gone away
    #[error("Event bridge closed")]
    BridgeClosed,

    /// Font atlas could not be loaded or is too small
    #[error("Font atlas error: {0}")]
    Atlas(String),

    /// Grid handed to the renderer does not match the configured size
    #[error("Grid is {actual} but renderer is configured for {expected}")]
    GridMismatch {
        /// Dimensions the renderer was built for
        expected: Dimensions,
        /// Dimensions of the grid it was given
        actual: Dimensions,
    },

    /// Invalid terminal dimensions
    #[error("Invalid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows
        rows: u16,
        /// Number of columns
        cols: u16,
    },

    /// Window or presentation surface failure
    #[error("Frontend error: {0}")]
    Frontend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
