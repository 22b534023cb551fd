//! # Error Types
//!
//! This module defines error types used throughout the boleta library.
//!
//! ## Taxonomy
//!
//! | Variant | Scope | Effect on a print call |
//! |---------|-------|------------------------|
//! | `Encoding` | Logo decode/resize | Logo is dropped, text still prints |
//! | `Channel` | One delivery channel | Recorded in that channel's result |
//! | `Orchestration` | The dispatcher itself | Print call reports `false` |
//!
//! The remaining variants are raised by collaborators (device I/O, spooler,
//! configuration) and are wrapped into `Channel` by the dispatcher.

use thiserror::Error;

/// Main error type for boleta operations
#[derive(Debug, Error)]
pub enum BoletaError {
    /// Bitmap could not be decoded or resized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A single delivery channel failed
    #[error("Channel '{channel}' failed: {message}")]
    Channel {
        channel: &'static str,
        message: String,
    },

    /// Failure outside every per-channel boundary
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    /// Transport-level errors (device open, write, flush)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Print spooler unavailable or rejected the job
    #[error("Spooler error: {0}")]
    Spooler(String),

    /// Caller supplied an unusable request (e.g. no receipt content)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoletaError {
    /// Wrap any error as a failure of the named channel.
    ///
    /// Errors that already belong to a channel keep their original message.
    pub fn into_channel(self, channel: &'static str) -> Self {
        match self {
            Self::Channel { message, .. } => Self::Channel { channel, message },
            other => Self::Channel {
                channel,
                message: other.to_string(),
            },
        }
    }
}
