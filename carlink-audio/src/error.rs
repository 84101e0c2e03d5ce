//! Error types for carlink-audio
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Variants carry owned strings so the error is `Clone`: a shared in-flight
//! session start hands the same outcome to every waiter.

use thiserror::Error;

/// Main error type for carlink-audio
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Microphone capture errors
    #[error("Audio input error: {0}")]
    AudioInput(String),

    /// Transport open/close errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Microphone uplink send errors
    #[error("Uplink error: {0}")]
    Uplink(String),

    /// Replay capture parsing errors
    #[error("Replay error: {0}")]
    Replay(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<carlink_common::Error> for Error {
    fn from(err: carlink_common::Error) -> Self {
        match err {
            carlink_common::Error::Config(msg) => Error::Config(msg),
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Convenience Result type using carlink-audio Error
pub type Result<T> = std::result::Result<T, Error>;
