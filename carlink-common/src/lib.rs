//! # Carlink Common Library
//!
//! Shared code for the carlink audio workspace including:
//! - Protocol tables (command codes, decode types, logical channels)
//! - Gain curve and sample arithmetic
//! - Event types (AudioEvent enum)
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod events;
pub mod gain;
pub mod protocol;

pub use error::{Error, Result};
pub use protocol::LogicalChannel;
