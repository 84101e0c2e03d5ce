//! Test helper modules for carlink-audio integration tests
//!
//! - `harness`: engine wired to in-memory sinks, microphone and uplink
//! - `frames`: command and PCM frame builders
//! - `transport`: scripted transport for session tests

#![allow(dead_code)]

pub mod frames;
pub mod harness;
pub mod transport;

pub use frames::*;
pub use harness::{RecordingUplink, TestEngine};
pub use transport::ScriptedTransport;
