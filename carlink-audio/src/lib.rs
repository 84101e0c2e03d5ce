//! # Carlink Audio Library (carlink-audio)
//!
//! Real-time arbitration and mixing of the audio streams carried by a
//! phone-mirroring head-unit link.
//!
//! **Purpose:** Classify every incoming PCM block into a logical channel
//! (music, navigation, voice assistant, call), apply the channel's gain and
//! the music ducking/fade-in ramp, sum navigation prompts into music, and
//! route the result to a physical sink per (sample rate, channel count).
//!
//! **Architecture:** Single-threaded `AudioEngine` driven synchronously by
//! the transport's message loop; cpal sinks fed through lock-free ring
//! buffers; `AudioSession` wraps the engine for async session bring-up.

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod replay;
pub mod session;
pub mod state;
pub mod transport;

pub use error::{Error, Result};
pub use playback::AudioEngine;
pub use session::AudioSession;
pub use state::SharedState;
