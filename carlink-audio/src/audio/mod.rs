//! Audio device boundary
//!
//! The engine never talks to hardware directly. Physical sinks and the
//! microphone are reached through the traits below; `output` and `input`
//! implement them with cpal, `memory` implements them in-process for tests
//! and headless replay.

pub mod device;
pub mod input;
pub mod memory;
pub mod output;
pub mod ring_buffer;
pub mod types;

pub use types::{AudioFrame, GainHint, PcmFrame, PlayerKey};

use crate::Result;

/// One physical output for a single (sample rate, channel count) pair
pub trait AudioSink: Send {
    /// Begin playback
    ///
    /// May return before the device has finished opening; must not block
    /// the frame path.
    fn start(&mut self) -> Result<()>;

    /// Queue interleaved samples for playback
    ///
    /// Must not block the caller for longer than a buffer copy.
    fn write(&mut self, samples: &[i16]) -> Result<()>;

    /// Stop playback and release the device without waiting for it
    fn stop(&mut self) -> Result<()>;
}

/// Creates sinks on demand, one per PlayerKey
pub trait SinkFactory: Send {
    fn create(&mut self, key: PlayerKey) -> Result<Box<dyn AudioSink>>;
}

/// Receives raw little-endian 16-bit PCM captured by a microphone
pub type MicrophoneCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Capture device feeding the uplink during voice sessions
///
/// `start` and `stop` are idempotent.
pub trait Microphone: Send {
    fn start(&mut self, callback: MicrophoneCallback) -> Result<()>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
