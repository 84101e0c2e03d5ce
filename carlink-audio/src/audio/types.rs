//! Core audio data types
//!
//! Defines the frames delivered by the transport and the key that identifies
//! a physical sink.

use carlink_common::protocol::AudioFormat;
use serde::{Deserialize, Serialize};

/// Identifies one physical sink instance: (sample rate, channel count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerKey {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: u16,
}

impl PlayerKey {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Interleaved samples per second of audio
    pub fn samples_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64
    }

    /// Number of interleaved samples covering `duration_ms`, at least 1
    ///
    /// Used for ramp lengths: `round(ms / 1000 × rate × channels)`.
    pub fn samples_for_ms(&self, duration_ms: f64) -> u64 {
        let samples = (duration_ms.max(0.0) / 1000.0) * self.samples_per_second() as f64;
        (samples.round() as u64).max(1)
    }
}

impl From<AudioFormat> for PlayerKey {
    fn from(format: AudioFormat) -> Self {
        PlayerKey::new(format.sample_rate, format.channels)
    }
}

impl std::fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}

/// Volume/duck hint attached to a data frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainHint {
    /// Target Music level (normalized 0.0-1.0)
    pub level: f32,

    /// Time to reach the target level
    #[serde(default)]
    pub duration_ms: f32,
}

/// PCM payload frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcmFrame {
    /// Stream type code claimed by the frame metadata
    pub stream_type: u32,

    /// Decode type code selecting the PCM format
    pub decode_type: u32,

    /// Optional Music duck hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_hint: Option<GainHint>,

    /// Interleaved signed 16-bit samples
    #[serde(default)]
    pub samples: Vec<i16>,
}

/// One frame delivered by the transport: a control command or a PCM payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioFrame {
    /// Control command frame
    Command {
        stream_type: u32,
        command: u32,
    },

    /// PCM data frame
    Data(PcmFrame),
}

impl AudioFrame {
    /// Build a command frame
    pub fn command(stream_type: u32, command: u32) -> Self {
        AudioFrame::Command {
            stream_type,
            command,
        }
    }

    /// Build a PCM frame without a gain hint
    pub fn pcm(stream_type: u32, decode_type: u32, samples: Vec<i16>) -> Self {
        AudioFrame::Data(PcmFrame {
            stream_type,
            decode_type,
            gain_hint: None,
            samples,
        })
    }
}

/// Reinterpret little-endian bytes as signed 16-bit PCM
///
/// A trailing odd byte is discarded.
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Serialize signed 16-bit PCM as little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
