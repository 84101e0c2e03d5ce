//! Event types for the carlink audio event system
//!
//! Events are broadcast to interested listeners (UI, telemetry) and never
//! consumed by the mixing core itself.

use crate::protocol::LogicalChannel;
use serde::{Deserialize, Serialize};

/// Carlink audio event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// Audio format of the incoming stream became known
    ///
    /// Emitted once per session, on the first decodable PCM frame.
    AudioFormatKnown {
        codec: String,
        sample_rate: u32,
        channels: u16,
        bit_depth: u16,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Channel volume changed through the volume setter
    VolumeChanged {
        channel: LogicalChannel,
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Audio session brought up
    SessionStarted {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Audio session torn down
    SessionStopped {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Microphone uplink capture started or stopped
    MicrophoneStateChanged {
        running: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl AudioEvent {
    /// Short event name, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            AudioEvent::AudioFormatKnown { .. } => "AudioFormatKnown",
            AudioEvent::VolumeChanged { .. } => "VolumeChanged",
            AudioEvent::SessionStarted { .. } => "SessionStarted",
            AudioEvent::SessionStopped { .. } => "SessionStopped",
            AudioEvent::MicrophoneStateChanged { .. } => "MicrophoneStateChanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_matches_event_type() {
        let event = AudioEvent::VolumeChanged {
            channel: LogicalChannel::Navigation,
            volume: 0.25,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["channel"], "navigation");
    }

    #[test]
    fn test_format_event_serializes_fields() {
        let event = AudioEvent::AudioFormatKnown {
            codec: "PCM".to_string(),
            sample_rate: 48_000,
            channels: 2,
            bit_depth: 16,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"sample_rate\":48000"));

        let parsed: AudioEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
