//! Engine runtime configuration
//!
//! `EngineSettings` is the engine's view of the persisted `AudioSettings`:
//! durations as `Duration`, volumes grouped per channel.

use carlink_common::config::AudioSettings;
use carlink_common::gain::volume_to_gain;
use carlink_common::LogicalChannel;
use serde::Serialize;
use std::time::Duration;

/// Normalized volume per logical channel, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelVolumes {
    pub music: f32,
    pub navigation: f32,
    pub voice_assistant: f32,
    pub call: f32,
}

impl ChannelVolumes {
    pub fn get(&self, channel: LogicalChannel) -> f32 {
        match channel {
            LogicalChannel::Music => self.music,
            LogicalChannel::Navigation => self.navigation,
            LogicalChannel::VoiceAssistant => self.voice_assistant,
            LogicalChannel::Call => self.call,
        }
    }

    pub fn set(&mut self, channel: LogicalChannel, volume: f32) {
        let slot = match channel {
            LogicalChannel::Music => &mut self.music,
            LogicalChannel::Navigation => &mut self.navigation,
            LogicalChannel::VoiceAssistant => &mut self.voice_assistant,
            LogicalChannel::Call => &mut self.call,
        };
        *slot = volume;
    }

    /// Linear gain for a channel's current volume
    pub fn gain(&self, channel: LogicalChannel) -> f32 {
        volume_to_gain(self.get(channel))
    }
}

impl Default for ChannelVolumes {
    fn default() -> Self {
        Self::from(&AudioSettings::default())
    }
}

impl From<&AudioSettings> for ChannelVolumes {
    fn from(settings: &AudioSettings) -> Self {
        Self {
            music: settings.volume_for(LogicalChannel::Music),
            navigation: settings.volume_for(LogicalChannel::Navigation),
            voice_assistant: settings.volume_for(LogicalChannel::VoiceAssistant),
            call: settings.volume_for(LogicalChannel::Call),
        }
    }
}

/// Settings the engine reads at construction
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Initial channel volumes
    pub volumes: ChannelVolumes,

    /// Delay between MediaStart and its fade-in
    pub media_delay: Duration,

    /// Fade-in length
    pub ramp_duration_ms: u64,

    /// Ring buffer length for hardware sinks
    pub sink_buffer_ms: u64,

    /// Microphone capture rate
    pub microphone_sample_rate: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AudioSettings::default())
    }
}

impl From<&AudioSettings> for EngineSettings {
    fn from(settings: &AudioSettings) -> Self {
        Self {
            volumes: ChannelVolumes::from(settings),
            media_delay: Duration::from_millis(settings.media_delay_ms),
            ramp_duration_ms: settings.ramp_duration_ms,
            sink_buffer_ms: settings.sink_buffer_ms,
            microphone_sample_rate: settings.microphone_sample_rate,
        }
    }
}

impl EngineSettings {
    /// Same settings with every channel at full volume
    pub fn with_unity_volumes(mut self) -> Self {
        for channel in LogicalChannel::all() {
            self.volumes.set(*channel, 1.0);
        }
        self
    }

    pub fn with_media_delay(mut self, delay: Duration) -> Self {
        self.media_delay = delay;
        self
    }

    pub fn with_ramp_duration_ms(mut self, ramp_duration_ms: u64) -> Self {
        self.ramp_duration_ms = ramp_duration_ms.max(1);
        self
    }
}
