//! Status accessors and statistics
//!
//! Read-only views over engine state for the session layer, logging and
//! tests.

use super::core::AudioEngine;
use crate::audio::PlayerKey;
use crate::config::ChannelVolumes;
use crate::playback::fader::{FadeState, MediaState};
use crate::playback::session::SessionFlags;
use carlink_common::LogicalChannel;
use serde::Serialize;

/// Counters since construction or the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Data frames received (including dropped ones)
    pub frames_received: u64,

    /// Data frames discarded by policy or unknown format
    pub frames_dropped: u64,

    /// Known control commands applied
    pub commands_handled: u64,

    /// Samples accepted by sinks
    pub samples_written: u64,
}

impl AudioEngine {
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// Music fade ramp snapshot
    pub fn fade_state(&self) -> FadeState {
        self.fader.fade_state()
    }

    /// Music duck ramp snapshot
    pub fn duck_state(&self) -> FadeState {
        self.fader.duck_state()
    }

    /// Whether a fade-in is armed and waiting for its deadline
    pub fn has_pending_ramp(&self) -> bool {
        self.fader.pending_ramp().is_some()
    }

    pub fn pending_ramp_start(&self) -> Option<tokio::time::Instant> {
        self.fader.pending_ramp().map(|p| p.start_at)
    }

    /// Music lifecycle derived from the session flags and the fade ramp
    pub fn media_state(&self) -> MediaState {
        let flags = &self.flags;

        if !flags.media_active {
            if flags.media_open_armed {
                MediaState::Armed
            } else {
                MediaState::Idle
            }
        } else if flags.voice_session_active() {
            MediaState::Muted
        } else if self.fader.is_ramping() {
            MediaState::RampingIn
        } else {
            MediaState::SteadyActive
        }
    }

    pub fn volumes(&self) -> ChannelVolumes {
        self.volumes
    }

    pub fn volume(&self, channel: LogicalChannel) -> f32 {
        self.volumes.get(channel)
    }

    /// Navigation samples waiting to be mixed
    pub fn queued_navigation_samples(&self) -> usize {
        self.nav_queue.len_samples()
    }

    pub fn active_sink_count(&self) -> usize {
        self.pool.sink_count()
    }

    pub fn has_sink(&self, key: PlayerKey) -> bool {
        self.pool.has_sink(key)
    }

    pub fn last_sink(&self, channel: LogicalChannel) -> Option<PlayerKey> {
        self.pool.last_used(channel)
    }

    pub fn is_microphone_running(&self) -> bool {
        self.microphone.is_running()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
