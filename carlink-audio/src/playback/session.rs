//! Session flags
//!
//! The five booleans describing which streams the phone has opened. Only the
//! command interpreter mutates them, and only through the methods here, so
//! the voice-session exclusion holds everywhere.

use carlink_common::LogicalChannel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    /// Music has been started and is audible (subject to fade and ducking)
    pub media_active: bool,

    pub voice_assistant_active: bool,

    pub phone_call_active: bool,

    /// Navigation prompts are being mixed into Music
    pub navigation_active: bool,

    /// MediaOpen received, waiting for MediaStart
    pub media_open_armed: bool,
}

impl SessionFlags {
    /// Either voice session (assistant or call) is open
    pub fn voice_session_active(&self) -> bool {
        self.voice_assistant_active || self.phone_call_active
    }

    /// Whether a channel's stream is currently open
    ///
    /// Music follows `media_active`, Navigation `navigation_active`, and the
    /// voice channels their own session flags.
    pub fn channel_active(&self, channel: LogicalChannel) -> bool {
        match channel {
            LogicalChannel::Music => self.media_active,
            LogicalChannel::Navigation => self.navigation_active,
            LogicalChannel::VoiceAssistant => self.voice_assistant_active,
            LogicalChannel::Call => self.phone_call_active,
        }
    }

    /// Whether the given voice channel's own session flag is set
    ///
    /// Always false for Music and Navigation.
    pub fn voice_channel_active(&self, channel: LogicalChannel) -> bool {
        match channel {
            LogicalChannel::VoiceAssistant => self.voice_assistant_active,
            LogicalChannel::Call => self.phone_call_active,
            LogicalChannel::Music | LogicalChannel::Navigation => false,
        }
    }

    /// Open a voice session, closing the other kind
    pub fn start_voice(&mut self, channel: LogicalChannel) {
        match channel {
            LogicalChannel::VoiceAssistant => {
                self.voice_assistant_active = true;
                self.phone_call_active = false;
            }
            LogicalChannel::Call => {
                self.phone_call_active = true;
                self.voice_assistant_active = false;
            }
            LogicalChannel::Music | LogicalChannel::Navigation => {}
        }
    }

    /// Close a voice session
    pub fn stop_voice(&mut self, channel: LogicalChannel) {
        match channel {
            LogicalChannel::VoiceAssistant => self.voice_assistant_active = false,
            LogicalChannel::Call => self.phone_call_active = false,
            LogicalChannel::Music | LogicalChannel::Navigation => {}
        }
    }
}
