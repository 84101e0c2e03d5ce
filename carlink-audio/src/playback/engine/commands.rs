//! Control command interpretation
//!
//! Every command is idempotent: redundant or out-of-order commands leave the
//! state unchanged instead of failing.

use super::core::AudioEngine;
use carlink_common::protocol::AudioCommand;
use carlink_common::LogicalChannel;
use tokio::time::Instant;
use tracing::{debug, info};

impl AudioEngine {
    /// Apply one control command
    ///
    /// Unknown codes are logged at debug level and ignored.
    pub fn handle_command(&mut self, stream_type: u32, code: u32) {
        let Some(command) = AudioCommand::from_code(code) else {
            debug!("Ignoring unknown audio command {} (stream type {})", code, stream_type);
            return;
        };

        self.stats.commands_handled += 1;
        debug!("Audio command {:?} (stream type {})", command, stream_type);

        match command {
            AudioCommand::MediaOpen => self.media_open(),
            AudioCommand::MediaStart => self.media_start(),
            AudioCommand::MediaStop => self.media_stop(),
            AudioCommand::NavigationStart | AudioCommand::TurnByTurnStart => {
                self.navigation_start()
            }
            AudioCommand::NavigationStop | AudioCommand::TurnByTurnStop => self.navigation_stop(),
            AudioCommand::VoiceAssistantStart => self.voice_start(LogicalChannel::VoiceAssistant),
            AudioCommand::VoiceAssistantStop => self.voice_stop(LogicalChannel::VoiceAssistant),
            AudioCommand::CallStart => self.voice_start(LogicalChannel::Call),
            AudioCommand::CallStop => self.voice_stop(LogicalChannel::Call),
            AudioCommand::MediaOpenStop
            | AudioCommand::InputConfig
            | AudioCommand::AttentionStart
            | AudioCommand::AttentionStop
            | AudioCommand::AttentionRinging => {
                debug!("Audio command {:?} has no effect on mixing", command);
            }
        }
    }

    fn media_open(&mut self) {
        if self.flags.media_active {
            debug!("MediaOpen while media active, ignoring");
            return;
        }

        self.flags.media_open_armed = true;
        self.fader.silence();
        debug!("Media armed");
    }

    fn media_start(&mut self) {
        if self.flags.media_active {
            debug!("MediaStart while media active, ignoring");
            return;
        }

        if self.flags.media_open_armed {
            self.flags.media_open_armed = false;
        } else {
            // Some phones start media without opening it first
            info!("MediaStart without MediaOpen, opening implicitly");
            self.fader.silence();
        }

        self.flags.media_active = true;
        self.fader.arm(Instant::now() + self.settings.media_delay);
        info!("Media started (fade-in after {:?})", self.settings.media_delay);
    }

    fn media_stop(&mut self) {
        self.flags.media_active = false;
        self.flags.media_open_armed = false;
        self.fader.silence();
        self.fader.clear_duck();

        // The sink a queued tail was draining into is going away
        if !self.nav_queue.is_empty() {
            debug!(
                "Discarding {} queued navigation samples",
                self.nav_queue.len_samples()
            );
            self.nav_queue.clear();
        }

        self.release_channel(LogicalChannel::Music);
        info!("Media stopped");
    }

    fn navigation_start(&mut self) {
        self.flags.navigation_active = true;
        self.nav_queue.clear();
        debug!("Navigation started");
    }

    fn navigation_stop(&mut self) {
        self.flags.navigation_active = false;

        // While Music plays, the queued tail keeps draining into it
        if !self.flags.media_active {
            self.release_channel(LogicalChannel::Navigation);
        }
        debug!("Navigation stopped");
    }

    fn voice_start(&mut self, channel: LogicalChannel) {
        self.flags.start_voice(channel);
        self.fader.silence();
        self.start_microphone();
        info!("{} session started, music muted", channel);
    }

    fn voice_stop(&mut self, channel: LogicalChannel) {
        self.flags.stop_voice(channel);
        self.release_channel(channel);

        if self.flags.media_active && !self.flags.voice_session_active() {
            self.fader.arm(Instant::now());
            info!("{} session ended, music fading back in", channel);
        } else {
            info!("{} session ended", channel);
        }

        self.stop_microphone();
    }

    /// Tear down `channel`'s sink unless a still-active channel shares it
    fn release_channel(&mut self, channel: LogicalChannel) {
        let flags = self.flags;
        self.pool.stop_channel(channel, move |other| flags.channel_active(other));
    }
}
