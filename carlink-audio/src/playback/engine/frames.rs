//! PCM frame handling
//!
//! Per data frame: apply any gain hint, look up the format, classify,
//! apply the drop policy, announce the format once per session, then route
//! to the Music mixer, the navigation queue or straight to a sink.

use super::core::AudioEngine;
use crate::audio::{AudioFrame, PcmFrame, PlayerKey};
use crate::playback::classifier::classify;
use crate::playback::mixer::{mix_music_frame, scale_frame, MixGains};
use carlink_common::events::AudioEvent;
use carlink_common::protocol::{decode_format, payload_class, AudioFormat, PayloadClass, PCM_CODEC};
use carlink_common::LogicalChannel;
use tokio::time::Instant;
use tracing::{info, trace, warn};

impl AudioEngine {
    /// Process one frame from the transport
    ///
    /// Never fails: anything that cannot be played is dropped and logged.
    pub fn handle_frame(&mut self, frame: &AudioFrame) {
        match frame {
            AudioFrame::Command {
                stream_type,
                command,
            } => self.handle_command(*stream_type, *command),
            AudioFrame::Data(pcm) => self.handle_pcm(pcm),
        }
    }

    fn handle_pcm(&mut self, frame: &PcmFrame) {
        self.stats.frames_received += 1;

        if let Some(hint) = frame.gain_hint {
            self.fader.schedule_duck(hint);
        }

        if frame.samples.is_empty() {
            return;
        }

        let Some(format) = decode_format(frame.decode_type) else {
            warn!(
                "Dropping frame with unknown decode type {} (stream type {})",
                frame.decode_type, frame.stream_type
            );
            self.stats.frames_dropped += 1;
            return;
        };

        let channel = classify(
            frame.stream_type,
            frame.decode_type,
            self.flags.voice_assistant_active,
            self.flags.phone_call_active,
        );

        if let Some(reason) = self.drop_reason(channel, frame.decode_type) {
            trace!("Dropping {} frame: {}", channel, reason);
            self.stats.frames_dropped += 1;
            return;
        }

        self.announce_format(format);

        let key = PlayerKey::from(format);
        match channel {
            LogicalChannel::Music => self.play_music(key, &frame.samples),
            LogicalChannel::Navigation => self.play_navigation(key, &frame.samples),
            LogicalChannel::VoiceAssistant | LogicalChannel::Call => {
                self.write_scaled(channel, key, &frame.samples)
            }
        }
    }

    /// Why a classified frame must not be played, if it must not
    fn drop_reason(&self, channel: LogicalChannel, decode_type: u32) -> Option<&'static str> {
        let voice_coded = payload_class(decode_type) == PayloadClass::Voice;

        if voice_coded && channel == LogicalChannel::Music && !self.flags.voice_session_active() {
            return Some("voice payload with no voice session");
        }

        if channel == LogicalChannel::Music && !self.flags.media_active {
            return Some("media not started");
        }

        if channel.is_voice() && voice_coded && !self.flags.voice_channel_active(channel) {
            return Some("voice session not open");
        }

        None
    }

    fn announce_format(&mut self, format: AudioFormat) {
        if self.format_announced {
            return;
        }
        self.format_announced = true;

        info!(
            "Audio format: {} {}Hz {}ch {}-bit ({})",
            PCM_CODEC, format.sample_rate, format.channels, format.bit_depth, format.format_name
        );
        self.state.broadcast_event(AudioEvent::AudioFormatKnown {
            codec: PCM_CODEC.to_string(),
            sample_rate: format.sample_rate,
            channels: format.channels,
            bit_depth: format.bit_depth,
            timestamp: chrono::Utc::now(),
        });
    }

    fn play_music(&mut self, key: PlayerKey, samples: &[i16]) {
        self.fader.begin_frame(Instant::now(), key);

        let gains = MixGains {
            music: self.volumes.gain(LogicalChannel::Music),
            navigation: self.volumes.gain(LogicalChannel::Navigation),
            held: self.flags.voice_session_active(),
        };

        let mut out = std::mem::take(&mut self.mix_buffer);
        mix_music_frame(samples, gains, &mut self.fader, &mut self.nav_queue, &mut out);
        self.write_out(LogicalChannel::Music, key, &out);
        self.mix_buffer = out;
    }

    fn play_navigation(&mut self, key: PlayerKey, samples: &[i16]) {
        if self.flags.navigation_active && self.flags.media_active {
            self.nav_queue.push(samples);
            trace!(
                "Queued {} navigation samples ({} pending)",
                samples.len(),
                self.nav_queue.len_samples()
            );
            return;
        }

        self.write_scaled(LogicalChannel::Navigation, key, samples);
    }

    fn write_scaled(&mut self, channel: LogicalChannel, key: PlayerKey, samples: &[i16]) {
        let scaled = scale_frame(samples, self.volumes.gain(channel));
        self.write_out(channel, key, &scaled);
    }

    fn write_out(&mut self, channel: LogicalChannel, key: PlayerKey, samples: &[i16]) {
        if self.pool.write(channel, key, samples) {
            self.stats.samples_written += samples.len() as u64;
        }
    }
}
