//! Engine construction and lifecycle
//!
//! `AudioEngine` is a plain owned struct driven synchronously by the
//! transport's message loop. It holds every piece of mixing state; nothing
//! is shared with other threads except the event broadcaster and the
//! uplink handed to the microphone callback.

use super::diagnostics::EngineStats;
use crate::audio::types::bytes_to_samples;
use crate::audio::{Microphone, MicrophoneCallback, SinkFactory};
use crate::config::{ChannelVolumes, EngineSettings};
use crate::playback::fader::Fader;
use crate::playback::nav_queue::NavMixQueue;
use crate::playback::player_pool::PlayerPool;
use crate::playback::session::SessionFlags;
use crate::state::SharedState;
use crate::transport::Uplink;
use carlink_common::events::AudioEvent;
use carlink_common::LogicalChannel;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Volume changes smaller than this are ignored
const VOLUME_EPSILON: f32 = 0.001;

/// Multi-stream audio arbitration and mixing engine
pub struct AudioEngine {
    pub(super) settings: EngineSettings,

    /// Current per-channel volumes, written only by `set_volume`
    pub(super) volumes: ChannelVolumes,

    pub(super) flags: SessionFlags,

    /// Music fade-in and duck ramps
    pub(super) fader: Fader,

    /// Navigation samples waiting to be mixed into Music
    pub(super) nav_queue: NavMixQueue,

    pub(super) pool: PlayerPool,

    pub(super) microphone: Box<dyn Microphone>,

    pub(super) uplink: Arc<dyn Uplink>,

    pub(super) state: Arc<SharedState>,

    /// AudioFormatKnown already sent this session
    pub(super) format_announced: bool,

    pub(super) stats: EngineStats,

    /// Reused output buffer for Music mixing
    pub(super) mix_buffer: Vec<i16>,
}

impl AudioEngine {
    /// Create an engine in the power-on state
    ///
    /// # Arguments
    /// * `settings` - Volumes, media delay and ramp length
    /// * `sink_factory` - Creates physical sinks on demand
    /// * `microphone` - Capture device for voice sessions
    /// * `uplink` - Destination for captured microphone audio
    /// * `state` - Event broadcaster
    pub fn new(
        settings: EngineSettings,
        sink_factory: Box<dyn SinkFactory>,
        microphone: Box<dyn Microphone>,
        uplink: Arc<dyn Uplink>,
        state: Arc<SharedState>,
    ) -> Self {
        info!(
            "Audio engine created: media_delay={:?}, ramp={}ms",
            settings.media_delay, settings.ramp_duration_ms
        );

        Self {
            volumes: settings.volumes,
            fader: Fader::new(settings.ramp_duration_ms),
            settings,
            flags: SessionFlags::default(),
            nav_queue: NavMixQueue::new(),
            pool: PlayerPool::new(sink_factory),
            microphone,
            uplink,
            state,
            format_announced: false,
            stats: EngineStats::default(),
            mix_buffer: Vec::new(),
        }
    }

    /// Return to the power-on state
    ///
    /// Clears all session flags, the fade and duck ramps and the navigation
    /// queue, stops the microphone and every sink. Channel volumes survive.
    /// Safe to call any number of times.
    pub fn reset(&mut self) {
        self.flags = SessionFlags::default();
        self.fader.reset();
        self.nav_queue.clear();
        self.stop_microphone();
        self.pool.stop_all();
        self.format_announced = false;
        self.stats = EngineStats::default();
        debug!("Audio engine reset");
    }

    /// Set a channel's normalized volume
    ///
    /// The value is clamped to [0, 1]. Changes smaller than 0.001 are
    /// ignored; anything else is applied from the next frame and announced
    /// with `VolumeChanged`.
    pub fn set_volume(&mut self, channel: LogicalChannel, volume: f32) {
        if volume.is_nan() {
            warn!("Ignoring NaN volume for {}", channel);
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        let current = self.volumes.get(channel);
        if (volume - current).abs() < VOLUME_EPSILON {
            return;
        }

        self.volumes.set(channel, volume);
        info!("{} volume {:.3} -> {:.3}", channel, current, volume);

        self.state.broadcast_event(AudioEvent::VolumeChanged {
            channel,
            volume,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Start microphone capture into the uplink, if not already running
    pub(super) fn start_microphone(&mut self) {
        if self.microphone.is_running() {
            return;
        }

        let uplink = Arc::clone(&self.uplink);
        let callback: MicrophoneCallback = Box::new(move |bytes: &[u8]| {
            let samples = bytes_to_samples(bytes);
            if samples.is_empty() {
                return;
            }
            if let Err(e) = uplink.send_microphone_audio(&samples) {
                warn!("Microphone uplink send failed: {}", e);
            }
        });

        match self.microphone.start(callback) {
            Ok(()) => {
                info!("Microphone started");
                self.state.broadcast_event(AudioEvent::MicrophoneStateChanged {
                    running: true,
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(e) => warn!("Failed to start microphone: {}", e),
        }
    }

    pub(super) fn stop_microphone(&mut self) {
        if !self.microphone.is_running() {
            return;
        }

        self.microphone.stop();
        info!("Microphone stopped");
        self.state.broadcast_event(AudioEvent::MicrophoneStateChanged {
            running: false,
            timestamp: chrono::Utc::now(),
        });
    }
}
