//! Engine test harness
//!
//! Builds an `AudioEngine` over in-memory devices and keeps handles to
//! everything a test wants to inspect.

use super::frames::command;
use carlink_audio::audio::memory::{MemoryMicrophone, MemorySinkFactory, MicrophoneFeeder, SinkRecorder};
use carlink_audio::audio::AudioFrame;
use carlink_audio::config::EngineSettings;
use carlink_audio::error::{Error, Result};
use carlink_audio::transport::Uplink;
use carlink_audio::{AudioEngine, SharedState};
use carlink_common::events::AudioEvent;
use carlink_common::protocol::AudioCommand;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Uplink that records every sample sent, optionally failing
#[derive(Default)]
pub struct RecordingUplink {
    sent: Mutex<Vec<i16>>,
    fail: AtomicBool,
}

impl RecordingUplink {
    pub fn sent(&self) -> Vec<i16> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Uplink for RecordingUplink {
    fn send_microphone_audio(&self, samples: &[i16]) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Uplink("link down".to_string()));
        }
        self.sent.lock().unwrap().extend_from_slice(samples);
        Ok(())
    }
}

/// Engine plus handles to its in-memory collaborators
pub struct TestEngine {
    pub engine: AudioEngine,
    pub sinks: SinkRecorder,
    pub mic: MicrophoneFeeder,
    pub uplink: Arc<RecordingUplink>,
    pub state: Arc<SharedState>,
    pub events: broadcast::Receiver<AudioEvent>,
}

impl TestEngine {
    /// Unity volumes, no media delay, 1 ms fade-in
    pub fn new() -> Self {
        Self::with_settings(
            EngineSettings::default()
                .with_unity_volumes()
                .with_ramp_duration_ms(1),
        )
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        let factory = MemorySinkFactory::new();
        let sinks = factory.recorder();
        let (microphone, mic) = MemoryMicrophone::new();
        let uplink = Arc::new(RecordingUplink::default());
        let state = Arc::new(SharedState::new());
        let events = state.subscribe_events();

        let engine = AudioEngine::new(
            settings,
            Box::new(factory),
            Box::new(microphone),
            uplink.clone(),
            Arc::clone(&state),
        );

        Self {
            engine,
            sinks,
            mic,
            uplink,
            state,
            events,
        }
    }

    pub fn send(&mut self, frame: AudioFrame) {
        self.engine.handle_frame(&frame);
    }

    pub fn command(&mut self, cmd: AudioCommand) {
        self.send(command(cmd));
    }

    /// MediaStart and consume enough Music to finish the fade-in
    pub fn start_media_steady(&mut self) {
        self.command(AudioCommand::MediaStart);
        // 1 ms at 48 kHz stereo is 96 samples
        self.send(super::frames::music(&[0; 96]));
        assert_eq!(self.engine.fade_state().remaining_samples, 0);
        self.sinks.clear_samples();
    }

    /// Drain every event received so far
    pub fn drain_events(&mut self) -> Vec<AudioEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
