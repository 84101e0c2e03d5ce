//! In-process audio devices
//!
//! `MemorySinkFactory` hands out sinks that record everything written to
//! them, and `MemoryMicrophone` delivers bytes injected through a
//! `MicrophoneFeeder`. Used by headless replay and by tests, which inspect
//! the shared `SinkRecorder`.

use crate::audio::{AudioSink, Microphone, MicrophoneCallback, PlayerKey, SinkFactory};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Per-key history of a recorded sink
#[derive(Debug, Clone, Default)]
pub struct SinkRecord {
    /// Times a sink was created for this key
    pub created: usize,

    /// Times a sink for this key was stopped
    pub stopped: usize,

    /// Whether a sink for this key is currently started
    pub active: bool,

    /// Every sample written, across all sink instances for this key
    pub samples: Vec<i16>,

    /// Number of write calls
    pub writes: usize,
}

#[derive(Default)]
struct RecorderInner {
    records: BTreeMap<PlayerKey, SinkRecord>,
    fail_create: HashSet<PlayerKey>,
    fail_start: HashSet<PlayerKey>,
}

/// Shared view over everything the memory sinks received
#[derive(Clone, Default)]
pub struct SinkRecorder {
    inner: Arc<Mutex<RecorderInner>>,
}

impl SinkRecorder {
    fn lock(&self) -> MutexGuard<'_, RecorderInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record for a key, if a sink was ever created for it
    pub fn record(&self, key: PlayerKey) -> Option<SinkRecord> {
        self.lock().records.get(&key).cloned()
    }

    /// All samples written for a key
    pub fn samples(&self, key: PlayerKey) -> Vec<i16> {
        self.record(key).map(|r| r.samples).unwrap_or_default()
    }

    /// Keys with a currently started sink
    pub fn active_keys(&self) -> Vec<PlayerKey> {
        self.lock()
            .records
            .iter()
            .filter(|(_, r)| r.active)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Keys that were ever created
    pub fn created_keys(&self) -> Vec<PlayerKey> {
        self.lock().records.keys().copied().collect()
    }

    /// Total samples written across every key
    pub fn total_samples(&self) -> usize {
        self.lock().records.values().map(|r| r.samples.len()).sum()
    }

    /// Forget recorded samples while keeping sink lifecycle state
    pub fn clear_samples(&self) {
        for record in self.lock().records.values_mut() {
            record.samples.clear();
            record.writes = 0;
        }
    }

    /// Make the next `create` for `key` fail
    pub fn fail_create(&self, key: PlayerKey) {
        self.lock().fail_create.insert(key);
    }

    /// Make `start` fail for sinks created for `key`
    pub fn fail_start(&self, key: PlayerKey) {
        self.lock().fail_start.insert(key);
    }
}

/// Sink that appends every write to the shared recorder
pub struct MemorySink {
    key: PlayerKey,
    recorder: SinkRecorder,
    started: bool,
}

impl AudioSink for MemorySink {
    fn start(&mut self) -> Result<()> {
        let mut inner = self.recorder.lock();
        if inner.fail_start.contains(&self.key) {
            return Err(Error::AudioOutput(format!("Injected start failure for {}", self.key)));
        }
        inner.records.entry(self.key).or_default().active = true;
        self.started = true;
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<()> {
        if !self.started {
            return Err(Error::InvalidState(format!("Sink {} not started", self.key)));
        }
        let mut inner = self.recorder.lock();
        let record = inner.records.entry(self.key).or_default();
        record.samples.extend_from_slice(samples);
        record.writes += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        let mut inner = self.recorder.lock();
        let record = inner.records.entry(self.key).or_default();
        record.active = false;
        record.stopped += 1;
        Ok(())
    }
}

/// Factory producing `MemorySink`s that share one recorder
#[derive(Clone, Default)]
pub struct MemorySinkFactory {
    recorder: SinkRecorder,
}

impl MemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> SinkRecorder {
        self.recorder.clone()
    }
}

impl SinkFactory for MemorySinkFactory {
    fn create(&mut self, key: PlayerKey) -> Result<Box<dyn AudioSink>> {
        let mut inner = self.recorder.lock();
        if inner.fail_create.remove(&key) {
            return Err(Error::AudioOutput(format!("Injected create failure for {}", key)));
        }
        inner.records.entry(key).or_default().created += 1;
        debug!("Created memory sink for {}", key);

        Ok(Box::new(MemorySink {
            key,
            recorder: self.recorder.clone(),
            started: false,
        }))
    }
}

#[derive(Default)]
struct MicrophoneInner {
    callback: Option<MicrophoneCallback>,
    starts: usize,
    stops: usize,
}

/// Microphone whose "captured" audio comes from a `MicrophoneFeeder`
pub struct MemoryMicrophone {
    inner: Arc<Mutex<MicrophoneInner>>,
}

/// Injects capture bytes into a `MemoryMicrophone`
#[derive(Clone)]
pub struct MicrophoneFeeder {
    inner: Arc<Mutex<MicrophoneInner>>,
}

impl MemoryMicrophone {
    pub fn new() -> (Self, MicrophoneFeeder) {
        let inner = Arc::new(Mutex::new(MicrophoneInner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MicrophoneFeeder { inner },
        )
    }

    fn lock(&self) -> MutexGuard<'_, MicrophoneInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Microphone for MemoryMicrophone {
    fn start(&mut self, callback: MicrophoneCallback) -> Result<()> {
        let mut inner = self.lock();
        if inner.callback.is_none() {
            inner.callback = Some(callback);
            inner.starts += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut inner = self.lock();
        if inner.callback.take().is_some() {
            inner.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.lock().callback.is_some()
    }
}

impl MicrophoneFeeder {
    fn lock(&self) -> MutexGuard<'_, MicrophoneInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver bytes as if captured; returns false when the microphone is stopped
    pub fn feed(&self, bytes: &[u8]) -> bool {
        let mut inner = self.lock();
        match inner.callback.as_mut() {
            Some(callback) => {
                callback(bytes);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Number of stopped-to-running transitions
    pub fn start_count(&self) -> usize {
        self.lock().starts
    }

    /// Number of running-to-stopped transitions
    pub fn stop_count(&self) -> usize {
        self.lock().stops
    }
}
