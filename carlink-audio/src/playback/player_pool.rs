//! Player pool: one live sink per (sample rate, channel count)
//!
//! Sinks are created lazily on the first write for a key and shared by
//! every logical channel with that format. Each channel remembers the last
//! key it wrote to, which is what per-channel teardown releases.

use crate::audio::{AudioSink, PlayerKey, SinkFactory};
use carlink_common::LogicalChannel;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

pub struct PlayerPool {
    factory: Box<dyn SinkFactory>,
    sinks: HashMap<PlayerKey, Box<dyn AudioSink>>,
    last_used: HashMap<LogicalChannel, PlayerKey>,
}

impl PlayerPool {
    pub fn new(factory: Box<dyn SinkFactory>) -> Self {
        Self {
            factory,
            sinks: HashMap::new(),
            last_used: HashMap::new(),
        }
    }

    /// Look up the sink for `key`, creating and starting it if absent
    ///
    /// Returns None when the sink could not be created or started; the
    /// failure is logged here and nothing is stored.
    pub fn get_or_create(&mut self, key: PlayerKey) -> Option<&mut Box<dyn AudioSink>> {
        if !self.sinks.contains_key(&key) {
            let mut sink = match self.factory.create(key) {
                Ok(sink) => sink,
                Err(e) => {
                    error!("Failed to create sink for {}: {}", key, e);
                    return None;
                }
            };

            if let Err(e) = sink.start() {
                error!("Failed to start sink for {}: {}", key, e);
                return None;
            }

            info!("Sink created for {}", key);
            self.sinks.insert(key, sink);
        }

        self.sinks.get_mut(&key)
    }

    /// Write a frame for `channel` to the sink for `key`
    ///
    /// Returns true when the sink accepted the samples. Failures are logged
    /// and swallowed.
    pub fn write(&mut self, channel: LogicalChannel, key: PlayerKey, samples: &[i16]) -> bool {
        self.last_used.insert(channel, key);

        let Some(sink) = self.get_or_create(key) else {
            return false;
        };

        match sink.write(samples) {
            Ok(()) => true,
            Err(e) => {
                warn!("Write of {} samples to {} ({}) failed: {}", samples.len(), key, channel, e);
                false
            }
        }
    }

    /// Release the sink `channel` last wrote to
    ///
    /// The sink stays alive while another channel that `is_active` still
    /// reports as running last wrote to it. Bookkeeping left behind by
    /// inactive channels does not keep a sink alive.
    pub fn stop_channel(
        &mut self,
        channel: LogicalChannel,
        is_active: impl Fn(LogicalChannel) -> bool,
    ) {
        let Some(key) = self.last_used.remove(&channel) else {
            debug!("No sink to stop for {}", channel);
            return;
        };

        let shared = self
            .last_used
            .iter()
            .any(|(other, other_key)| *other_key == key && is_active(*other));
        if shared {
            debug!("Sink {} still in use, keeping it for other channels", key);
            return;
        }

        // Inactive channels pointing at this key lose their stale entry
        self.last_used.retain(|_, other_key| *other_key != key);

        if let Some(mut sink) = self.sinks.remove(&key) {
            if let Err(e) = sink.stop() {
                warn!("Failed to stop sink {}: {}", key, e);
            }
            info!("Sink {} stopped ({})", key, channel);
        }
    }

    /// Stop every sink and forget all bookkeeping
    pub fn stop_all(&mut self) {
        for (key, mut sink) in self.sinks.drain() {
            if let Err(e) = sink.stop() {
                warn!("Failed to stop sink {}: {}", key, e);
            }
        }
        self.last_used.clear();
    }

    pub fn has_sink(&self, key: PlayerKey) -> bool {
        self.sinks.contains_key(&key)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn last_used(&self, channel: LogicalChannel) -> Option<PlayerKey> {
        self.last_used.get(&channel).copied()
    }
}
