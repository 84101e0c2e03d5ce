//! Shared audio state
//!
//! Event fan-out between the engine and whoever is listening (UI, logs,
//! the replay binary). The engine only publishes; nothing here feeds back
//! into mixing decisions.

use carlink_common::events::AudioEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Events buffered per subscriber before old ones are dropped
const EVENT_CAPACITY: usize = 100;

/// Shared state accessible by all components
pub struct SharedState {
    /// Event broadcaster
    pub event_tx: broadcast::Sender<AudioEvent>,

    /// Session is up (transport open, engine accepting frames)
    session_running: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            event_tx,
            session_running: AtomicBool::new(false),
        }
    }

    /// Broadcast an event to all listeners
    pub fn broadcast_event(&self, event: AudioEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_session_running(&self) -> bool {
        self.session_running.load(Ordering::SeqCst)
    }

    pub fn set_session_running(&self, running: bool) {
        self.session_running.store(running, Ordering::SeqCst);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
