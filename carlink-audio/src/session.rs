//! Audio session controller
//!
//! Couples the transport lifecycle to the engine. `start` and `stop` are
//! single-flight: concurrent callers share one in-flight operation and all
//! observe its outcome. The engine lives behind a `std::sync::Mutex` that is
//! never held across an await.

use crate::audio::AudioFrame;
use crate::error::Result;
use crate::playback::AudioEngine;
use crate::state::SharedState;
use crate::transport::Transport;
use carlink_common::events::AudioEvent;
use carlink_common::LogicalChannel;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, trace, warn};

type SharedOp = Shared<BoxFuture<'static, Result<()>>>;

#[derive(Default)]
struct InFlight {
    start: Option<SharedOp>,
    stop: Option<SharedOp>,
}

struct SessionInner {
    transport: Arc<dyn Transport>,
    engine: Mutex<AudioEngine>,
    state: Arc<SharedState>,
    in_flight: Mutex<InFlight>,
}

/// Owns the transport and the engine for one phone connection
#[derive(Clone)]
pub struct AudioSession {
    inner: Arc<SessionInner>,
}

impl AudioSession {
    pub fn new(transport: Arc<dyn Transport>, engine: AudioEngine, state: Arc<SharedState>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                engine: Mutex::new(engine),
                state,
                in_flight: Mutex::new(InFlight::default()),
            }),
        }
    }

    /// Open the transport and start accepting frames
    ///
    /// Concurrent calls share one attempt. Starting a running session is a
    /// no-op.
    pub async fn start(&self) -> Result<()> {
        let op = {
            let mut in_flight = self.inner.lock_in_flight();
            match &in_flight.start {
                Some(op) => op.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let op = async move {
                        let result = inner.run_start().await;
                        inner.lock_in_flight().start = None;
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.start = Some(op.clone());
                    op
                }
            }
        };

        op.await
    }

    /// Close the transport and return the engine to its power-on state
    ///
    /// The engine is reset even when closing the transport fails; the
    /// transport error is reported afterwards. Concurrent calls share one
    /// attempt, and stopping a stopped session only resets the engine.
    pub async fn stop(&self) -> Result<()> {
        let op = {
            let mut in_flight = self.inner.lock_in_flight();
            match &in_flight.stop {
                Some(op) => op.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let op = async move {
                        let result = inner.run_stop().await;
                        inner.lock_in_flight().stop = None;
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.stop = Some(op.clone());
                    op
                }
            }
        };

        op.await
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.is_session_running()
    }

    /// Feed one transport frame to the engine
    ///
    /// Frames arriving while the session is down are dropped.
    pub fn handle_frame(&self, frame: &AudioFrame) {
        if !self.is_running() {
            trace!("Session not running, dropping frame");
            return;
        }
        self.inner.lock_engine().handle_frame(frame);
    }

    pub fn set_volume(&self, channel: LogicalChannel, volume: f32) {
        self.inner.lock_engine().set_volume(channel, volume);
    }

    /// Run `f` with exclusive access to the engine
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut AudioEngine) -> R) -> R {
        f(&mut self.inner.lock_engine())
    }

    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.inner.state)
    }
}

impl SessionInner {
    fn lock_engine(&self) -> MutexGuard<'_, AudioEngine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run_start(&self) -> Result<()> {
        if self.state.is_session_running() {
            return Ok(());
        }

        info!("Starting audio session");
        self.transport.open().await?;

        self.lock_engine().reset();
        self.state.set_session_running(true);
        self.state.broadcast_event(AudioEvent::SessionStarted {
            timestamp: chrono::Utc::now(),
        });
        info!("Audio session started");
        Ok(())
    }

    async fn run_stop(&self) -> Result<()> {
        let was_running = self.state.is_session_running();
        self.state.set_session_running(false);

        let close_result = if was_running {
            info!("Stopping audio session");
            self.transport.close().await
        } else {
            Ok(())
        };

        self.lock_engine().reset();

        if was_running {
            self.state.broadcast_event(AudioEvent::SessionStopped {
                timestamp: chrono::Utc::now(),
            });
        }

        match close_result {
            Ok(()) => {
                if was_running {
                    info!("Audio session stopped");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Transport close failed: {}", e);
                Err(e)
            }
        }
    }
}
