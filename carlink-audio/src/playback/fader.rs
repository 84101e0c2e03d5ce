//! Music fade-in and ducking ramps
//!
//! Music level is the product of two linear ramps advanced once per
//! interleaved sample:
//! - **fade**: the fade-in after MediaStart or after a voice session ends
//! - **duck**: the attenuation requested by a frame's gain hint
//!
//! A fade-in is never started by a timer. MediaStart only records a
//! deadline (`PendingRamp`); the first Music frame processed at or after the
//! deadline converts it into a sample count from that frame's own format.
//! Until then Music is held silent.

use crate::audio::{GainHint, PlayerKey};
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

/// Snapshot of a ramp's progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeState {
    pub current_level: f32,
    pub target_level: f32,
    pub remaining_samples: u64,
}

/// Linear ramp toward a target, one step per sample
///
/// When `remaining` reaches zero the level equals the target exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    current: f64,
    target: f64,
    remaining: u64,
}

impl Ramp {
    /// Ramp resting at `level`
    pub fn settled(level: f32) -> Self {
        Self {
            current: level as f64,
            target: level as f64,
            remaining: 0,
        }
    }

    /// Ramp from `from` to `to` over `samples` steps
    pub fn new(from: f32, to: f32, samples: u64) -> Self {
        Self {
            current: from as f64,
            target: to as f64,
            remaining: samples,
        }
    }

    /// Advance one sample and return the level for that sample
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 0 && self.current != self.target {
            let step = (self.target - self.current) / self.remaining as f64;
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else if step > 0.0 {
                (self.current + step).min(self.target)
            } else {
                (self.current + step).max(self.target)
            };
        } else {
            self.current = self.target;
            self.remaining = 0;
        }
        self.current as f32
    }

    pub fn level(&self) -> f32 {
        self.current as f32
    }

    pub fn is_settled(&self) -> bool {
        self.remaining == 0 && self.current == self.target
    }

    pub fn state(&self) -> FadeState {
        FadeState {
            current_level: self.current as f32,
            target_level: self.target as f32,
            remaining_samples: self.remaining,
        }
    }
}

/// Fade-in waiting for its start deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRamp {
    pub start_at: Instant,
}

/// Music lifecycle as seen from outside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaState {
    /// Not opened, not started
    Idle,
    /// MediaOpen received, waiting for MediaStart
    Armed,
    /// Started, fade-in pending or in progress
    RampingIn,
    /// Started, at full level
    SteadyActive,
    /// Started, silenced by a voice session
    Muted,
}

/// Fade and duck state for the Music channel
#[derive(Debug, Clone)]
pub struct Fader {
    fade: Ramp,
    duck: Ramp,
    pending_ramp: Option<PendingRamp>,
    pending_duck: Option<GainHint>,
    ramp_duration_ms: u64,
}

impl Fader {
    pub fn new(ramp_duration_ms: u64) -> Self {
        Self {
            fade: Ramp::settled(1.0),
            duck: Ramp::settled(1.0),
            pending_ramp: None,
            pending_duck: None,
            ramp_duration_ms,
        }
    }

    /// Back to the power-on state: full level, nothing pending
    pub fn reset(&mut self) {
        self.fade = Ramp::settled(1.0);
        self.duck = Ramp::settled(1.0);
        self.pending_ramp = None;
        self.pending_duck = None;
    }

    /// Drop to silence with no ramp pending: `{0, 1, 0}`
    pub fn silence(&mut self) {
        self.fade = Ramp::new(0.0, 1.0, 0);
        self.pending_ramp = None;
    }

    /// Clear any requested duck and return to full level
    pub fn clear_duck(&mut self) {
        self.duck = Ramp::settled(1.0);
        self.pending_duck = None;
    }

    /// Schedule a fade-in to begin at `start_at`
    pub fn arm(&mut self, start_at: Instant) {
        debug!("Music fade-in armed");
        self.pending_ramp = Some(PendingRamp { start_at });
    }

    pub fn cancel_pending(&mut self) {
        self.pending_ramp = None;
    }

    pub fn pending_ramp(&self) -> Option<PendingRamp> {
        self.pending_ramp
    }

    /// Queue a duck toward `hint.level`, applied on the next Music frame
    pub fn schedule_duck(&mut self, hint: GainHint) {
        self.pending_duck = Some(hint);
    }

    /// Fade ramp snapshot
    pub fn fade_state(&self) -> FadeState {
        self.fade.state()
    }

    /// Duck ramp snapshot
    pub fn duck_state(&self) -> FadeState {
        self.duck.state()
    }

    pub fn is_ramping(&self) -> bool {
        self.pending_ramp.is_some() || !self.fade.is_settled()
    }

    /// Prepare for a Music frame of format `key` processed at `now`
    ///
    /// Starts a due fade-in and applies a pending duck, both sized from
    /// the frame's own sample rate and channel count.
    pub fn begin_frame(&mut self, now: Instant, key: PlayerKey) {
        if let Some(pending) = self.pending_ramp {
            if now >= pending.start_at {
                let samples = key.samples_for_ms(self.ramp_duration_ms as f64);
                debug!("Music fade-in starting: {} samples at {}", samples, key);
                self.fade = Ramp::new(0.0, 1.0, samples);
                self.pending_ramp = None;
            }
        }

        if let Some(hint) = self.pending_duck.take() {
            let level = if hint.level.is_nan() {
                1.0
            } else {
                hint.level.clamp(0.0, 1.0)
            };
            let samples = key.samples_for_ms(hint.duration_ms.max(0.0) as f64);
            debug!(
                "Music duck {:.3} -> {:.3} over {} samples",
                self.duck.level(),
                level,
                samples
            );
            self.duck = Ramp::new(self.duck.level(), level, samples);
        }
    }

    /// Level for the next Music sample
    ///
    /// While `held` (a voice session is open) or a fade-in is still waiting
    /// for its deadline, Music is silent and neither ramp advances.
    pub fn next_level(&mut self, held: bool) -> f32 {
        if held || self.pending_ramp.is_some() {
            return 0.0;
        }
        self.fade.advance() * self.duck.advance()
    }
}
