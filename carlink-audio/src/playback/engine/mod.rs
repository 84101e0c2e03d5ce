//! Audio engine module
//!
//! **Module Structure:**
//! - `core.rs`: Engine struct, construction, reset, volume control
//! - `commands.rs`: Control command interpretation (session state machine)
//! - `frames.rs`: PCM frame policy, routing and mixing
//! - `diagnostics.rs`: Status accessors and statistics

mod commands;
mod core;
mod diagnostics;
mod frames;

pub use self::core::AudioEngine;
pub use self::diagnostics::EngineStats;
