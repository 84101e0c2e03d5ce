//! Stream arbitration, ducking and mixing

pub mod classifier;
pub mod engine;
pub mod fader;
pub mod mixer;
pub mod nav_queue;
pub mod player_pool;
pub mod session;

pub use classifier::classify;
pub use engine::{AudioEngine, EngineStats};
pub use fader::{FadeState, MediaState};
pub use nav_queue::NavMixQueue;
pub use player_pool::PlayerPool;
pub use session::SessionFlags;
