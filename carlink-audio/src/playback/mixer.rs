//! Per-frame gain and navigation summation
//!
//! Music samples are scaled by the channel gain and the fader level, then
//! summed with the next queued navigation sample scaled by the navigation
//! gain. Arithmetic runs in f32 and saturates once, on the final sum.

use crate::playback::fader::Fader;
use crate::playback::nav_queue::NavMixQueue;
use carlink_common::gain::{apply_gain, mix_sample};

/// Gains used to mix one Music frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGains {
    /// Linear Music channel gain
    pub music: f32,

    /// Linear Navigation channel gain
    pub navigation: f32,

    /// A voice session is open: Music is silent and the fader is frozen
    pub held: bool,
}

/// Mix one Music frame into `out`
///
/// `out` is cleared and filled with exactly `music.len()` samples. Queued
/// navigation is consumed one sample per output sample until the queue is
/// empty.
pub fn mix_music_frame(
    music: &[i16],
    gains: MixGains,
    fader: &mut Fader,
    nav: &mut NavMixQueue,
    out: &mut Vec<i16>,
) {
    out.clear();
    out.reserve(music.len());

    for &sample in music {
        let level = fader.next_level(gains.held);
        let scaled_music = sample as f32 * gains.music * level;

        let scaled_nav = if nav.is_empty() {
            0.0
        } else {
            nav.next_sample() as f32 * gains.navigation
        };

        out.push(mix_sample(scaled_music, scaled_nav));
    }
}

/// Copy a non-Music frame with its channel gain applied
pub fn scale_frame(samples: &[i16], gain: f32) -> Vec<i16> {
    let mut out = samples.to_vec();
    apply_gain(&mut out, gain);
    out
}
