//! Gain curve and 16-bit sample arithmetic
//!
//! Maps a normalized channel volume onto a linear sample multiplier through a
//! decibel curve, and provides the saturating helpers the mixer uses to scale
//! and sum PCM without overflow.
//!
//! The curve spans a 60 dB range:
//! - volume 0.0 → gain 0.0 (hard silence, not -60 dB)
//! - volume 0.5 → -30 dB (≈0.0316)
//! - volume 1.0 → 0 dB (unity)

/// Bottom of the volume curve in decibels
pub const MIN_DB: f32 = -60.0;

/// Top of the volume curve in decibels (unity gain)
pub const MAX_DB: f32 = 0.0;

/// Convert a normalized volume in [0, 1] into a linear gain multiplier.
///
/// Values at or below zero (and NaN) yield exactly 0.0; values above one are
/// clamped, so the result never exceeds 1.0.
///
/// # Examples
///
/// ```
/// use carlink_common::gain::volume_to_gain;
///
/// assert_eq!(volume_to_gain(0.0), 0.0);
/// assert_eq!(volume_to_gain(1.0), 1.0);
/// assert!(volume_to_gain(0.5) < volume_to_gain(0.75));
/// ```
pub fn volume_to_gain(volume: f32) -> f32 {
    if volume.is_nan() || volume <= 0.0 {
        return 0.0;
    }

    let v = volume.clamp(0.0, 1.0);
    let db = MIN_DB + (MAX_DB - MIN_DB) * v;
    10f32.powf(db / 20.0)
}

/// Round and clamp an f32 sample value into the i16 range
#[inline]
pub fn clamp_sample(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Multiply every sample by `gain` in place, saturating at the i16 bounds.
///
/// A gain of exactly 1.0 leaves the buffer untouched.
pub fn apply_gain(samples: &mut [i16], gain: f32) {
    if gain == 1.0 {
        return;
    }

    for sample in samples.iter_mut() {
        *sample = clamp_sample(*sample as f32 * gain);
    }
}

/// Sum two already-scaled sample values, saturating at the i16 bounds
#[inline]
pub fn mix_sample(a: f32, b: f32) -> i16 {
    clamp_sample(a + b)
}
