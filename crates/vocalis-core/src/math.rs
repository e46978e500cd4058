//! Level and time conversions used across the AGC signal path.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! Two dB scales are in use:
//!
//! | Function | Law | Used for |
//! |----------|-----|----------|
//! | [`db_to_linear`] | `10^(dB/20)` | compression ratio |
//! | [`db6_to_linear`] | `2^(dB/6)` | limit, gate and de-esser attenuation |
//!
//! [`attenuation_db`] converts a linear meter value into the positive
//! "dB of reduction" figure shown on meters.
//!
//! # Utilities
//!
//! - [`ms_to_samples`] - Time conversion
//! - [`flush_denormal`] - Subnormal protection for filter accumulators

use libm::{exp2f, expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use vocalis_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(3.0) - 1.4125).abs() < 0.001);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below zero are clamped to 1e-10 (-200 dB).
///
/// # Example
/// ```rust
/// use vocalis_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert decibels to linear gain on the 6 dB-per-doubling scale.
///
/// `2^(dB/6)`: -6 → 0.5 exactly, -3 → 0.7071.
///
/// # Example
/// ```rust
/// use vocalis_core::db6_to_linear;
///
/// assert!((db6_to_linear(-6.0) - 0.5).abs() < 1e-6);
/// assert!((db6_to_linear(-3.0) - 0.7071).abs() < 0.001);
/// ```
#[inline]
pub fn db6_to_linear(db: f32) -> f32 {
    exp2f(db / 6.0)
}

/// Meter reading in dB of attenuation: `-20·log10(level)`.
///
/// A unity meter reads 0 dB; a meter at 0.5 reads about 6 dB.
#[inline]
pub fn attenuation_db(level: f32) -> f32 {
    let db = -linear_to_db(level);
    // avoid reporting -0.0 for unity
    if db == 0.0 { 0.0 } else { db }
}

/// Convert milliseconds to samples.
///
/// # Arguments
/// * `ms` - Time in milliseconds
/// * `sample_rate` - Sample rate in Hz
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Replaces values below 1e-20 with zero, leaving margin before the IEEE 754
/// subnormal range. Applied to every filter accumulator, which otherwise
/// decays toward zero forever during silence.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!(
            (original - back).abs() < 1e-5,
            "Roundtrip failed: {} -> {} -> {}",
            original,
            db,
            back
        );
    }

    #[test]
    fn test_db6_known_values() {
        assert!((db6_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db6_to_linear(6.0) - 2.0).abs() < 1e-5);
        assert!((db6_to_linear(-3.0) - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_attenuation_db() {
        assert_eq!(attenuation_db(1.0), 0.0);
        assert!(attenuation_db(1.0).is_sign_positive());
        assert!((attenuation_db(0.5) - 6.0206).abs() < 0.001);
        // silence clamps instead of producing infinity
        assert!(attenuation_db(0.0).is_finite());
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
        assert_eq!(ms_to_samples(500.0, 44100.0), 22050.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
    }
}
