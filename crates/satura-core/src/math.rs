//! Level conversions, waveshaping transfer functions, denormal guard.
//!
//! Everything here is allocation-free and `no_std`-safe; transcendental
//! math goes through `libm` so the same code runs on targets without a
//! hardware libm.
//!
//! # Waveshaping
//!
//! | Function | Character | Cost |
//! |----------|-----------|------|
//! | [`saturate`] | exact tanh soft clip | one `tanhf` per sample |
//! | [`saturate_fast`] | rational tanh approximation | 7 multiplies, 1 divide |
//! | [`hard_clip`] | brick wall at ±threshold | one clamp |

use libm::{expf, logf, tanhf};

/// Convert decibels to linear gain.
///
/// 0 dB → 1.0 exactly, -6.02 dB → 0.5, +6.02 dB → 2.0.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Input is clamped to 1e-10 to keep the logarithm finite.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Exact tanh saturation.
///
/// Smooth odd-harmonic soft clipping; output approaches ±1 asymptotically
/// and never exceeds it.
#[inline]
pub fn saturate(x: f32) -> f32 {
    tanhf(x)
}

/// Rational tanh approximation (continued-fraction form).
///
/// `tanh(x) ≈ x(135135 + 17325x² + 378x⁴ + x⁶) /
///            (135135 + 62370x² + 3150x⁴ + 28x⁶)`
///
/// Matches tanh through the x⁷ Taylor term: absolute error < 1e-4 for
/// |x| ≤ 3. Unlike the exact curve it is not bounded — beyond |x| ≈ 4.97
/// the output exceeds ±1 and keeps growing, so drive the result through a
/// clip when the input can be hot.
#[inline]
pub fn saturate_fast(x: f32) -> f32 {
    let x2 = x * x;
    let num = x * (135135.0 + x2 * (17325.0 + x2 * (378.0 + x2)));
    let den = 135135.0 + x2 * (62370.0 + x2 * (3150.0 + 28.0 * x2));
    num / den
}

/// Hard clip to ±`threshold`.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Flush subnormal floats to zero.
///
/// Subnormals (below ~1e-38) trigger microcode slow paths on most CPUs, up
/// to two orders of magnitude per operation. Recursive filter state decays
/// toward zero indefinitely, so every state update routes through this.
/// The 1e-20 threshold leaves a wide margin above the subnormal range.
///
/// Reference: IEEE 754-2008, Section 3.4 (Subnormal numbers).
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_known_values() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 0.001);
        assert!((db_to_linear(6.0206) - 2.0).abs() < 0.001);
        assert!((db_to_linear(20.0) - 10.0).abs() < 0.001);
    }

    #[test]
    fn db_roundtrip() {
        for db in [-40.0_f32, -12.0, -3.0, 0.0, 3.0, 12.0, 40.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn saturate_bounds() {
        assert!(saturate(10.0) < 1.0 && saturate(10.0) > 0.99);
        assert!(saturate(-10.0) > -1.0 && saturate(-10.0) < -0.99);
        assert_eq!(saturate(0.0), 0.0);
    }

    #[test]
    fn saturate_fast_matches_exact_in_band() {
        let mut max_err: f32 = 0.0;
        for i in -300..=300 {
            let x = i as f32 * 0.01; // -3.0 ..= 3.0
            let err = (saturate_fast(x) - saturate(x)).abs();
            max_err = max_err.max(err);
        }
        assert!(max_err < 1e-4, "max error {max_err} exceeds 1e-4");
    }

    #[test]
    fn saturate_fast_diverges_outside_band() {
        // The approximation is documented to exceed ±1 for hot inputs;
        // callers must clip.
        assert!(saturate_fast(8.0) > 1.0);
    }

    #[test]
    fn hard_clip_limits() {
        assert_eq!(hard_clip(2.0, 1.0), 1.0);
        assert_eq!(hard_clip(-2.0, 1.0), -1.0);
        assert_eq!(hard_clip(0.3, 1.0), 0.3);
    }

    #[test]
    fn denormals_flushed() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-38), 0.0);
    }
}
