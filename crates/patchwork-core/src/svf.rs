//! Modulatable low-pass filter backing the `Lowpass` primitive.
//!
//! Implements the low-pass output of the Topology-Preserving Transform (TPT)
//! state-variable filter after Zavalishin, "The Art of VA Filter Design"
//! (2012). The trapezoidal integrators keep the filter stable while its cutoff
//! is swept every frame, which is exactly what happens when another part of
//! the graph drives the `frequency` parameter.
//!
//! Coefficients are recomputed from the cutoff and Q passed to each
//! [`LowpassState::process`] call, so the state holds no parameters of its own.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use core::f32::consts::PI;
use libm::tanf;

use crate::math::flush_denormal;

/// Lowest accepted Q. Q = 0.5 is critically damped (no overshoot).
pub const MIN_Q: f32 = 0.5;
/// Highest accepted Q.
pub const MAX_Q: f32 = 20.0;

/// Integrator state of a 2-pole (12 dB/oct) TPT low-pass.
///
/// ```rust
/// use patchwork_core::LowpassState;
///
/// let mut lp = LowpassState::default();
/// let mut y = 0.0;
/// for _ in 0..48000 {
///     y = lp.process(1.0, 100.0, 0.707, 48000.0);
/// }
/// assert!((y - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LowpassState {
    ic1eq: f32,
    ic2eq: f32,
}

impl LowpassState {
    /// Filters one sample at the given cutoff (Hz) and resonance (Q).
    ///
    /// The cutoff is clamped to `[0, 0.49 × sample_rate]`; a non-finite
    /// cutoff is read as 0 Hz, which holds the current output. Q is clamped
    /// to [`MIN_Q`]..=[`MAX_Q`].
    #[inline]
    pub fn process(&mut self, input: f32, cutoff: f32, q: f32, sample_rate: f32) -> f32 {
        let cutoff = if cutoff.is_finite() {
            cutoff.clamp(0.0, sample_rate * 0.49)
        } else {
            0.0
        };
        let q = if q.is_finite() { q.clamp(MIN_Q, MAX_Q) } else { MIN_Q };

        let g = tanf(PI * cutoff / sample_rate);
        let k = 1.0 / q;
        let h = 1.0 / (1.0 + g * (g + k));

        let v1 = h * (self.ic1eq + g * (input - self.ic2eq));
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        v2
    }

    /// Clears the integrators.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn passes_dc() {
        let mut lp = LowpassState::default();
        let mut y = 0.0;
        for _ in 0..48000 {
            y = lp.process(1.0, 1000.0, 0.707, SR);
        }
        assert!((y - 1.0).abs() < 1e-4, "DC should pass, got {y}");
    }

    #[test]
    fn attenuates_nyquist() {
        let mut lp = LowpassState::default();
        let mut sum = 0.0;
        for i in 0..4800 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += lp.process(x, 100.0, 0.707, SR).abs();
        }
        assert!(sum / 4800.0 < 0.01);
    }

    #[test]
    fn critically_damped_step_does_not_overshoot() {
        let mut lp = LowpassState::default();
        let mut peak = 0.0f32;
        for _ in 0..48000 {
            peak = peak.max(lp.process(1.0, 20.0, MIN_Q, SR));
        }
        assert!(peak <= 1.0 + 1e-4, "overshoot: {peak}");
    }

    #[test]
    fn zero_or_nan_cutoff_holds_output() {
        let mut lp = LowpassState::default();
        for _ in 0..100 {
            lp.process(1.0, 1000.0, 0.707, SR);
        }
        let held = lp.process(0.0, 0.0, 0.707, SR);
        let again = lp.process(0.0, f32::NAN, 0.707, SR);
        assert!(held.is_finite() && again.is_finite());
        assert!((held - again).abs() < 1e-6);
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = LowpassState::default();
        lp.process(1.0, 1000.0, 0.707, SR);
        lp.reset();
        assert_eq!(lp.process(0.0, 1000.0, 0.707, SR), 0.0);
    }
}
