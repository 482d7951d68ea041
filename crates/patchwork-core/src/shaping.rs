//! Shaping functions and the lookup tables the engine consults per frame.
//!
//! A [`ShapingFunction`] is a pure mapping from an input sample to an output
//! sample. It is materialized once into a [`ShapingTable`] and the engine
//! only ever reads the table, so a per-sample decision ("is this positive?")
//! becomes a table read instead of a branch at every call site.
//!
//! # Domain
//!
//! Tables cover the input range `[-1, 1]` with `len` evenly spaced points:
//!
//! ```text
//! x_k = 2k / (len - 1) - 1        k = 0 .. len-1
//! ```
//!
//! With an odd `len` the middle point sits exactly at `x = 0`, which is what
//! threshold tables rely on. Inputs outside the domain read the end points.
//!
//! # Example
//!
//! ```rust
//! use patchwork_core::{Interpolation, ShapingTable};
//!
//! fn square(x: f32) -> f32 {
//!     x * x
//! }
//!
//! let table = ShapingTable::sample(&(square as fn(f32) -> f32), 257, Interpolation::Linear);
//! assert!((table.lookup(0.5) - 0.25).abs() < 1e-3);
//! assert_eq!(table.lookup(4.0), 1.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{floorf, roundf};

use crate::delay::Interpolation;

/// Default table length: odd, so that `x = 0` is a sample point.
pub const DEFAULT_TABLE_LEN: usize = 1025;

/// A pure sample-to-sample mapping.
///
/// Implementors hold only the explicit settings the mapping depends on and
/// must return the same output for the same input every time.
pub trait ShapingFunction {
    /// Maps one input value to one output value.
    fn shape(&self, x: f32) -> f32;
}

impl ShapingFunction for fn(f32) -> f32 {
    fn shape(&self, x: f32) -> f32 {
        self(x)
    }
}

/// An immutable, precomputed shaping curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapingTable {
    values: Vec<f32>,
    interpolation: Interpolation,
}

impl ShapingTable {
    /// Tabulates `function` at `len` points across `[-1, 1]`.
    ///
    /// `len` is raised to 2 if smaller.
    pub fn sample<F: ShapingFunction + ?Sized>(
        function: &F,
        len: usize,
        interpolation: Interpolation,
    ) -> Self {
        let len = len.max(2);
        let last = (len - 1) as f32;
        let values = (0..len)
            .map(|k| function.shape(2.0 * k as f32 / last - 1.0))
            .collect();
        Self {
            values,
            interpolation,
        }
    }

    /// Wraps raw curve values. Returns `None` for fewer than two points.
    pub fn from_values(values: Vec<f32>, interpolation: Interpolation) -> Option<Self> {
        (values.len() >= 2).then_some(Self {
            values,
            interpolation,
        })
    }

    /// Number of points in the table.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; tables hold at least two points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The tabulated values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// How reads between points are resolved.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Reads the curve at `x`.
    #[inline]
    pub fn lookup(&self, x: f32) -> f32 {
        let last = self.values.len() - 1;
        if x.is_nan() {
            return self.values[0];
        }
        let pos = ((x + 1.0) * 0.5 * last as f32).clamp(0.0, last as f32);
        match self.interpolation {
            Interpolation::None => self.values[(roundf(pos) as usize).min(last)],
            Interpolation::Linear => {
                let i = (floorf(pos) as usize).min(last);
                if i == last {
                    return self.values[last];
                }
                let frac = pos - i as f32;
                let a = self.values[i];
                let b = self.values[i + 1];
                a + (b - a) * frac
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(x: f32) -> f32 {
        if x > 0.0 { 1.0 } else { 0.0 }
    }

    fn identity(x: f32) -> f32 {
        x
    }

    #[test]
    fn odd_table_has_exact_zero_point() {
        let table = ShapingTable::sample(&(identity as fn(f32) -> f32), 1025, Interpolation::None);
        assert_eq!(table.values()[512], 0.0);
        assert_eq!(table.values()[0], -1.0);
        assert_eq!(table.values()[1024], 1.0);
    }

    #[test]
    fn nearest_lookup_is_binary_for_step() {
        let table = ShapingTable::sample(&(step as fn(f32) -> f32), DEFAULT_TABLE_LEN, Interpolation::None);
        assert_eq!(table.lookup(0.0), 0.0);
        assert_eq!(table.lookup(-0.3), 0.0);
        assert_eq!(table.lookup(0.3), 1.0);
        assert_eq!(table.lookup(1e9), 1.0);
        assert_eq!(table.lookup(f32::INFINITY), 1.0);
        assert_eq!(table.lookup(f32::NEG_INFINITY), 0.0);
        assert_eq!(table.lookup(f32::NAN), 0.0);
    }

    #[test]
    fn linear_lookup_interpolates() {
        let table = ShapingTable::from_values(vec![0.0, 10.0], Interpolation::Linear).unwrap();
        assert!((table.lookup(0.0) - 5.0).abs() < 1e-5);
        assert_eq!(table.lookup(1.0), 10.0);
        assert_eq!(table.lookup(-2.0), 0.0);
    }

    #[test]
    fn rejects_degenerate_values() {
        assert!(ShapingTable::from_values(vec![1.0], Interpolation::None).is_none());
        let table = ShapingTable::sample(&(identity as fn(f32) -> f32), 0, Interpolation::Linear);
        assert_eq!(table.len(), 2);
    }
}
