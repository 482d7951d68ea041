//! Circular-buffer delay line backing the `Delay` primitive.
//!
//! The buffer is allocated once from the node's maximum delay and never
//! reallocates while rendering.
//!
//! # Read convention
//!
//! [`InterpolatedDelay::read`] takes a delay in frames measured from the most
//! recent write: `read(1.0)` returns the last sample written, `read(2.0)` the
//! one before it. The graph engine reads every delay node before committing
//! the frame's input, so a delay of `d` frames yields `out[n] = in[n - d]`.
//! One frame is the shortest delay the line can produce, which is what lets
//! feedback loops close through it.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use libm::floorf;

/// Interpolation used for reads that fall between stored points.
///
/// Delay lines always interpolate linearly; shaping tables honour both modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Read the nearest stored point.
    None,
    /// Interpolate linearly between the two surrounding points.
    #[default]
    Linear,
}

/// Heap-allocated delay line with fractional reads.
///
/// ```rust
/// use patchwork_core::InterpolatedDelay;
///
/// let mut line = InterpolatedDelay::new(8);
/// line.write(1.0);
/// line.write(0.0);
/// assert_eq!(line.read(2.0), 1.0);
/// assert_eq!(line.read(1.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    /// Slot the next write lands in.
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a line able to delay by up to `max_delay_frames` frames.
    pub fn new(max_delay_frames: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_frames.max(1) + 1],
            write_pos: 0,
        }
    }

    /// Creates a line from a maximum delay in seconds.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let frames = libm::ceilf((sample_rate * max_seconds).max(1.0)) as usize;
        Self::new(frames)
    }

    /// Longest delay in frames this line can produce.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Reads the sample `delay_frames` writes ago, interpolating linearly.
    ///
    /// The delay is clamped to `[1, max_delay]`.
    #[inline]
    pub fn read(&self, delay_frames: f32) -> f32 {
        let len = self.buffer.len();
        let delay = if delay_frames.is_nan() {
            1.0
        } else {
            delay_frames.clamp(1.0, (len - 1) as f32)
        };
        let whole = floorf(delay) as usize;
        let frac = delay - whole as f32;

        let newer = self.buffer[(self.write_pos + len - whole) % len];
        if frac <= 0.0 || whole + 1 >= len {
            return newer;
        }
        let older = self.buffer[(self.write_pos + len - whole - 1) % len];
        newer + (older - newer) * frac
    }

    /// Appends one sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the stored history.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in frames.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_delay_is_exact() {
        let mut line = InterpolatedDelay::new(100);
        let mut out = Vec::new();
        for n in 0..60 {
            out.push(line.read(10.0));
            line.write(if n == 0 { 1.0 } else { 0.0 });
        }
        let first = out.iter().position(|&s| s != 0.0);
        assert_eq!(first, Some(10));
        assert_eq!(out[10], 1.0);
    }

    #[test]
    fn clamps_to_one_frame_minimum() {
        let mut line = InterpolatedDelay::new(4);
        line.write(0.75);
        assert_eq!(line.read(0.0), 0.75);
        assert_eq!(line.read(-5.0), 0.75);
        assert_eq!(line.read(f32::NAN), 0.75);
    }

    #[test]
    fn clamps_to_capacity() {
        let mut line = InterpolatedDelay::new(4);
        for s in [1.0, 2.0, 3.0, 4.0, 5.0] {
            line.write(s);
        }
        assert_eq!(line.read(4.0), 2.0);
        assert_eq!(line.read(40.0), 2.0);
    }

    #[test]
    fn from_time_covers_max_delay() {
        let line = InterpolatedDelay::from_time(48000.0, 1.0);
        assert!(line.max_delay() >= 48000);
    }

    #[test]
    fn clear_resets_history() {
        let mut line = InterpolatedDelay::new(4);
        line.write(1.0);
        line.clear();
        assert_eq!(line.read(1.0), 0.0);
    }
}
