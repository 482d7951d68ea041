//! Engine context shared by every node and composite built on a graph.
//!
//! There is no process-wide default engine. A [`Context`] is created by the
//! caller, handed to [`ProcessingGraph::new`](crate::graph::ProcessingGraph::new),
//! and read back by composites through
//! [`ProcessingGraph::context`](crate::graph::ProcessingGraph::context).
//!
//! # Processing quantum
//!
//! The engine evaluates the graph one frame at a time, so the smallest delay it
//! can place between two connected stages is one frame. That frame is the
//! *processing quantum*: feedback loops close over at least one quantum, and
//! time constants shorter than one quantum cannot be represented.
//!
//! ```rust
//! use patchwork_core::Context;
//!
//! let ctx = Context::new(48000.0, 128);
//! assert!((ctx.quantum() - 1.0 / 48000.0).abs() < 1e-9);
//! assert!((ctx.seconds_to_frequency(0.05) - 20.0).abs() < 1e-3);
//! ```

/// Sample rate, block size, and tempo of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Context {
    sample_rate: f32,
    block_size: usize,
    bpm: f32,
}

impl Context {
    /// Creates a context at the given sample rate and render block size.
    ///
    /// Tempo defaults to 120 BPM. A non-positive sample rate falls back to
    /// 48 kHz and a zero block size to one frame.
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            48000.0
        };
        Self {
            sample_rate,
            block_size: block_size.max(1),
            bpm: 120.0,
        }
    }

    /// Returns a copy with the given tempo, used to resolve note-relative times.
    pub fn with_bpm(mut self, bpm: f32) -> Self {
        if bpm.is_finite() && bpm > 0.0 {
            self.bpm = bpm;
        }
        self
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames per render block.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Tempo in beats per minute.
    #[inline]
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// The processing quantum in seconds (one frame).
    #[inline]
    pub fn quantum(&self) -> f32 {
        1.0 / self.sample_rate
    }

    /// Smallest time constant the engine can honour, in seconds.
    #[inline]
    pub fn min_time(&self) -> f32 {
        self.quantum()
    }

    /// Converts a period in seconds to a frequency in Hz (`1 / seconds`).
    #[inline]
    pub fn seconds_to_frequency(&self, seconds: f32) -> f32 {
        1.0 / seconds
    }

    /// Converts seconds to a (fractional) frame count.
    #[inline]
    pub fn seconds_to_samples(&self, seconds: f32) -> f32 {
        seconds * self.sample_rate
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(48000.0, 128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_rates() {
        let ctx = Context::new(0.0, 0);
        assert_eq!(ctx.sample_rate(), 48000.0);
        assert_eq!(ctx.block_size(), 1);

        let ctx = Context::new(f32::NAN, 64).with_bpm(-3.0);
        assert_eq!(ctx.sample_rate(), 48000.0);
        assert_eq!(ctx.bpm(), 120.0);
    }

    #[test]
    fn quantum_is_one_frame() {
        let ctx = Context::new(44100.0, 256);
        assert!((ctx.seconds_to_samples(ctx.quantum()) - 1.0).abs() < 1e-4);
        assert_eq!(ctx.min_time(), ctx.quantum());
    }
}
