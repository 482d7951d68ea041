//! Durations expressed in human units and resolved against a [`Context`].
//!
//! A [`TimeValue`] is resolved once to seconds before it is converted into an
//! engine-native quantity (a cutoff frequency, a delay in frames). Parsing of
//! textual literals such as `"8n"` or `"0.5s"` is left to the caller.

use crate::context::Context;

/// Musical note divisions for tempo-relative durations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum NoteDivision {
    /// Whole note (4 beats)
    Whole,
    /// Half note (2 beats)
    Half,
    /// Quarter note (1 beat)
    #[default]
    Quarter,
    /// Eighth note (1/2 beat)
    Eighth,
    /// Sixteenth note (1/4 beat)
    Sixteenth,
    /// Thirty-second note (1/8 beat)
    ThirtySecond,
    /// Dotted quarter note (1.5 beats)
    DottedQuarter,
    /// Dotted eighth note (3/4 beat)
    DottedEighth,
    /// Triplet quarter note (2/3 beat)
    TripletQuarter,
    /// Triplet eighth note (1/3 beat)
    TripletEighth,
    /// Triplet sixteenth note (1/6 beat)
    TripletSixteenth,
}

impl NoteDivision {
    /// Number of beats this division spans.
    pub fn beats(&self) -> f32 {
        match self {
            NoteDivision::Whole => 4.0,
            NoteDivision::Half => 2.0,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Eighth => 0.5,
            NoteDivision::Sixteenth => 0.25,
            NoteDivision::ThirtySecond => 0.125,
            NoteDivision::DottedQuarter => 1.5,
            NoteDivision::DottedEighth => 0.75,
            NoteDivision::TripletQuarter => 2.0 / 3.0,
            NoteDivision::TripletEighth => 1.0 / 3.0,
            NoteDivision::TripletSixteenth => 1.0 / 6.0,
        }
    }

    /// Duration in seconds at the given tempo.
    ///
    /// ```rust
    /// use patchwork_core::NoteDivision;
    ///
    /// // At 120 BPM a quarter note lasts half a second.
    /// assert!((NoteDivision::Quarter.to_seconds(120.0) - 0.5).abs() < 1e-6);
    /// ```
    pub fn to_seconds(&self, bpm: f32) -> f32 {
        self.beats() * 60.0 / bpm
    }
}

/// A duration in one of several units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TimeValue {
    /// Seconds.
    Seconds(f32),
    /// Milliseconds.
    Milliseconds(f32),
    /// Frames at the context sample rate.
    Samples(f32),
    /// Tempo-relative note length.
    Note(NoteDivision),
    /// One period of the given frequency.
    Hertz(f32),
}

impl TimeValue {
    /// Resolves to seconds. May be zero, negative, or non-finite; see
    /// [`clamp_time`] for the engine-safe form.
    pub fn resolve(&self, ctx: &Context) -> f32 {
        match *self {
            TimeValue::Seconds(s) => s,
            TimeValue::Milliseconds(ms) => ms / 1000.0,
            TimeValue::Samples(frames) => frames / ctx.sample_rate(),
            TimeValue::Note(division) => division.to_seconds(ctx.bpm()),
            TimeValue::Hertz(hz) => 1.0 / hz,
        }
    }

    /// Resolves to seconds, floored at the engine's minimum time.
    pub fn resolve_clamped(&self, ctx: &Context) -> f32 {
        clamp_time(self.resolve(ctx), ctx)
    }
}

impl Default for TimeValue {
    fn default() -> Self {
        TimeValue::Seconds(0.0)
    }
}

impl From<f32> for TimeValue {
    fn from(seconds: f32) -> Self {
        TimeValue::Seconds(seconds)
    }
}

impl From<NoteDivision> for TimeValue {
    fn from(division: NoteDivision) -> Self {
        TimeValue::Note(division)
    }
}

/// Floors a duration at one processing quantum.
///
/// Zero, negative, NaN, and sub-quantum durations all become
/// [`Context::min_time`]. Near-zero times are a degraded but valid mode, so
/// this never fails. Infinity also maps to the minimum since it has no
/// representable frequency.
pub fn clamp_time(seconds: f32, ctx: &Context) -> f32 {
    let min = ctx.min_time();
    if seconds.is_finite() { seconds.max(min) } else { min }
}
