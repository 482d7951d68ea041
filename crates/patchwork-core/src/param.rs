//! Control parameters: settable scalars with an automation timeline.
//!
//! Every parameter-bearing primitive (a gain's `gain`, a filter's `frequency`,
//! a delay's `delay_time`) owns one [`Param`] per control. The value the node
//! sees on each frame is
//!
//! ```text
//! intrinsic(t) + Σ connected signals(t)
//! ```
//!
//! where `intrinsic(t)` is the held value overlaid by any scheduled automation.
//! Connected signals always add; replacing the intrinsic value is the job of
//! the connection discipline in [`ProcessingGraph::connect`](crate::graph::ProcessingGraph::connect).
//!
//! ## Usage
//!
//! ```rust
//! use patchwork_core::Param;
//!
//! let mut cutoff = Param::new("frequency", 1000.0, 0.0, 24000.0);
//! cutoff.set_value_at_time(500.0, 1.0).unwrap();
//! cutoff.linear_ramp_to_value_at_time(1500.0, 2.0).unwrap();
//!
//! assert_eq!(cutoff.value_at(0.5), 1000.0);
//! assert_eq!(cutoff.value_at(1.5), 1000.0);
//! assert_eq!(cutoff.value_at(3.0), 1500.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::graph::GraphError;

/// A scheduled change on a parameter's timeline. Times are engine seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue {
        /// Engine time in seconds.
        time: f64,
        /// Target value.
        value: f32,
    },
    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    LinearRamp {
        /// Engine time in seconds.
        time: f64,
        /// Target value.
        value: f32,
    },
}

impl AutomationEvent {
    #[inline]
    fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::LinearRamp { time, .. } => time,
        }
    }

    #[inline]
    fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. } | AutomationEvent::LinearRamp { value, .. } => {
                value
            }
        }
    }
}

/// A scalar control with a legal range, a held value, and automation.
#[derive(Debug, Clone)]
pub struct Param {
    name: &'static str,
    default: f32,
    min: f32,
    max: f32,
    value: f32,
    events: Vec<AutomationEvent>,
}

impl Param {
    /// Creates a parameter holding `default`, legal within `[min, max]`.
    pub fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            min,
            max,
            value: default,
            events: Vec::new(),
        }
    }

    /// Creates a parameter with no range restriction.
    pub fn unbounded(name: &'static str, default: f32) -> Self {
        Self::new(name, default, f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Parameter name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Value the parameter was created with.
    pub fn default_value(&self) -> f32 {
        self.default
    }

    /// Legal range as `(min, max)`.
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// The held value (the baseline beneath any automation).
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the held value.
    ///
    /// Returns [`GraphError::OutOfRange`] without changing anything if `value`
    /// falls outside the parameter's range.
    pub fn set_value(&mut self, value: f32) -> Result<(), GraphError> {
        self.check_range(value)?;
        self.value = value;
        Ok(())
    }

    /// Sets the value in effect from engine time `now` onward.
    ///
    /// Unlike [`set_value`](Self::set_value), this overrides automation that
    /// has already started: events at or before `now` are dropped along with
    /// the old held value. Later events still run, starting from `value` at
    /// `now`.
    pub fn set_value_from(&mut self, value: f32, now: f64) -> Result<(), GraphError> {
        self.check_range(value)?;
        self.value = value;
        self.events.retain(|e| e.time() > now);
        if !self.events.is_empty() {
            self.events
                .insert(0, AutomationEvent::SetValue { time: now, value });
        }
        Ok(())
    }

    /// Drops events that can no longer affect values at or after `now`.
    ///
    /// The latest event at or before `now` stays as the starting point for
    /// whatever follows it, so [`value_at`](Self::value_at) is unchanged for
    /// any time from `now` on.
    pub fn prune_before(&mut self, now: f64) {
        let past = self.events.partition_point(|e| e.time() <= now);
        if past > 1 {
            self.events.drain(..past - 1);
        }
    }

    /// Schedules a jump to `value` at engine time `time`.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<(), GraphError> {
        self.check_range(value)?;
        self.insert(AutomationEvent::SetValue { time, value });
        Ok(())
    }

    /// Schedules a linear ramp that arrives at `value` at engine time `time`.
    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> Result<(), GraphError> {
        self.check_range(value)?;
        self.insert(AutomationEvent::LinearRamp { time, value });
        Ok(())
    }

    /// Removes every scheduled event at or after `from_time`.
    pub fn cancel_scheduled_values(&mut self, from_time: f64) {
        self.events.retain(|e| e.time() < from_time);
    }

    /// Returns `true` if any automation is scheduled.
    pub fn has_automation(&self) -> bool {
        !self.events.is_empty()
    }

    /// Scheduled events in time order.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Intrinsic value at engine time `time`.
    ///
    /// Before the first event the held value applies. A ramp with no earlier
    /// event starts from the held value at time zero.
    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev_time = 0.0_f64;
        let mut prev_value = self.value;
        for event in &self.events {
            if event.time() <= time {
                prev_time = event.time();
                prev_value = event.value();
                continue;
            }
            return match *event {
                AutomationEvent::SetValue { .. } => prev_value,
                AutomationEvent::LinearRamp { time: end, value } => {
                    let span = end - prev_time;
                    if span <= 0.0 {
                        value
                    } else {
                        let frac = ((time - prev_time) / span) as f32;
                        prev_value + (value - prev_value) * frac
                    }
                }
            };
        }
        prev_value
    }

    /// Cancels all automation and zeroes the held value.
    ///
    /// This is the reset the connection discipline applies before a new
    /// source takes over the parameter. Zero is written even if it lies
    /// outside the range; the connected signal becomes the whole value.
    pub(crate) fn clear_for_source(&mut self) {
        self.cancel_scheduled_values(f64::NEG_INFINITY);
        self.value = 0.0;
    }

    fn check_range(&self, value: f32) -> Result<(), GraphError> {
        if value.is_nan() || value < self.min || value > self.max {
            return Err(GraphError::OutOfRange {
                param: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn insert(&mut self, event: AutomationEvent) {
        let at = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(at, event);
    }
}
