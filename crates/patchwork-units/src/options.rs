//! Construction options for each composite.
//!
//! Every field has a default, so a partial TOML table (or `..Default::default()`)
//! only has to name what it changes. Times are [`TimeValue`]s and serialize
//! as a one-key table, e.g. `attack = { milliseconds = 10.0 }` or
//! `delay_time = { note = "dotted_eighth" }`.

use patchwork_core::TimeValue;
use serde::{Deserialize, Serialize};

/// Options for [`Follower`](crate::Follower).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerOptions {
    /// Response time while the envelope rises.
    pub attack: TimeValue,
    /// Response time while the envelope falls.
    pub release: TimeValue,
}

impl Default for FollowerOptions {
    fn default() -> Self {
        Self {
            attack: TimeValue::Seconds(0.05),
            release: TimeValue::Seconds(0.5),
        }
    }
}

/// Options for [`GreaterThan`](crate::GreaterThan).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GreaterThanOptions {
    /// Static threshold, used until a signal is connected to input 1.
    pub value: f32,
}

/// Options for [`PingPongDelay`](crate::PingPongDelay).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingPongOptions {
    /// Time between echoes.
    pub delay_time: TimeValue,
    /// Longest delay the lines can hold, in seconds. Fixed at construction.
    pub max_delay_time: f32,
    /// Cross-feedback amount, 0 to 1.
    pub feedback: f32,
    /// Wet/dry balance, 0 (dry) to 1 (wet).
    pub wet: f32,
}

impl Default for PingPongOptions {
    fn default() -> Self {
        Self {
            delay_time: TimeValue::Seconds(0.25),
            max_delay_time: 1.0,
            feedback: 0.25,
            wet: 0.5,
        }
    }
}
