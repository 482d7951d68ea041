//! Patchwork Core - per-sample signal graph engine
//!
//! This crate provides the engine that patchwork's composite units are built
//! from: a graph of primitive nodes, evaluated one frame at a time, whose
//! control parameters can be driven by other signals in the graph.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`ProcessingGraph`] (alias [`Graph`]) - Node and edge storage, the
//!   connection discipline, cycle checks, and block processing
//! - [`Outlet`], [`Inlet`], [`ParamId`] - Port addresses
//! - [`GraphError`] - Every failure the engine reports
//!
//! ## Parameters and Time
//!
//! - [`Param`] - Range-checked control value with an automation timeline
//! - [`Context`] - Sample rate, block size, and tempo, passed explicitly
//! - [`TimeValue`] - Seconds, milliseconds, samples, Hz, or note divisions
//! - [`clamp_time`] - Floors time constants to one processing quantum
//!
//! ## Primitive State
//!
//! - [`ShapingTable`] - Tabulated [`ShapingFunction`] with nearest or linear lookup
//! - [`InterpolatedDelay`] - Fractional delay line
//! - [`LowpassState`] - TPT state-variable low-pass
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! patchwork-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Features
//!
//! - `std` (default) - `std::error::Error` for [`GraphError`]
//! - `tracing` - `debug!` logs for every topology change and compile
//! - `serde` - `Serialize`/`Deserialize` for [`TimeValue`] and [`NoteDivision`]

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod context;
pub mod delay;
pub mod graph;
pub mod math;
pub mod param;
pub mod shaping;
pub mod svf;
pub mod time;

pub use context::Context;
pub use delay::{InterpolatedDelay, Interpolation};
pub use graph::{
    CompiledSchedule, EdgeId, Graph, GraphError, Inlet, NodeId, NodeKind, Outlet, ParamId,
    ProcessingGraph,
};
pub use math::flush_denormal;
pub use param::{AutomationEvent, Param};
pub use shaping::{DEFAULT_TABLE_LEN, ShapingFunction, ShapingTable};
pub use svf::{LowpassState, MAX_Q, MIN_Q};
pub use time::{NoteDivision, TimeValue, clamp_time};
