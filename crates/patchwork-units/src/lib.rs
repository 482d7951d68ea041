//! Patchwork Units - composite DSP built from graph topology
//!
//! Every unit here is a fixed wiring of `patchwork-core` primitives. None of
//! them runs per-sample code of its own; the engine pulls samples through the
//! topology they build.
//!
//! # Units
//!
//! - [`Signal`] - Settable scalar that drives one or more parameters
//! - [`GreaterThanZero`], [`GreaterThan`] - Strict comparators outputting 0 or 1
//! - [`Follower`] - Envelope follower whose low-pass retunes its own cutoff
//! - [`StereoFeedbackEffect`] - Wet/dry stereo base with cross-coupled feedback
//! - [`PingPongDelay`] - Echoes alternating left then right
//!
//! # Capabilities
//!
//! - [`Unit`] - Declared input and output ports, connect, dispose
//! - [`ParamSource`] - Output meant to drive a control parameter
//!
//! # Configuration
//!
//! Options structs ([`FollowerOptions`], [`GreaterThanOptions`],
//! [`PingPongOptions`]) default every field and deserialize from TOML through
//! [`UnitsConfig`].
//!
//! # Example
//!
//! ```rust
//! use patchwork_core::{Context, Graph, Inlet, Outlet};
//! use patchwork_units::{Follower, FollowerOptions, GreaterThan, GreaterThanOptions, Unit};
//!
//! // Gate that opens while the envelope is above 0.5.
//! let mut graph = Graph::new(Context::default());
//! let input = graph.add_input(0);
//! let output = graph.add_output(0);
//! let env = Follower::new(&mut graph, FollowerOptions::default()).unwrap();
//! let gate = GreaterThan::new(&mut graph, GreaterThanOptions { value: 0.5 }).unwrap();
//!
//! graph.connect(Outlet::of(input), env.input(0).unwrap()).unwrap();
//! env.connect(&mut graph, 0, gate.input(0).unwrap()).unwrap();
//! gate.connect(&mut graph, 0, Inlet::input(output, 0)).unwrap();
//!
//! let loud = vec![1.0f32; 9600];
//! let mut out = vec![0.0f32; 9600];
//! graph.process_block(&[&loud], &mut [&mut out]);
//! assert_eq!(out[0], 0.0);
//! assert_eq!(out[9599], 1.0);
//! ```
//!
//! # Features
//!
//! - `tracing` - `debug!` logs for unit construction, updates, and disposal

pub mod comparators;
pub mod config;
pub mod error;
pub mod follower;
pub mod options;
pub mod ping_pong;
pub mod stereo;
pub mod unit;

pub use comparators::{GreaterThan, GreaterThanZero, Step, THRESHOLD_GAIN, threshold_table};
pub use config::{EngineConfig, UnitsConfig};
pub use error::{ConfigError, UnitError};
pub use follower::{DirectionMap, Follower};
pub use options::{FollowerOptions, GreaterThanOptions, PingPongOptions};
pub use ping_pong::PingPongDelay;
pub use stereo::{Channel, StereoFeedbackEffect};
pub use unit::{ParamSource, Parts, Signal, Unit};
