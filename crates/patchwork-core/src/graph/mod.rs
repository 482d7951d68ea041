//! Per-sample signal graph.
//!
//! Nodes are primitive processors ([`NodeKind`]); edges carry one node's
//! output into another node's audio input or control parameter. The graph is
//! edited through [`ProcessingGraph`], compiled into a [`CompiledSchedule`],
//! and executed one frame at a time.
//!
//! # Feedback
//!
//! An edge into a `Delay` node's audio input does not feed that node's output
//! on the same frame: the delay reads its history during the frame and the new
//! sample is committed after every node has run. Such edges are the only way
//! to close a loop. Any other edge that would complete a cycle is refused with
//! [`GraphError::CycleWithoutDelay`].
//!
//! # Parameters
//!
//! Each frame a parameter's value is its intrinsic value (held value plus
//! automation) plus the sum of every signal connected to it.
//! [`ProcessingGraph::connect`] applies the connection discipline: driving a
//! parameter from a signal first cancels its automation and zeroes its held
//! value. [`ProcessingGraph::connect_summing`] layers a signal on top instead.
//!
//! # Example
//!
//! ```rust
//! use patchwork_core::graph::{Inlet, Outlet, ParamId, ProcessingGraph};
//! use patchwork_core::Context;
//!
//! let mut graph = ProcessingGraph::new(Context::new(48000.0, 128));
//! let input = graph.add_input(0);
//! let delay = graph.add_delay(0.25, 1.0);
//! let feedback = graph.add_gain(0.5);
//! let output = graph.add_output(0);
//!
//! graph.connect(Outlet::of(input), Inlet::input(delay, 0)).unwrap();
//! graph.connect(Outlet::of(delay), Inlet::input(feedback, 0)).unwrap();
//! graph.connect(Outlet::of(feedback), Inlet::input(delay, 0)).unwrap();
//! graph.connect(Outlet::of(delay), Inlet::input(output, 0)).unwrap();
//!
//! // Closing a loop with no delay in it is refused.
//! assert!(graph.connect(Outlet::of(feedback), ParamId::gain(feedback).into()).is_err());
//! ```

pub mod edge;
pub mod node;
pub mod port;
mod processing;
pub mod schedule;

pub use edge::EdgeId;
pub use node::{NodeId, NodeKind};
pub use port::{Inlet, Outlet, ParamId};
pub use processing::{Graph, GraphError, ProcessingGraph};
pub use schedule::{CompiledSchedule, SourceSpan};
