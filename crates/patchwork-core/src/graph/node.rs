//! Graph node types: identifiers, primitive kinds, and per-node bookkeeping.
//!
//! Every node is one primitive processing unit. Its [`NodeKind`] fixes how many
//! audio inputs and outputs it has and carries whatever state it needs between
//! frames (filter integrators, delay history, a shaping table). Its control
//! parameters live beside the kind in [`NodeData`].

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::delay::InterpolatedDelay;
use crate::param::Param;
use crate::shaping::ShapingTable;
use crate::svf::LowpassState;

use super::edge::EdgeId;

/// Most audio inputs or parameters any primitive has.
pub(crate) const MAX_PORTS: usize = 2;

/// Unique identifier for a node in the processing graph.
///
/// Node IDs are assigned sequentially and never reused within a graph
/// instance, so they stay valid as stable indices even while other nodes are
/// added and removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The primitive a node runs.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Reads external input channel `n`.
    Input(usize),
    /// Sums its input into external output channel `n`.
    Output(usize),
    /// Emits its `value` parameter.
    Constant,
    /// Multiplies its input by the `gain` parameter.
    Gain,
    /// Absolute value of its input.
    Abs,
    /// `in0 - in1`.
    Subtract,
    /// Low-pass filter with `frequency` and `q` parameters.
    Lowpass(LowpassState),
    /// Delay line with a `delay_time` parameter in seconds.
    Delay(InterpolatedDelay),
    /// Table lookup.
    Shaper(ShapingTable),
}

impl NodeKind {
    /// Number of audio inputs.
    pub fn input_count(&self) -> usize {
        match self {
            NodeKind::Input(_) | NodeKind::Constant => 0,
            NodeKind::Subtract => 2,
            _ => 1,
        }
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        match self {
            NodeKind::Output(_) => 0,
            _ => 1,
        }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Input(_) => "input",
            NodeKind::Output(_) => "output",
            NodeKind::Constant => "constant",
            NodeKind::Gain => "gain",
            NodeKind::Abs => "abs",
            NodeKind::Subtract => "subtract",
            NodeKind::Lowpass(_) => "lowpass",
            NodeKind::Delay(_) => "delay",
            NodeKind::Shaper(_) => "shaper",
        }
    }

    /// Returns `true` if an edge into audio input `index` does not affect this
    /// frame's output. Only a delay line's audio input qualifies.
    #[inline]
    pub fn input_is_delayed(&self, index: usize) -> bool {
        matches!(self, NodeKind::Delay(_)) && index == 0
    }

    /// Clears any state carried between frames.
    pub(crate) fn reset(&mut self) {
        match self {
            NodeKind::Lowpass(state) => state.reset(),
            NodeKind::Delay(line) => line.clear(),
            _ => {}
        }
    }
}

/// Internal bookkeeping for a node in the graph.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub params: Vec<Param>,
    /// Edges arriving at this node (inputs and parameters).
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
}

impl NodeData {
    pub fn new(kind: NodeKind, params: Vec<Param>) -> Self {
        debug_assert!(params.len() <= MAX_PORTS);
        Self {
            kind,
            params,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }
}
