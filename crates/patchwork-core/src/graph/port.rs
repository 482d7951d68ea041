//! Port addresses: where an edge starts and where it lands.
//!
//! An edge runs from an [`Outlet`] (a node's output) to an [`Inlet`], which is
//! either one of the node's audio inputs or one of its control parameters.
//! Both are plain index pairs, so composites can hand them out as aliases for
//! their internal ports without exposing the nodes themselves.

use super::node::NodeId;

/// A producing port: output `index` of `node`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Outlet {
    /// Node that produces the signal.
    pub node: NodeId,
    /// Output index on that node.
    pub index: usize,
}

impl Outlet {
    /// Output `index` of `node`.
    #[inline]
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }

    /// Output 0 of `node`.
    #[inline]
    pub fn of(node: NodeId) -> Self {
        Self::new(node, 0)
    }
}

impl From<NodeId> for Outlet {
    fn from(node: NodeId) -> Self {
        Outlet::of(node)
    }
}

/// Address of a control parameter: parameter `index` of `node`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamId {
    /// Node owning the parameter.
    pub node: NodeId,
    /// Parameter index on that node.
    pub index: usize,
}

impl ParamId {
    /// Parameter `index` of `node`.
    #[inline]
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }

    /// The `value` parameter of a `Constant` node.
    #[inline]
    pub fn value(node: NodeId) -> Self {
        Self::new(node, 0)
    }

    /// The `gain` parameter of a `Gain` node.
    #[inline]
    pub fn gain(node: NodeId) -> Self {
        Self::new(node, 0)
    }

    /// The `frequency` parameter of a `Lowpass` node.
    #[inline]
    pub fn frequency(node: NodeId) -> Self {
        Self::new(node, 0)
    }

    /// The `q` parameter of a `Lowpass` node.
    #[inline]
    pub fn q(node: NodeId) -> Self {
        Self::new(node, 1)
    }

    /// The `delay_time` parameter of a `Delay` node.
    #[inline]
    pub fn delay_time(node: NodeId) -> Self {
        Self::new(node, 0)
    }
}

/// An accepting port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Inlet {
    /// Audio input `index` of `node`. Inbound signals are summed.
    Input {
        /// Receiving node.
        node: NodeId,
        /// Input index on that node.
        index: usize,
    },
    /// A control parameter. Inbound signals are summed onto its intrinsic value.
    Param(ParamId),
}

impl Inlet {
    /// Audio input `index` of `node`.
    #[inline]
    pub fn input(node: NodeId, index: usize) -> Self {
        Inlet::Input { node, index }
    }

    /// The node this port belongs to.
    #[inline]
    pub fn node(&self) -> NodeId {
        match *self {
            Inlet::Input { node, .. } => node,
            Inlet::Param(id) => id.node,
        }
    }

    /// Returns `true` for parameter ports.
    #[inline]
    pub fn is_param(&self) -> bool {
        matches!(self, Inlet::Param(_))
    }
}

impl From<ParamId> for Inlet {
    fn from(id: ParamId) -> Self {
        Inlet::Param(id)
    }
}

impl core::fmt::Display for Outlet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:out{}", self.node, self.index)
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:param{}", self.node, self.index)
    }
}

impl core::fmt::Display for Inlet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Inlet::Input { node, index } => write!(f, "{node}:in{index}"),
            Inlet::Param(id) => write!(f, "{id}"),
        }
    }
}
