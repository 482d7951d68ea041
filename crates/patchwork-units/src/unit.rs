//! Composite capabilities and the bookkeeping shared by every composite.
//!
//! A composite owns a fixed topology of primitive nodes and exposes only a
//! few declared ports. [`Unit`] is that surface. [`ParamSource`] marks
//! composites whose output is meant to drive a control parameter, which they
//! do under the graph's connection discipline. [`Parts`] records the nodes and
//! edges a composite creates so that disposal can release them exactly once.

use patchwork_core::{EdgeId, Graph, GraphError, Inlet, NodeId, Outlet, Param, ParamId};

use crate::error::UnitError;

/// A composite processing unit with declared input and output ports.
///
/// Ports alias internal primitive ports; nothing else inside the composite is
/// reachable through this trait.
pub trait Unit {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Number of declared inputs.
    fn inputs(&self) -> usize;

    /// Number of declared outputs.
    fn outputs(&self) -> usize;

    /// The graph port behind input `index`.
    fn input(&self, index: usize) -> Result<Inlet, UnitError>;

    /// The graph port behind output `index`.
    fn output(&self, index: usize) -> Result<Outlet, UnitError>;

    /// Connects output `output` to `to` under the connection discipline.
    fn connect(&self, graph: &mut Graph, output: usize, to: Inlet) -> Result<EdgeId, UnitError> {
        let from = self.output(output)?;
        Ok(graph.connect(from, to)?)
    }

    /// Releases every node and edge the composite created.
    ///
    /// Calling it again is a no-op that returns `Ok`.
    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError>;

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    fn is_disposed(&self) -> bool;
}

/// A unit whose output can drive a control parameter.
///
/// Driving replaces the parameter's own value: its automation is cancelled
/// and its held value zeroed before the edge is added, so the parameter
/// follows this unit's output exactly.
pub trait ParamSource: Unit {
    /// Connects output 0 to `param`.
    fn drive(&self, graph: &mut Graph, param: ParamId) -> Result<EdgeId, UnitError> {
        self.connect(graph, 0, Inlet::Param(param))
    }
}

/// Nodes and edges owned by one composite.
#[derive(Debug, Default)]
pub struct Parts {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    released: bool,
}

impl Parts {
    /// Empty bookkeeping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a node the composite just created and returns it.
    pub fn own(&mut self, node: NodeId) -> NodeId {
        self.nodes.push(node);
        node
    }

    /// Connects under the discipline and records the edge.
    pub fn connect(
        &mut self,
        graph: &mut Graph,
        from: Outlet,
        to: Inlet,
    ) -> Result<EdgeId, GraphError> {
        let edge = graph.connect(from, to)?;
        self.record(edge);
        Ok(edge)
    }

    /// Connects additively and records the edge.
    pub fn connect_summing(
        &mut self,
        graph: &mut Graph,
        from: Outlet,
        to: Inlet,
    ) -> Result<EdgeId, GraphError> {
        let edge = graph.connect_summing(from, to)?;
        self.record(edge);
        Ok(edge)
    }

    /// Removes one recorded edge from the graph.
    pub fn disconnect(&mut self, graph: &mut Graph, edge: EdgeId) -> Result<(), GraphError> {
        graph.disconnect(edge)?;
        self.edges.retain(|&e| e != edge);
        Ok(())
    }

    fn record(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Disconnects every recorded edge, then removes every recorded node.
    ///
    /// Only the first call does anything; it returns `false` afterwards.
    /// Anything already gone from the graph is skipped.
    pub fn release(&mut self, graph: &mut Graph) -> bool {
        if self.released {
            return false;
        }
        for edge in self.edges.drain(..) {
            if graph.edge(edge).is_some() {
                let _ = graph.disconnect(edge);
            }
        }
        for node in self.nodes.drain(..) {
            if graph.contains_node(node) {
                let _ = graph.remove_node(node);
            }
        }
        self.released = true;
        true
    }

    /// Returns `true` once [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Recorded nodes.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Recorded edges.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// A settable scalar signal.
///
/// Wraps one `Constant` node. Its only input aliases its own value
/// parameter, so connecting a source into it replaces the value rather than
/// adding to it. [`fan`](Self::fan) drives several parameters from one value,
/// which keeps them in lockstep.
///
/// ```rust
/// use patchwork_core::{Context, Graph, ParamId};
/// use patchwork_units::{Signal, Unit};
///
/// let mut graph = Graph::new(Context::default());
/// let left = graph.add_gain(1.0);
/// let right = graph.add_gain(1.0);
///
/// let mut level = Signal::new(&mut graph, 0.5);
/// level.fan(&mut graph, &[ParamId::gain(left), ParamId::gain(right)]).unwrap();
/// level.set_value(&mut graph, 0.25).unwrap();
/// assert_eq!(level.value(&graph).unwrap(), 0.25);
///
/// level.dispose(&mut graph).unwrap();
/// assert_eq!(graph.edge_count(), 0);
/// ```
#[derive(Debug)]
pub struct Signal {
    parts: Parts,
    node: NodeId,
}

impl Signal {
    /// An unbounded signal holding `value`.
    pub fn new(graph: &mut Graph, value: f32) -> Self {
        Self::from_param(graph, Param::unbounded("value", value))
    }

    /// A signal whose value is named and range-checked by `param`.
    pub fn from_param(graph: &mut Graph, param: Param) -> Self {
        let mut parts = Parts::new();
        let node = parts.own(graph.add_constant_param(param));
        Self { parts, node }
    }

    /// The value parameter.
    pub fn param(&self) -> ParamId {
        ParamId::value(self.node)
    }

    /// Value at the current engine time, excluding connected signals.
    pub fn value(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.check()?;
        Ok(graph.param_value(self.param())?)
    }

    /// Sets the value from the current engine time on, checking the
    /// signal's range.
    pub fn set_value(&self, graph: &mut Graph, value: f32) -> Result<(), UnitError> {
        self.check()?;
        Ok(graph.set_param(self.param(), value)?)
    }

    /// Drives every parameter in `params` from this signal.
    pub fn fan(
        &mut self,
        graph: &mut Graph,
        params: &[ParamId],
    ) -> Result<Vec<EdgeId>, UnitError> {
        self.check()?;
        let from = Outlet::of(self.node);
        let mut edges = Vec::with_capacity(params.len());
        for &param in params {
            edges.push(self.parts.connect(graph, from, Inlet::Param(param))?);
        }
        Ok(edges)
    }

    fn check(&self) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Err(UnitError::Disposed(self.name()));
        }
        Ok(())
    }
}

impl Unit for Signal {
    fn name(&self) -> &'static str {
        "Signal"
    }

    fn inputs(&self) -> usize {
        1
    }

    fn outputs(&self) -> usize {
        1
    }

    fn input(&self, index: usize) -> Result<Inlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Inlet::Param(self.param())),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Outlet::of(self.node)),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        self.parts.release(graph);
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}

impl ParamSource for Signal {}
