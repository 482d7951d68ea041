//! Processing graph: mutation API, connection discipline, cycle checks, and
//! per-frame execution.
//!
//! [`ProcessingGraph`] owns every node and edge, validates connections as they
//! are made, compiles the topology into a [`CompiledSchedule`], and runs that
//! schedule one frame at a time inside [`process_block`](ProcessingGraph::process_block).
//!
//! Mutation and processing both take `&mut self`, so a block is always
//! rendered against one consistent topology. Any change made between two
//! blocks is applied in full before the next one starts.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::context::Context;
use crate::delay::InterpolatedDelay;
use crate::param::Param;
use crate::shaping::ShapingTable;
use crate::svf::LowpassState;

use super::edge::{Edge, EdgeId};
use super::node::{MAX_PORTS, NodeData, NodeId, NodeKind};
use super::port::{Inlet, Outlet, ParamId};
use super::schedule::{CompiledSchedule, DelayCommit, ProcessStep, SourceSpan};

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// The specified edge was not found in the graph.
    EdgeNotFound(EdgeId),
    /// The node exists but has no parameter at this index.
    ParamNotFound(ParamId),
    /// The node exists but has no such input or output.
    PortOutOfRange {
        /// Node addressed.
        node: NodeId,
        /// Port index requested.
        index: usize,
    },
    /// Adding this edge would close a loop that passes through no delay line.
    CycleWithoutDelay {
        /// Source node of the rejected edge.
        from: NodeId,
        /// Destination node of the rejected edge.
        to: NodeId,
    },
    /// A value fell outside a parameter's legal range.
    OutOfRange {
        /// Parameter name.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// The node is not of the kind the operation needs.
    WrongKind {
        /// Node addressed.
        node: NodeId,
        /// Kind the operation expected.
        expected: &'static str,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::EdgeNotFound(id) => write!(f, "edge {id} not found"),
            Self::ParamNotFound(id) => write!(f, "parameter {id} not found"),
            Self::PortOutOfRange { node, index } => {
                write!(f, "port {index} out of range on {node}")
            }
            Self::CycleWithoutDelay { from, to } => {
                write!(f, "edge {from} -> {to} would create a cycle without a delay")
            }
            Self::OutOfRange {
                param,
                value,
                min,
                max,
            } => write!(f, "{param} = {value} outside [{min}, {max}]"),
            Self::WrongKind { node, expected } => write!(f, "{node} is not a {expected} node"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Whether a new edge replaces what a parameter held or adds to it.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ConnectMode {
    Discipline,
    Summing,
}

/// Per-sample signal graph.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add nodes: [`add_input()`](Self::add_input), [`add_gain()`](Self::add_gain),
///    [`add_delay()`](Self::add_delay), ...
/// 3. Connect ports: [`connect()`](Self::connect)
/// 4. Process: [`process_block()`](Self::process_block) (compiles on demand)
///
/// ```rust
/// use patchwork_core::{Context, Graph, Inlet, Outlet, ParamId};
///
/// let mut graph = Graph::new(Context::new(48000.0, 64));
/// let input = graph.add_input(0);
/// let gain = graph.add_gain(0.5);
/// let output = graph.add_output(0);
/// graph.connect(Outlet::of(input), Inlet::input(gain, 0)).unwrap();
/// graph.connect(Outlet::of(gain), Inlet::input(output, 0)).unwrap();
///
/// let input_buf = [1.0f32; 64];
/// let mut out = [0.0f32; 64];
/// graph.process_block(&[&input_buf], &mut [&mut out]);
/// assert_eq!(out[0], 0.5);
///
/// // Driving a parameter from a signal replaces its value.
/// let half = graph.add_constant(0.25);
/// graph.connect(Outlet::of(half), ParamId::gain(gain).into()).unwrap();
/// graph.process_block(&[&input_buf], &mut [&mut out]);
/// assert_eq!(out[0], 0.25);
/// ```
#[derive(Debug)]
pub struct ProcessingGraph {
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    context: Context,
    compiled: Option<CompiledSchedule>,
    /// Set by every topology change; cleared by `compile`.
    dirty: bool,
    /// Most recent output of each node slot.
    values: Vec<f32>,
    frame: u64,
}

/// Short name for [`ProcessingGraph`].
pub type Graph = ProcessingGraph;

impl ProcessingGraph {
    /// Creates an empty graph running at the context's sample rate.
    pub fn new(context: Context) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            context,
            compiled: None,
            dirty: true,
            values: Vec::new(),
            frame: 0,
        }
    }

    // --- Node constructors ---

    /// Adds a node reading external input channel `channel`.
    pub fn add_input(&mut self, channel: usize) -> NodeId {
        self.add_node(NodeKind::Input(channel), Vec::new())
    }

    /// Adds a node summing its input into external output channel `channel`.
    pub fn add_output(&mut self, channel: usize) -> NodeId {
        self.add_node(NodeKind::Output(channel), Vec::new())
    }

    /// Adds a constant source with a settable `value` parameter.
    pub fn add_constant(&mut self, value: f32) -> NodeId {
        self.add_node(NodeKind::Constant, vec![Param::unbounded("value", value)])
    }

    /// Adds a constant source whose value parameter is `param`.
    ///
    /// Lets a caller give the value a name and a legal range, so that
    /// [`set_param`](Self::set_param) on it reports
    /// [`GraphError::OutOfRange`] in the caller's terms.
    pub fn add_constant_param(&mut self, param: Param) -> NodeId {
        self.add_node(NodeKind::Constant, vec![param])
    }

    /// Adds a multiplier with a `gain` parameter.
    pub fn add_gain(&mut self, gain: f32) -> NodeId {
        self.add_node(NodeKind::Gain, vec![Param::unbounded("gain", gain)])
    }

    /// Adds an absolute-value node.
    pub fn add_abs(&mut self) -> NodeId {
        self.add_node(NodeKind::Abs, Vec::new())
    }

    /// Adds a two-input subtractor computing `in0 - in1`.
    pub fn add_subtract(&mut self) -> NodeId {
        self.add_node(NodeKind::Subtract, Vec::new())
    }

    /// Adds a low-pass filter with `frequency` (Hz) and `q` parameters.
    pub fn add_lowpass(&mut self, frequency: f32, q: f32) -> NodeId {
        self.add_node(
            NodeKind::Lowpass(LowpassState::default()),
            vec![
                Param::unbounded("frequency", frequency),
                Param::unbounded("q", q),
            ],
        )
    }

    /// Adds a delay line.
    ///
    /// `max_delay` (seconds) sizes the buffer once and bounds the
    /// `delay_time` parameter; it is floored to one quantum. The initial
    /// `delay_time` is clamped into `[0, max_delay]`.
    pub fn add_delay(&mut self, delay_time: f32, max_delay: f32) -> NodeId {
        let quantum = self.context.quantum();
        let max_delay = if max_delay.is_finite() {
            max_delay.max(quantum)
        } else {
            quantum
        };
        let delay_time = if delay_time.is_nan() {
            0.0
        } else {
            delay_time.clamp(0.0, max_delay)
        };
        let line = InterpolatedDelay::from_time(self.context.sample_rate(), max_delay);
        self.add_node(
            NodeKind::Delay(line),
            vec![Param::new("delay_time", delay_time, 0.0, max_delay)],
        )
    }

    /// Adds a table-lookup shaper.
    pub fn add_shaper(&mut self, table: ShapingTable) -> NodeId {
        self.add_node(NodeKind::Shaper(table), Vec::new())
    }

    fn add_node(&mut self, kind: NodeKind, params: Vec<Param>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node {id}", kind.name());
        self.nodes.push(Some(NodeData::new(kind, params)));
        self.values.push(0.0);
        self.dirty = true;
        id
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.node(id)?;

        let edge_ids: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(node.outgoing.iter())
            .copied()
            .collect();
        for edge_id in edge_ids {
            self.disconnect_internal(edge_id);
        }

        self.nodes[id.0 as usize] = None;
        self.values[id.0 as usize] = 0.0;
        self.dirty = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    /// Returns `true` if `id` names a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    // --- Edge mutations ---

    /// Connects `from` to `to` under the connection discipline.
    ///
    /// - If the identical edge already exists it is returned and nothing
    ///   changes.
    /// - If `to` is a parameter, its scheduled automation is cancelled and its
    ///   held value set to 0 before the edge is added, so the incoming signal
    ///   fully determines the parameter. A parameter that was driven and is
    ///   later disconnected therefore reads 0, not its old value.
    /// - If `to` is an audio input the edge is added as is; inputs sum.
    ///
    /// # Errors
    ///
    /// Fails if either port does not exist, or if the edge would close a
    /// cycle that passes through no delay line's audio input.
    pub fn connect(&mut self, from: Outlet, to: Inlet) -> Result<EdgeId, GraphError> {
        self.add_edge(from, to, ConnectMode::Discipline)
    }

    /// Connects `from` to `to` without touching the destination's value.
    ///
    /// Use for modulation layered on top of a parameter's own baseline.
    pub fn connect_summing(&mut self, from: Outlet, to: Inlet) -> Result<EdgeId, GraphError> {
        self.add_edge(from, to, ConnectMode::Summing)
    }

    fn add_edge(
        &mut self,
        from: Outlet,
        to: Inlet,
        mode: ConnectMode,
    ) -> Result<EdgeId, GraphError> {
        self.validate_outlet(from)?;
        self.validate_inlet(to)?;

        if let Some(existing) = self.find_edge(from, to) {
            return Ok(existing);
        }

        let edge = Edge { from, to };
        if self.is_instantaneous(&edge) && self.can_reach(to.node(), from.node) {
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_connect: rejected {from} -> {to} (cycle without delay)");
            return Err(GraphError::CycleWithoutDelay {
                from: from.node,
                to: to.node(),
            });
        }

        if mode == ConnectMode::Discipline
            && let Inlet::Param(param) = to
        {
            self.param_mut(param)?.clear_for_source();
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_connect: {param} cleared for new source {from}");
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(edge));
        if let Some(node) = self.node_slot_mut(from.node) {
            node.outgoing.push(edge_id);
        }
        if let Some(node) = self.node_slot_mut(to.node()) {
            node.incoming.push(edge_id);
        }
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {from} -> {to} as {edge_id}");
        Ok(edge_id)
    }

    /// Removes an edge.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<(), GraphError> {
        if self.edge(id).is_none() {
            return Err(GraphError::EdgeNotFound(id));
        }
        self.disconnect_internal(id);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: edge {id}");
        Ok(())
    }

    /// Removes every edge leaving `from`. Returns how many were removed.
    pub fn disconnect_all(&mut self, from: Outlet) -> Result<usize, GraphError> {
        let node = self.node(from.node)?;
        let edge_ids: Vec<EdgeId> = node
            .outgoing
            .iter()
            .copied()
            .filter(|&id| self.edge(id).is_some_and(|(f, _)| f == from))
            .collect();
        for &edge_id in &edge_ids {
            self.disconnect_internal(edge_id);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {} edges from {from}", edge_ids.len());
        Ok(edge_ids.len())
    }

    /// Finds the edge connecting `from` to `to`, if one exists.
    pub fn find_edge(&self, from: Outlet, to: Inlet) -> Option<EdgeId> {
        let node = self.node(from.node).ok()?;
        node.outgoing
            .iter()
            .copied()
            .find(|&id| self.edge(id) == Some((from, to)))
    }

    /// Endpoints of a live edge.
    pub fn edge(&self, id: EdgeId) -> Option<(Outlet, Inlet)> {
        self.edges
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .map(|e| (e.from, e.to))
    }

    /// Number of edges landing on `to`.
    pub fn edges_into(&self, to: Inlet) -> usize {
        self.node(to.node()).map_or(0, |node| {
            node.incoming
                .iter()
                .filter(|&&id| self.edge(id).is_some_and(|(_, t)| t == to))
                .count()
        })
    }

    fn disconnect_internal(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        if let Some(node) = self.node_slot_mut(edge.from.node) {
            node.outgoing.retain(|&e| e != id);
        }
        if let Some(node) = self.node_slot_mut(edge.to.node()) {
            node.incoming.retain(|&e| e != id);
        }
        self.dirty = true;
    }

    // --- Node state and parameters ---

    /// The parameter at `id`.
    pub fn param(&self, id: ParamId) -> Result<&Param, GraphError> {
        self.node(id.node)?
            .params
            .get(id.index)
            .ok_or(GraphError::ParamNotFound(id))
    }

    /// Mutable access to the parameter at `id`, for scheduling automation.
    pub fn param_mut(&mut self, id: ParamId) -> Result<&mut Param, GraphError> {
        self.node_slot_mut(id.node)
            .ok_or(GraphError::NodeNotFound(id.node))?
            .params
            .get_mut(id.index)
            .ok_or(GraphError::ParamNotFound(id))
    }

    /// Sets a parameter's value from the current engine time on, checking
    /// its range.
    ///
    /// Automation that has already started is overridden; events scheduled
    /// later still apply. See [`Param::set_value_from`].
    pub fn set_param(&mut self, id: ParamId, value: f32) -> Result<(), GraphError> {
        let now = self.current_time();
        self.param_mut(id)?.set_value_from(value, now)
    }

    /// Intrinsic value of a parameter at the current engine time, excluding
    /// connected signals.
    pub fn param_value(&self, id: ParamId) -> Result<f32, GraphError> {
        Ok(self.param(id)?.value_at(self.current_time()))
    }

    /// Replaces the table of a shaper node. Edges are untouched.
    pub fn set_shaping_table(
        &mut self,
        id: NodeId,
        table: ShapingTable,
    ) -> Result<(), GraphError> {
        let node = self.node_slot_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        match &mut node.kind {
            NodeKind::Shaper(current) => {
                *current = table;
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_shaper: table of {id} rebuilt");
                Ok(())
            }
            _ => Err(GraphError::WrongKind {
                node: id,
                expected: "shaper",
            }),
        }
    }

    /// The table of a shaper node.
    pub fn shaping_table(&self, id: NodeId) -> Result<&ShapingTable, GraphError> {
        match &self.node(id)?.kind {
            NodeKind::Shaper(table) => Ok(table),
            _ => Err(GraphError::WrongKind {
                node: id,
                expected: "shaper",
            }),
        }
    }

    /// The primitive a node runs.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, GraphError> {
        Ok(&self.node(id)?.kind)
    }

    /// Short name of a node's primitive.
    pub fn kind_name(&self, id: NodeId) -> Result<&'static str, GraphError> {
        Ok(self.kind(id)?.name())
    }

    /// Output of a node on the most recently processed frame.
    pub fn last_output(&self, id: NodeId) -> Result<f32, GraphError> {
        self.node(id)?;
        Ok(self.values[id.0 as usize])
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns the number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Engine context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Engine time in seconds of the next frame to be processed.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / f64::from(self.context.sample_rate())
    }

    /// Number of frames processed so far.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Clears filter and delay state and the cached node outputs.
    ///
    /// Engine time, parameters and topology are kept.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.kind.reset();
        }
        self.values.fill(0.0);
    }

    /// The current compiled schedule, if the graph is up to date.
    pub fn compiled(&self) -> Option<&CompiledSchedule> {
        if self.dirty { None } else { self.compiled.as_ref() }
    }

    // --- Compilation ---

    /// Compiles the topology into a [`CompiledSchedule`].
    ///
    /// Sorts nodes so every instantaneous dependency is evaluated first and
    /// gathers each port's sources. Called automatically by
    /// [`process_block`](Self::process_block) after a topology change.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleWithoutDelay`] if the topology holds an
    /// instantaneous cycle. `connect` already refuses such edges, so this only
    /// fires if that invariant was broken.
    pub fn compile(&mut self) -> Result<&CompiledSchedule, GraphError> {
        let sorted = self.kahn_sort()?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_sort: {} nodes in evaluation order", sorted.len());

        let mut schedule = CompiledSchedule::default();
        for &node_idx in &sorted {
            let Some(node) = self.nodes[node_idx].as_ref() else {
                continue;
            };

            let id = NodeId(node_idx as u32);

            let mut inputs = [SourceSpan::default(); MAX_PORTS];
            for (index, span) in inputs
                .iter_mut()
                .enumerate()
                .take(node.kind.input_count())
            {
                if node.kind.input_is_delayed(index) {
                    continue;
                }
                *span = schedule.push_sources(self.sources_of(node, Inlet::input(id, index)));
            }

            let mut params = [SourceSpan::default(); MAX_PORTS];
            for (index, span) in params.iter_mut().enumerate().take(node.params.len()) {
                let port = Inlet::Param(ParamId::new(id, index));
                *span = schedule.push_sources(self.sources_of(node, port));
            }

            schedule.steps.push(ProcessStep {
                node_idx,
                inputs,
                params,
            });

            if node.kind.input_is_delayed(0) {
                let sources = schedule.push_sources(self.sources_of(node, Inlet::input(id, 0)));
                schedule.commits.push(DelayCommit { node_idx, sources });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_compile: {} steps, {} delay commits, {} sources",
            schedule.steps.len(),
            schedule.commits.len(),
            schedule.sources.len()
        );

        self.dirty = false;
        let schedule: &CompiledSchedule = self.compiled.insert(schedule);
        Ok(schedule)
    }

    /// Slot indices of the nodes feeding `port` of `node`.
    fn sources_of<'a>(
        &'a self,
        node: &'a NodeData,
        port: Inlet,
    ) -> impl Iterator<Item = usize> + 'a {
        node.incoming.iter().filter_map(move |&id| {
            self.edges
                .get(id.0 as usize)
                .and_then(|e| e.as_ref())
                .filter(|e| e.to == port)
                .map(|e| e.from.node.0 as usize)
        })
    }

    /// Kahn's algorithm over instantaneous edges.
    fn kahn_sort(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.nodes.len();
        let mut in_degree = vec![0u32; n];
        let mut active_count = 0usize;

        for edge in self.edges.iter().flatten() {
            if self.is_instantaneous(edge) {
                in_degree[edge.to.node().0 as usize] += 1;
            }
        }

        let mut queue: Vec<usize> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_some() {
                active_count += 1;
                if in_degree[i] == 0 {
                    queue.push(i);
                }
            }
        }
        // Pop from the back but start with the lowest slot first.
        queue.reverse();

        let mut sorted = Vec::with_capacity(active_count);
        while let Some(idx) = queue.pop() {
            sorted.push(idx);
            let Some(node) = self.nodes[idx].as_ref() else {
                continue;
            };
            for edge_id in &node.outgoing {
                if let Some(edge) = &self.edges[edge_id.0 as usize]
                    && self.is_instantaneous(edge)
                {
                    let to_idx = edge.to.node().0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        queue.push(to_idx);
                    }
                }
            }
        }

        if sorted.len() != active_count {
            let stuck = (0..n)
                .find(|&i| self.nodes[i].is_some() && in_degree[i] > 0)
                .map_or(NodeId(0), |i| NodeId(i as u32));
            return Err(GraphError::CycleWithoutDelay {
                from: stuck,
                to: stuck,
            });
        }
        Ok(sorted)
    }

    /// An edge is instantaneous unless it feeds a delay line's audio input.
    fn is_instantaneous(&self, edge: &Edge) -> bool {
        match edge.to {
            Inlet::Input { node, index } => !self
                .node(node)
                .is_ok_and(|n| n.kind.input_is_delayed(index)),
            Inlet::Param(_) => true,
        }
    }

    /// Depth-first search along instantaneous edges.
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(node)) = self.nodes.get(idx) {
                for edge_id in &node.outgoing {
                    if let Some(edge) = &self.edges[edge_id.0 as usize]
                        && self.is_instantaneous(edge)
                    {
                        stack.push(edge.to.node());
                    }
                }
            }
        }
        false
    }

    // --- Processing ---

    /// Renders one block.
    ///
    /// `inputs[c]` feeds `Input(c)` nodes and `Output(c)` nodes sum into
    /// `outputs[c]`; channels with no buffer read as silence or are dropped.
    /// The block length is the shortest output buffer, or the shortest input
    /// buffer when there are no outputs. Output buffers are overwritten.
    ///
    /// Each frame evaluates every node in dependency order, then writes the
    /// summed audio input of each delay line into its buffer, then advances
    /// engine time by one quantum.
    pub fn process_block(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        let frames = if outputs.is_empty() {
            inputs.iter().map(|b| b.len()).min().unwrap_or(0)
        } else {
            outputs.iter().map(|b| b.len()).min().unwrap_or(0)
        };
        for out in outputs.iter_mut() {
            out[..frames].fill(0.0);
        }
        if frames == 0 {
            return;
        }

        let now = self.current_time();
        for node in self.nodes.iter_mut().flatten() {
            for param in &mut node.params {
                param.prune_before(now);
            }
        }

        if self.dirty
            && let Err(_err) = self.compile()
        {
            #[cfg(feature = "tracing")]
            tracing::warn!("graph_process: compile failed, rendering silence: {_err}");
            return;
        }

        let Self {
            nodes,
            context,
            compiled,
            values,
            frame,
            ..
        } = self;
        let Some(schedule) = compiled.as_ref() else {
            return;
        };
        let sample_rate = context.sample_rate();

        for n in 0..frames {
            let time = *frame as f64 / f64::from(sample_rate);

            for step in &schedule.steps {
                let Some(node) = nodes[step.node_idx].as_mut() else {
                    continue;
                };
                let NodeData { kind, params, .. } = node;

                let mut ins = [0.0f32; MAX_PORTS];
                for (x, &span) in ins.iter_mut().zip(&step.inputs) {
                    *x = schedule.sum(span, values);
                }
                let mut ps = [0.0f32; MAX_PORTS];
                for ((p, param), &span) in ps.iter_mut().zip(params.iter()).zip(&step.params) {
                    *p = param.value_at(time) + schedule.sum(span, values);
                }

                let out = match kind {
                    NodeKind::Input(ch) => inputs
                        .get(*ch)
                        .and_then(|buf| buf.get(n))
                        .copied()
                        .unwrap_or(0.0),
                    NodeKind::Output(ch) => {
                        if let Some(buf) = outputs.get_mut(*ch) {
                            buf[n] += ins[0];
                        }
                        0.0
                    }
                    NodeKind::Constant => ps[0],
                    NodeKind::Gain => ins[0] * ps[0],
                    NodeKind::Abs => ins[0].abs(),
                    NodeKind::Subtract => ins[0] - ins[1],
                    NodeKind::Lowpass(state) => state.process(ins[0], ps[0], ps[1], sample_rate),
                    NodeKind::Delay(line) => line.read(ps[0] * sample_rate),
                    NodeKind::Shaper(table) => table.lookup(ins[0]),
                };
                values[step.node_idx] = out;
            }

            for commit in &schedule.commits {
                let x = schedule.sum(commit.sources, values);
                if let Some(NodeData {
                    kind: NodeKind::Delay(line),
                    ..
                }) = nodes[commit.node_idx].as_mut()
                {
                    line.write(x);
                }
            }

            *frame += 1;
        }
    }

    /// Renders `frames` frames with no external input or output.
    ///
    /// Useful for driving a graph whose results are read through
    /// [`last_output`](Self::last_output) or for letting state settle.
    pub fn run(&mut self, frames: usize) {
        let silence = vec![0.0f32; frames];
        self.process_block(&[&silence], &mut []);
    }

    // --- Lookup helpers ---

    fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn node_slot_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0 as usize).and_then(|n| n.as_mut())
    }

    fn validate_outlet(&self, outlet: Outlet) -> Result<(), GraphError> {
        let node = self.node(outlet.node)?;
        if outlet.index >= node.kind.output_count() {
            return Err(GraphError::PortOutOfRange {
                node: outlet.node,
                index: outlet.index,
            });
        }
        Ok(())
    }

    fn validate_inlet(&self, inlet: Inlet) -> Result<(), GraphError> {
        match inlet {
            Inlet::Input { node, index } => {
                if index >= self.node(node)?.kind.input_count() {
                    return Err(GraphError::PortOutOfRange { node, index });
                }
                Ok(())
            }
            Inlet::Param(id) => self.param(id).map(|_| ()),
        }
    }
}
