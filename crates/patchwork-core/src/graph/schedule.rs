//! Compiled schedule types for the per-frame graph engine.
//!
//! A [`CompiledSchedule`] is produced by
//! [`ProcessingGraph::compile()`](super::ProcessingGraph::compile). It holds a
//! flat list of [`ProcessStep`]s in dependency order plus the delay-line
//! commits that run after every step of a frame has been evaluated.
//!
//! Source lists are flattened into one shared `Vec<usize>` and addressed by
//! [`SourceSpan`], so a step is entirely stack-allocated and executing a frame
//! never touches the allocator.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::node::MAX_PORTS;

/// A run of entries in [`CompiledSchedule`]'s flattened source list.
///
/// Each entry is the slot index of a node whose output feeds the port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceSpan {
    pub(crate) start: u32,
    pub(crate) end: u32,
}

impl SourceSpan {
    /// Number of sources summed into the port.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Returns `true` if nothing is connected.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Evaluate one node for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct ProcessStep {
    /// Index into the graph's node storage.
    pub(crate) node_idx: usize,
    /// Instantaneous sources for each audio input.
    pub(crate) inputs: [SourceSpan; MAX_PORTS],
    /// Sources for each parameter.
    pub(crate) params: [SourceSpan; MAX_PORTS],
}

/// Write the summed audio input of a delay node into its buffer.
///
/// Runs after all steps of the frame, so a delay's input can come from
/// anywhere in the graph, including from downstream of the delay itself.
#[derive(Clone, Copy, Debug)]
pub struct DelayCommit {
    pub(crate) node_idx: usize,
    pub(crate) sources: SourceSpan,
}

/// Compiled evaluation order of a processing graph.
#[derive(Debug, Default)]
pub struct CompiledSchedule {
    pub(crate) steps: Vec<ProcessStep>,
    pub(crate) commits: Vec<DelayCommit>,
    pub(crate) sources: Vec<usize>,
}

impl CompiledSchedule {
    /// Returns the number of processing steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the number of delay-line commits per frame.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Node slot indices in evaluation order.
    pub fn order(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().map(|s| s.node_idx)
    }

    /// Appends sources and returns the span that addresses them.
    pub(crate) fn push_sources(&mut self, nodes: impl IntoIterator<Item = usize>) -> SourceSpan {
        let start = self.sources.len() as u32;
        self.sources.extend(nodes);
        SourceSpan {
            start,
            end: self.sources.len() as u32,
        }
    }

    /// Sums the current outputs of the nodes in `span`.
    #[inline]
    pub(crate) fn sum(&self, span: SourceSpan, values: &[f32]) -> f32 {
        self.sources[span.start as usize..span.end as usize]
            .iter()
            .map(|&idx| values[idx])
            .sum()
    }
}
