//! Ping-pong echo built on [`StereoFeedbackEffect`].
//!
//! Each send feeds its own delay line and each line feeds its own return.
//! The left return crosses into the right line through the base's
//! left-to-right feedback. The right-to-left feedback is moved off the left
//! send and straight into the left line, so repeats alternate sides:
//!
//! ```text
//! send_l ──► delay_l ──► return_l ──► fb_lr ──► send_r ──► delay_r ──► return_r
//!              ▲                                                          │
//!              └──────────────────────── fb_rl ◄──────────────────────────┘
//! ```
//!
//! A left impulse is heard on the left after one delay time and on the
//! right after two. One `delay_time` control drives both lines, so they
//! stay in step when it is automated.

use patchwork_core::{Graph, GraphError, Inlet, NodeId, Outlet, Param, ParamId, TimeValue};

use crate::error::UnitError;
use crate::options::PingPongOptions;
use crate::stereo::{Channel, StereoFeedbackEffect};
use crate::unit::{Parts, Signal, Unit};

/// Stereo delay whose echoes alternate between channels.
///
/// ```rust
/// use patchwork_core::{Context, Graph, TimeValue};
/// use patchwork_units::{PingPongDelay, PingPongOptions};
///
/// let mut graph = Graph::new(Context::default());
/// let mut delay = PingPongDelay::new(
///     &mut graph,
///     PingPongOptions { delay_time: TimeValue::Milliseconds(125.0), ..Default::default() },
/// )
/// .unwrap();
/// assert_eq!(delay.delay_time(&graph).unwrap(), 0.125);
///
/// // The lines were sized for one second.
/// assert!(delay.set_delay_time(&mut graph, TimeValue::Seconds(2.0)).is_err());
/// ```
#[derive(Debug)]
pub struct PingPongDelay {
    base: StereoFeedbackEffect,
    parts: Parts,
    delay_time: Signal,
    max_delay_time: f32,
}

impl PingPongDelay {
    /// Builds the delay in `graph`.
    ///
    /// # Errors
    ///
    /// [`GraphError::OutOfRange`] if the delay time exceeds `max_delay_time`,
    /// or if `wet` or `feedback` fall outside `[0, 1]`. Nothing is added to
    /// the graph in that case.
    pub fn new(graph: &mut Graph, options: PingPongOptions) -> Result<Self, UnitError> {
        let ctx = *graph.context();
        let max_delay_time = if options.max_delay_time.is_finite() {
            options.max_delay_time.max(ctx.quantum())
        } else {
            ctx.quantum()
        };
        let delay_time = options.delay_time.resolve_clamped(&ctx);
        check_delay_time(delay_time, max_delay_time)?;

        let mut base = StereoFeedbackEffect::new(graph, options.wet, options.feedback)?;
        let mut parts = Parts::new();
        let delay_l = parts.own(graph.add_delay(delay_time, max_delay_time));
        let delay_r = parts.own(graph.add_delay(delay_time, max_delay_time));

        parts.connect(graph, base.send(Channel::Left)?, Inlet::input(delay_l, 0))?;
        parts.connect(graph, Outlet::of(delay_l), base.return_inlet(Channel::Left)?)?;
        parts.connect(graph, base.send(Channel::Right)?, Inlet::input(delay_r, 0))?;
        parts.connect(graph, Outlet::of(delay_r), base.return_inlet(Channel::Right)?)?;
        base.reroute_feedback_rl(graph, Inlet::input(delay_l, 0))?;

        let mut time = Signal::from_param(
            graph,
            Param::new("delay_time", delay_time, 0.0, max_delay_time),
        );
        time.fan(
            graph,
            &[ParamId::delay_time(delay_l), ParamId::delay_time(delay_r)],
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!("unit_new: PingPongDelay delay_time={delay_time} max={max_delay_time}");
        Ok(Self {
            base,
            parts,
            delay_time: time,
            max_delay_time,
        })
    }

    /// Current delay time in seconds.
    pub fn delay_time(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.delay_time.value(graph)
    }

    /// Changes the delay time of both lines together.
    ///
    /// Times at or below zero are floored at one frame. Times above
    /// [`max_delay_time`](Self::max_delay_time) are rejected with
    /// [`GraphError::OutOfRange`] and leave the delay unchanged.
    pub fn set_delay_time(&self, graph: &mut Graph, time: TimeValue) -> Result<(), UnitError> {
        let seconds = time.resolve_clamped(graph.context());
        self.delay_time.set_value(graph, seconds)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("unit_update: PingPongDelay delay_time={seconds}");
        Ok(())
    }

    /// The shared delay-time control.
    pub fn delay_time_param(&self) -> ParamId {
        self.delay_time.param()
    }

    /// Longest delay time the lines can hold, in seconds.
    pub fn max_delay_time(&self) -> f32 {
        self.max_delay_time
    }

    /// Wet/dry balance.
    pub fn wet(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.base.wet(graph)
    }

    /// Sets the wet/dry balance.
    pub fn set_wet(&self, graph: &mut Graph, wet: f32) -> Result<(), UnitError> {
        self.base.set_wet(graph, wet)
    }

    /// Cross-feedback amount.
    pub fn feedback(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.base.feedback(graph)
    }

    /// Sets the cross-feedback amount.
    pub fn set_feedback(&self, graph: &mut Graph, feedback: f32) -> Result<(), UnitError> {
        self.base.set_feedback(graph, feedback)
    }

    /// Left and right delay nodes.
    pub fn delay_nodes(&self) -> &[NodeId] {
        self.parts.nodes()
    }
}

fn check_delay_time(seconds: f32, max: f32) -> Result<(), UnitError> {
    if seconds <= max {
        Ok(())
    } else {
        Err(GraphError::OutOfRange {
            param: "delay_time",
            value: seconds,
            min: 0.0,
            max,
        }
        .into())
    }
}

impl Unit for PingPongDelay {
    fn name(&self) -> &'static str {
        "PingPongDelay"
    }

    fn inputs(&self) -> usize {
        self.base.inputs()
    }

    fn outputs(&self) -> usize {
        self.base.outputs()
    }

    fn input(&self, index: usize) -> Result<Inlet, UnitError> {
        self.base.input(index)
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.base.output(index)
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Ok(());
        }
        self.parts.release(graph);
        self.delay_time.dispose(graph)?;
        self.base.dispose(graph)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("unit_dispose: PingPongDelay");
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::Context;

    fn graph() -> Graph {
        Graph::new(Context::new(48000.0, 64))
    }

    #[test]
    fn defaults() {
        let mut g = graph();
        let pp = PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap();
        assert_eq!(pp.delay_time(&g).unwrap(), 0.25);
        assert_eq!(pp.max_delay_time(), 1.0);
        assert_eq!(pp.feedback(&g).unwrap(), 0.25);
        assert_eq!(pp.wet(&g).unwrap(), 0.5);
        assert_eq!(pp.inputs(), 2);
        assert_eq!(pp.outputs(), 2);
    }

    #[test]
    fn lines_share_one_time_control() {
        let mut g = graph();
        let pp = PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap();
        for &node in pp.delay_nodes() {
            let param = ParamId::delay_time(node);
            assert_eq!(g.edges_into(param.into()), 1);
            // The line's own value is zeroed; the control supplies it all.
            assert_eq!(g.param(param).unwrap().value(), 0.0);
        }
        pp.set_delay_time(&mut g, TimeValue::Milliseconds(100.0))
            .unwrap();
        assert!((pp.delay_time(&g).unwrap() - 0.1).abs() < 1e-7);
    }

    #[test]
    fn construction_rejects_time_beyond_max() {
        let mut g = graph();
        let err = PingPongDelay::new(
            &mut g,
            PingPongOptions {
                delay_time: TimeValue::Seconds(2.0),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            UnitError::Graph(GraphError::OutOfRange {
                param: "delay_time",
                ..
            })
        ));
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn setter_keeps_time_on_range_error() {
        let mut g = graph();
        let pp = PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap();
        assert!(pp.set_delay_time(&mut g, TimeValue::Seconds(1.5)).is_err());
        assert_eq!(pp.delay_time(&g).unwrap(), 0.25);
    }

    #[test]
    fn zero_time_floors_at_one_frame() {
        let mut g = graph();
        let pp = PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap();
        pp.set_delay_time(&mut g, TimeValue::Seconds(0.0)).unwrap();
        assert_eq!(pp.delay_time(&g).unwrap(), g.context().quantum());
    }

    #[test]
    fn dispose_twice() {
        let mut g = graph();
        let mut pp = PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap();
        pp.dispose(&mut g).unwrap();
        pp.dispose(&mut g).unwrap();
        assert!(pp.is_disposed());
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(pp.delay_time(&g).is_err());
    }
}
