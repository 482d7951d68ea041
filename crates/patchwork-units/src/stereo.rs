//! Stereo effect base with wet/dry balance and cross-coupled feedback.
//!
//! ```text
//! input_l ──┬─► dry_l ───────────────────────────► output_l
//!           └─► send_l ─► (effect) ─► return_l ─┬─► wet_l ─► output_l
//!                  ▲                            └─► fb_lr ─► send_r
//!                  └────────────── fb_rl ◄── return_r
//! ```
//!
//! The right channel mirrors the left. Nothing connects a send to its
//! return; an effect built on this base inserts its own processing there.
//! The `wet` control drives both wet gains, and `1 - wet` (computed in the
//! graph) drives both dry gains, so the balance holds under automation. The
//! `feedback` control drives both cross-feedback gains.
//!
//! Any processing placed between a send and its return must carry at least
//! one delay line, since the cross-feedback closes a loop through it.

use patchwork_core::{EdgeId, Graph, GraphError, Inlet, NodeId, Outlet, Param, ParamId};

use crate::error::UnitError;
use crate::unit::{Parts, Signal, Unit};

/// Left or right channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Left, port 0.
    Left,
    /// Right, port 1.
    Right,
}

/// Fails with [`GraphError::OutOfRange`] unless `value` lies in `[0, 1]`.
pub(crate) fn check_unit_range(param: &'static str, value: f32) -> Result<(), UnitError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GraphError::OutOfRange {
            param,
            value,
            min: 0.0,
            max: 1.0,
        }
        .into())
    }
}

#[derive(Debug, Clone, Copy)]
struct Side {
    input: NodeId,
    output: NodeId,
    send: NodeId,
    ret: NodeId,
}

impl Side {
    fn new(parts: &mut Parts, graph: &mut Graph) -> Self {
        Self {
            input: parts.own(graph.add_gain(1.0)),
            output: parts.own(graph.add_gain(1.0)),
            send: parts.own(graph.add_gain(1.0)),
            ret: parts.own(graph.add_gain(1.0)),
        }
    }
}

/// Stereo wet/dry effect whose returns feed back into the opposite send.
#[derive(Debug)]
pub struct StereoFeedbackEffect {
    parts: Parts,
    left: Side,
    right: Side,
    fb_rl: NodeId,
    fb_rl_edge: EdgeId,
    wet: Signal,
    feedback: Signal,
}

impl StereoFeedbackEffect {
    /// Builds the base routing. `wet` and `feedback` must lie in `[0, 1]`.
    pub fn new(graph: &mut Graph, wet: f32, feedback: f32) -> Result<Self, UnitError> {
        check_unit_range("wet", wet)?;
        check_unit_range("feedback", feedback)?;

        let mut parts = Parts::new();
        let left = Side::new(&mut parts, graph);
        let right = Side::new(&mut parts, graph);

        let wet_l = parts.own(graph.add_gain(wet));
        let wet_r = parts.own(graph.add_gain(wet));
        let dry_l = parts.own(graph.add_gain(1.0 - wet));
        let dry_r = parts.own(graph.add_gain(1.0 - wet));
        let fb_lr = parts.own(graph.add_gain(feedback));
        let fb_rl = parts.own(graph.add_gain(feedback));
        let one = parts.own(graph.add_constant(1.0));
        let dry_amount = parts.own(graph.add_subtract());

        for (s, wet_gain, dry_gain) in [(left, wet_l, dry_l), (right, wet_r, dry_r)] {
            parts.connect(graph, Outlet::of(s.input), Inlet::input(dry_gain, 0))?;
            parts.connect(graph, Outlet::of(dry_gain), Inlet::input(s.output, 0))?;
            parts.connect(graph, Outlet::of(s.input), Inlet::input(s.send, 0))?;
            parts.connect(graph, Outlet::of(s.ret), Inlet::input(wet_gain, 0))?;
            parts.connect(graph, Outlet::of(wet_gain), Inlet::input(s.output, 0))?;
        }
        parts.connect(graph, Outlet::of(left.ret), Inlet::input(fb_lr, 0))?;
        parts.connect(graph, Outlet::of(fb_lr), Inlet::input(right.send, 0))?;
        parts.connect(graph, Outlet::of(right.ret), Inlet::input(fb_rl, 0))?;
        let fb_rl_edge = parts.connect(graph, Outlet::of(fb_rl), Inlet::input(left.send, 0))?;

        let mut wet_signal = Signal::from_param(graph, Param::new("wet", wet, 0.0, 1.0));
        wet_signal.fan(graph, &[ParamId::gain(wet_l), ParamId::gain(wet_r)])?;
        parts.connect(graph, Outlet::of(one), Inlet::input(dry_amount, 0))?;
        parts.connect(graph, wet_signal.output(0)?, Inlet::input(dry_amount, 1))?;
        parts.connect(graph, Outlet::of(dry_amount), ParamId::gain(dry_l).into())?;
        parts.connect(graph, Outlet::of(dry_amount), ParamId::gain(dry_r).into())?;

        let mut feedback_signal =
            Signal::from_param(graph, Param::new("feedback", feedback, 0.0, 1.0));
        feedback_signal.fan(graph, &[ParamId::gain(fb_lr), ParamId::gain(fb_rl)])?;

        #[cfg(feature = "tracing")]
        tracing::debug!("unit_new: StereoFeedbackEffect wet={wet} feedback={feedback}");
        Ok(Self {
            parts,
            left,
            right,
            fb_rl,
            fb_rl_edge,
            wet: wet_signal,
            feedback: feedback_signal,
        })
    }

    fn side(&self, channel: Channel) -> Side {
        match channel {
            Channel::Left => self.left,
            Channel::Right => self.right,
        }
    }

    /// Where the effect picks up `channel`'s signal.
    pub fn send(&self, channel: Channel) -> Result<Outlet, UnitError> {
        self.check()?;
        Ok(Outlet::of(self.side(channel).send))
    }

    /// Where the effect delivers `channel`'s processed signal.
    pub fn return_inlet(&self, channel: Channel) -> Result<Inlet, UnitError> {
        self.check()?;
        Ok(Inlet::input(self.side(channel).ret, 0))
    }

    /// Points the right-to-left feedback at `to` instead of the left send.
    pub fn reroute_feedback_rl(&mut self, graph: &mut Graph, to: Inlet) -> Result<(), UnitError> {
        self.check()?;
        // New edge first: a rejected target leaves the old route in place.
        let edge = self.parts.connect(graph, Outlet::of(self.fb_rl), to)?;
        if edge != self.fb_rl_edge {
            self.parts.disconnect(graph, self.fb_rl_edge)?;
            self.fb_rl_edge = edge;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("unit_reroute: StereoFeedbackEffect fb_rl -> {to}");
        Ok(())
    }

    /// Wet/dry balance, 0 (dry) to 1 (wet).
    pub fn wet(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.check()?;
        self.wet.value(graph)
    }

    /// Sets the wet/dry balance.
    pub fn set_wet(&self, graph: &mut Graph, wet: f32) -> Result<(), UnitError> {
        self.check()?;
        self.wet.set_value(graph, wet)
    }

    /// The wet control, for automation or for driving from another signal.
    pub fn wet_param(&self) -> ParamId {
        self.wet.param()
    }

    /// Cross-feedback amount, 0 to 1.
    pub fn feedback(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.check()?;
        self.feedback.value(graph)
    }

    /// Sets the cross-feedback amount.
    pub fn set_feedback(&self, graph: &mut Graph, feedback: f32) -> Result<(), UnitError> {
        self.check()?;
        self.feedback.set_value(graph, feedback)
    }

    /// The feedback control.
    pub fn feedback_param(&self) -> ParamId {
        self.feedback.param()
    }

    fn check(&self) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Err(UnitError::Disposed(self.name()));
        }
        Ok(())
    }
}

impl Unit for StereoFeedbackEffect {
    fn name(&self) -> &'static str {
        "StereoFeedbackEffect"
    }

    fn inputs(&self) -> usize {
        2
    }

    fn outputs(&self) -> usize {
        2
    }

    fn input(&self, index: usize) -> Result<Inlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Inlet::input(self.left.input, 0)),
            1 => Ok(Inlet::input(self.right.input, 0)),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Outlet::of(self.left.output)),
            1 => Ok(Outlet::of(self.right.output)),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Ok(());
        }
        self.wet.dispose(graph)?;
        self.feedback.dispose(graph)?;
        self.parts.release(graph);
        #[cfg(feature = "tracing")]
        tracing::debug!("unit_dispose: StereoFeedbackEffect");
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}
