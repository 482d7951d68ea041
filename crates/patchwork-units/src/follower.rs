//! Envelope follower built from a low-pass filter that retunes itself.
//!
//! ```text
//!            ┌────────────────────────────────────────────┐
//! in ─► abs ─┼─► lowpass ─────────────────────────────────┼─► out
//!            │      ▲  │                                  │
//!            │ freq │  └─► delay (1 frame) ─┐             │
//!            │      │                       ▼             │
//!            └──────┼──────────────────► subtract (r - s) │
//!                   │                       │             │
//!                   └── shaper ◄── boost ◄──┘             │
//! ```
//!
//! The rectified input `r` is smoothed by a critically damped low-pass into
//! `s`. The difference `r - s`, taken against `s` one frame ago, says whether
//! the envelope is rising. A large gain and a [`DirectionMap`] table turn that
//! sign into a cutoff frequency (the attack frequency while rising, the
//! release frequency otherwise) and drive the filter's own cutoff with it.
//!
//! Attack and release are floored at one frame. Times close to a frame work
//! but ripple, because the loop itself is only one frame long.

use patchwork_core::{
    Graph, Inlet, MIN_Q, NodeId, Outlet, ParamId, ShapingFunction, TimeValue, clamp_time,
};

use crate::comparators::{THRESHOLD_GAIN, threshold_table};
use crate::error::UnitError;
use crate::options::FollowerOptions;
use crate::unit::{ParamSource, Parts, Unit};

/// Maps the boosted direction signal to a cutoff frequency in Hz.
///
/// Positive input (envelope rising) gives `attack_hz`; zero or negative
/// (falling or steady) gives `release_hz`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionMap {
    /// Cutoff while the envelope rises.
    pub attack_hz: f32,
    /// Cutoff while the envelope falls or holds.
    pub release_hz: f32,
}

impl ShapingFunction for DirectionMap {
    #[inline]
    fn shape(&self, x: f32) -> f32 {
        if x > 0.0 {
            self.attack_hz
        } else {
            self.release_hz
        }
    }
}

/// Amplitude envelope follower with independent attack and release.
///
/// ```rust
/// use patchwork_core::{Context, Graph, Inlet, Outlet};
/// use patchwork_units::{Follower, FollowerOptions, Unit};
///
/// let mut graph = Graph::new(Context::new(48000.0, 128));
/// let input = graph.add_input(0);
/// let output = graph.add_output(0);
/// let follower = Follower::new(&mut graph, FollowerOptions::default()).unwrap();
/// graph.connect(Outlet::of(input), follower.input(0).unwrap()).unwrap();
/// follower.connect(&mut graph, 0, Inlet::input(output, 0)).unwrap();
///
/// let burst = vec![0.8f32; 4800];
/// let mut env = vec![0.0f32; 4800];
/// graph.process_block(&[&burst], &mut [&mut env]);
/// assert!(env[4799] > 0.7 && env[4799] <= 0.8 + 1e-3);
/// ```
#[derive(Debug)]
pub struct Follower {
    parts: Parts,
    abs: NodeId,
    lowpass: NodeId,
    shaper: NodeId,
    attack: TimeValue,
    release: TimeValue,
}

impl Follower {
    /// Builds the follower in `graph`.
    pub fn new(graph: &mut Graph, options: FollowerOptions) -> Result<Self, UnitError> {
        let ctx = *graph.context();
        let map = Self::direction_map(options.attack, options.release, graph);

        let mut parts = Parts::new();
        let abs = parts.own(graph.add_abs());
        let lowpass = parts.own(graph.add_lowpass(map.release_hz, MIN_Q));
        let delay = parts.own(graph.add_delay(0.0, ctx.quantum()));
        let subtract = parts.own(graph.add_subtract());
        let boost = parts.own(graph.add_gain(THRESHOLD_GAIN));
        let shaper = parts.own(graph.add_shaper(threshold_table(&map)));

        parts.connect(graph, Outlet::of(abs), Inlet::input(lowpass, 0))?;
        parts.connect(graph, Outlet::of(abs), Inlet::input(subtract, 0))?;
        parts.connect(graph, Outlet::of(lowpass), Inlet::input(delay, 0))?;
        parts.connect(graph, Outlet::of(delay), Inlet::input(subtract, 1))?;
        parts.connect(graph, Outlet::of(subtract), Inlet::input(boost, 0))?;
        parts.connect(graph, Outlet::of(boost), Inlet::input(shaper, 0))?;
        // Closes the loop; the cutoff's own value is zeroed by the connect.
        parts.connect(graph, Outlet::of(shaper), ParamId::frequency(lowpass).into())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "unit_new: Follower attack_hz={} release_hz={}",
            map.attack_hz,
            map.release_hz
        );
        Ok(Self {
            parts,
            abs,
            lowpass,
            shaper,
            attack: options.attack,
            release: options.release,
        })
    }

    /// Attack time as configured.
    pub fn attack(&self) -> TimeValue {
        self.attack
    }

    /// Release time as configured.
    pub fn release(&self) -> TimeValue {
        self.release
    }

    /// Attack time in seconds, after flooring at one frame.
    pub fn attack_seconds(&self, graph: &Graph) -> f32 {
        self.attack.resolve_clamped(graph.context())
    }

    /// Release time in seconds, after flooring at one frame.
    pub fn release_seconds(&self, graph: &Graph) -> f32 {
        self.release.resolve_clamped(graph.context())
    }

    /// Changes the attack time. Only the shaping table is rebuilt.
    pub fn set_attack(&mut self, graph: &mut Graph, attack: TimeValue) -> Result<(), UnitError> {
        self.check()?;
        self.attack = attack;
        self.rebuild(graph)
    }

    /// Changes the release time. Only the shaping table is rebuilt.
    pub fn set_release(&mut self, graph: &mut Graph, release: TimeValue) -> Result<(), UnitError> {
        self.check()?;
        self.release = release;
        self.rebuild(graph)
    }

    /// The cutoff mapping for the current settings.
    pub fn map(&self, graph: &Graph) -> DirectionMap {
        Self::direction_map(self.attack, self.release, graph)
    }

    fn rebuild(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        let map = self.map(graph);
        graph.set_shaping_table(self.shaper, threshold_table(&map))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "unit_update: Follower attack_hz={} release_hz={}",
            map.attack_hz,
            map.release_hz
        );
        Ok(())
    }

    fn direction_map(attack: TimeValue, release: TimeValue, graph: &Graph) -> DirectionMap {
        let ctx = graph.context();
        DirectionMap {
            attack_hz: ctx.seconds_to_frequency(clamp_time(attack.resolve(ctx), ctx)),
            release_hz: ctx.seconds_to_frequency(clamp_time(release.resolve(ctx), ctx)),
        }
    }

    fn check(&self) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Err(UnitError::Disposed(self.name()));
        }
        Ok(())
    }
}

impl Unit for Follower {
    fn name(&self) -> &'static str {
        "Follower"
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
            0 => Ok(Inlet::input(self.abs, 0)),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Outlet::of(self.lowpass)),
            _ => Err(UnitError::PortOutOfRange {
                unit: self.name(),
                index,
            }),
        }
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        if self.parts.release(graph) {
            #[cfg(feature = "tracing")]
            tracing::debug!("unit_dispose: Follower");
        }
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}

impl ParamSource for Follower {}
