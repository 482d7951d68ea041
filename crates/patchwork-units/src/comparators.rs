//! Comparators built from subtraction and a hard threshold table.
//!
//! [`GreaterThanZero`] is the leaf: a large fixed gain followed by a
//! nearest-point lookup in a step table. The gain pushes every meaningful
//! input far from the table's centre point, so the lookup resolves to exactly
//! 0 or 1 rather than some interpolated value. [`GreaterThan`] subtracts a
//! threshold from its input and feeds the difference to a [`GreaterThanZero`].
//!
//! Both are strict: equality gives 0, as does NaN. Every normal positive
//! difference reads 1; only subnormal differences below about `3e-42` read
//! as 0, since even the largest finite pre-gain cannot lift them past the
//! half-way point between table entries.

use patchwork_core::{
    DEFAULT_TABLE_LEN, Graph, Inlet, Interpolation, NodeId, Outlet, Param, ParamId,
    ShapingFunction, ShapingTable,
};

use crate::error::UnitError;
use crate::options::GreaterThanOptions;
use crate::unit::{ParamSource, Parts, Unit};

/// Pre-gain applied before threshold lookups.
///
/// The largest finite gain, so that the smallest differences still move away
/// from the table's centre point. Overflow to infinity clamps to the table's
/// ends.
pub const THRESHOLD_GAIN: f32 = f32::MAX;

/// `1` for `x > 0`, `0` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Step;

impl ShapingFunction for Step {
    #[inline]
    fn shape(&self, x: f32) -> f32 {
        if x > 0.0 { 1.0 } else { 0.0 }
    }
}

/// Tabulates `f` for use behind a [`THRESHOLD_GAIN`] stage.
///
/// The table has an odd number of points, so one sits exactly on zero, and
/// is read without interpolation.
pub fn threshold_table<F: ShapingFunction + ?Sized>(f: &F) -> ShapingTable {
    ShapingTable::sample(f, DEFAULT_TABLE_LEN, Interpolation::None)
}

fn port_error(unit: &'static str, index: usize) -> UnitError {
    UnitError::PortOutOfRange { unit, index }
}

/// Outputs 1 while its input is strictly positive, else 0.
///
/// ```rust
/// use patchwork_core::{Context, Graph, Inlet, Outlet};
/// use patchwork_units::{GreaterThanZero, Unit};
///
/// let mut graph = Graph::new(Context::default());
/// let input = graph.add_input(0);
/// let output = graph.add_output(0);
/// let gtz = GreaterThanZero::new(&mut graph).unwrap();
/// graph.connect(Outlet::of(input), gtz.input(0).unwrap()).unwrap();
/// gtz.connect(&mut graph, 0, Inlet::input(output, 0)).unwrap();
///
/// let mut out = [0.0; 3];
/// graph.process_block(&[&[-0.5, 0.0, 0.5]], &mut [&mut out]);
/// assert_eq!(out, [0.0, 0.0, 1.0]);
/// ```
#[derive(Debug)]
pub struct GreaterThanZero {
    parts: Parts,
    boost: NodeId,
    shaper: NodeId,
}

impl GreaterThanZero {
    /// Builds the comparator in `graph`.
    pub fn new(graph: &mut Graph) -> Result<Self, UnitError> {
        let mut parts = Parts::new();
        let boost = parts.own(graph.add_gain(THRESHOLD_GAIN));
        let shaper = parts.own(graph.add_shaper(threshold_table(&Step)));
        parts.connect(graph, Outlet::of(boost), Inlet::input(shaper, 0))?;

        #[cfg(feature = "tracing")]
        tracing::debug!("unit_new: GreaterThanZero boost={boost} shaper={shaper}");
        Ok(Self {
            parts,
            boost,
            shaper,
        })
    }

    fn check(&self) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Err(UnitError::Disposed(self.name()));
        }
        Ok(())
    }
}

impl Unit for GreaterThanZero {
    fn name(&self) -> &'static str {
        "GreaterThanZero"
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
            0 => Ok(Inlet::input(self.boost, 0)),
            _ => Err(port_error(self.name(), index)),
        }
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Outlet::of(self.shaper)),
            _ => Err(port_error(self.name(), index)),
        }
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        if self.parts.release(graph) {
            #[cfg(feature = "tracing")]
            tracing::debug!("unit_dispose: GreaterThanZero");
        }
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}

impl ParamSource for GreaterThanZero {}

/// Outputs 1 while input 0 is strictly greater than the threshold, else 0.
///
/// The threshold is the static `value` unless a signal is connected to
/// input 1. That input aliases the threshold parameter itself, so under the
/// connection discipline a connected signal replaces the static value.
#[derive(Debug)]
pub struct GreaterThan {
    parts: Parts,
    threshold: NodeId,
    subtract: NodeId,
    gtz: GreaterThanZero,
}

impl GreaterThan {
    /// Builds the comparator in `graph`.
    pub fn new(graph: &mut Graph, options: GreaterThanOptions) -> Result<Self, UnitError> {
        let mut parts = Parts::new();
        let threshold =
            parts.own(graph.add_constant_param(Param::unbounded("threshold", options.value)));
        let subtract = parts.own(graph.add_subtract());
        let gtz = GreaterThanZero::new(graph)?;

        parts.connect(graph, Outlet::of(threshold), Inlet::input(subtract, 1))?;
        parts.connect(graph, Outlet::of(subtract), gtz.input(0)?)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("unit_new: GreaterThan value={}", options.value);
        Ok(Self {
            parts,
            threshold,
            subtract,
            gtz,
        })
    }

    /// Static threshold.
    pub fn value(&self, graph: &Graph) -> Result<f32, UnitError> {
        self.check()?;
        Ok(graph.param_value(ParamId::value(self.threshold))?)
    }

    /// Sets the static threshold.
    ///
    /// If a signal drives input 1 this value is added to it.
    pub fn set_value(&self, graph: &mut Graph, value: f32) -> Result<(), UnitError> {
        self.check()?;
        Ok(graph.set_param(ParamId::value(self.threshold), value)?)
    }

    fn check(&self) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Err(UnitError::Disposed(self.name()));
        }
        Ok(())
    }
}

impl Unit for GreaterThan {
    fn name(&self) -> &'static str {
        "GreaterThan"
    }

    fn inputs(&self) -> usize {
        2
    }

    fn outputs(&self) -> usize {
        1
    }

    fn input(&self, index: usize) -> Result<Inlet, UnitError> {
        self.check()?;
        match index {
            0 => Ok(Inlet::input(self.subtract, 0)),
            1 => Ok(Inlet::Param(ParamId::value(self.threshold))),
            _ => Err(port_error(self.name(), index)),
        }
    }

    fn output(&self, index: usize) -> Result<Outlet, UnitError> {
        self.check()?;
        match index {
            0 => self.gtz.output(0),
            _ => Err(port_error(self.name(), index)),
        }
    }

    fn dispose(&mut self, graph: &mut Graph) -> Result<(), UnitError> {
        if self.parts.is_released() {
            return Ok(());
        }
        self.parts.release(graph);
        self.gtz.dispose(graph)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("unit_dispose: GreaterThan");
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.parts.is_released()
    }
}

impl ParamSource for GreaterThan {}
