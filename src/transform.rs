//! Pre-compiled sequences of scalar post-processing steps applied in
//! pipeline order.

use crate::easing::EasingCurve;
use crate::error::EvalError;
use crate::ids::ChainId;
use crate::opcode::UnaryOp;

/// One step of a transform chain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformStep {
    /// `y = x·scale + bias`.
    ScaleBias { scale: f64, bias: f64 },
    /// Clamp to `[0, 1]` or `[−1, 1]`.
    Normalize { mode: NormalizeMode },
    /// `round(x/step)·step`.
    Quantize { step: f64 },
    /// Clamp input to `[0, 1]`, then look up an easing curve.
    Ease { curve_id: u32 },
    /// Apply a unary opcode.
    Map { op: UnaryOp },
    /// Same state machine as the `slew` stateful operator, using the given
    /// state offset.
    Slew { rate: f64, state_offset: usize },
    /// Reserved placeholder; always errors.
    Cast,
}

/// [`TransformStep::Normalize`] clamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalizeMode {
    ZeroToOne,
    NegOneToOne,
}

impl NormalizeMode {
    fn apply(self, x: f64) -> f64 {
        match self {
            NormalizeMode::ZeroToOne => x.max(0.0).min(1.0),
            NormalizeMode::NegOneToOne => x.max(-1.0).min(1.0),
        }
    }
}

/// A compiled pipeline of steps, applied in order. An empty chain is the
/// identity function.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformChain {
    pub steps: Vec<TransformStep>,
}

/// Table of compiled transform chains, addressed by [`ChainId`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformTable {
    chains: Vec<TransformChain>,
}

impl TransformTable {
    /// Build a table from a vector of chains, indexed by position.
    pub fn new(chains: Vec<TransformChain>) -> Self {
        Self { chains }
    }

    /// Look up a chain by id.
    pub fn get(&self, id: ChainId) -> Result<&TransformChain, EvalError> {
        self.chains.get(id.index()).ok_or(EvalError::InvalidChainId(id.get()))
    }
}

/// What a single step needs from the stateful `slew` state slab. Kept
/// separate from `crate::signal::stateful` so the transform table can apply
/// `Slew` steps without depending on the full stateful-op dispatch.
pub fn slew_step(current: f64, target: f64, rate: f64, delta_sec: f64) -> f64 {
    let alpha = 1.0 - (-rate * delta_sec).exp();
    current + (target - current) * alpha
}

/// Apply a clamp-then-ease step.
pub fn ease_step(curve_id: u32, x: f64) -> Result<f64, EvalError> {
    Ok(EasingCurve::from_id(curve_id)?.eval(x))
}

/// Apply `quantize`.
pub fn quantize_step(step: f64, x: f64) -> f64 {
    if step == 0.0 {
        x
    } else {
        (x / step).round() * step
    }
}

/// Apply `scaleBias`.
pub fn scale_bias_step(scale: f64, bias: f64, x: f64) -> f64 {
    x * scale + bias
}

/// Apply `normalize`.
pub fn normalize_step(mode: NormalizeMode, x: f64) -> f64 {
    mode.apply(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_is_identity_by_construction() {
        let chain = TransformChain::default();
        assert!(chain.steps.is_empty());
    }

    #[test]
    fn quantize_rounds_to_nearest_step() {
        assert_eq!(quantize_step(0.25, 0.6), 0.5);
        assert_eq!(quantize_step(0.25, 0.4), 0.5);
    }

    #[test]
    fn scale_bias_is_affine() {
        assert_eq!(scale_bias_step(2.0, 1.0, 3.0), 7.0);
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(normalize_step(NormalizeMode::ZeroToOne, -1.0), 0.0);
        assert_eq!(normalize_step(NormalizeMode::NegOneToOne, -5.0), -1.0);
    }

    #[test]
    fn chain_id_out_of_range_errors() {
        let table = TransformTable::new(vec![TransformChain::default()]);
        assert_eq!(table.get(ChainId(1)), Err(EvalError::InvalidChainId(1)));
    }
}
