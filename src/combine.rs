//! Bus-aggregation combine modes shared between the scalar `busCombine` node
//! and the field-level `Combine` handle.
//!
//! `product` is field-only and `first` is signal-only (`spec.md §4.1`/§4.2`);
//! rather than two near-identical enums, both call sites share one
//! [`CombineMode`] and reject the mode that doesn't apply to them with
//! [`crate::error::EvalError::UnknownCombineMode`] /
//! [`crate::error::MaterializeError::UnknownFieldOp`]. No IR-validation pass
//! rejects the wrong mode for a node's side ahead of time, so both rejections
//! happen right here, at the point a mismatched mode is actually used.

use strum::EnumString;

use crate::error::{EvalError, MaterializeError};

/// A bus/field aggregation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombineMode {
    Sum,
    Average,
    Min,
    Max,
    /// Signal-only: the first evaluated term.
    First,
    Last,
    /// Field-only: the elementwise product.
    Product,
}

impl CombineMode {
    /// Combine an already-evaluated, non-empty vector of scalar term
    /// values. Used by the signal evaluator's `busCombine` node.
    ///
    /// Panics if `values` is empty — the dispatch code special-cases
    /// 0/1-term buses before calling this, so an empty slice here is a
    /// caller bug, not reachable from IR data. `Product` is field-only and
    /// is rejected as a data error instead, since nothing gates a
    /// `BusCombine` node's `mode` field before it reaches this function.
    pub fn combine_scalar(self, values: &[f64]) -> Result<f64, EvalError> {
        assert!(!values.is_empty(), "combine_scalar called with no terms");
        Ok(match self {
            CombineMode::Sum => values.iter().sum(),
            CombineMode::Average => values.iter().sum::<f64>() / values.len() as f64,
            CombineMode::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            CombineMode::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CombineMode::First => values[0],
            CombineMode::Last => values[values.len() - 1],
            CombineMode::Product => return Err(EvalError::UnknownCombineMode(format!("{self:?}"))),
        })
    }

    /// Combine one element position across a non-empty vector of
    /// already-materialized field term slices. Used by the field
    /// materializer's `Combine` handle, one call per output element.
    ///
    /// `First` is signal-only and is rejected as a data error, since
    /// nothing gates a field `Combine` node's `mode` field before it
    /// reaches this function.
    pub fn combine_field_element<I: Iterator<Item = f64>>(self, mut values: I) -> Result<f64, MaterializeError> {
        Ok(match self {
            CombineMode::Sum => values.sum(),
            CombineMode::Average => {
                let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if n == 0 {
                    0.0
                } else {
                    sum / n as f64
                }
            }
            CombineMode::Min => values.fold(f64::INFINITY, f64::min),
            CombineMode::Max => values.fold(f64::NEG_INFINITY, f64::max),
            CombineMode::Last => values.last().unwrap_or(0.0),
            CombineMode::Product => values.product(),
            CombineMode::First => return Err(MaterializeError::UnknownFieldOp(format!("{self:?}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_average_mean_law() {
        let v = [10.0, 20.0, 30.0];
        let avg = CombineMode::Average.combine_scalar(&v).unwrap();
        assert_eq!(avg, 20.0);
        let mean = CombineMode::Sum.combine_scalar(&v).unwrap() / v.len() as f64;
        assert_eq!(avg, mean);
    }

    #[test]
    fn min_max_bounds() {
        let v = [5.0, -3.0, 10.0, 2.0];
        let min = CombineMode::Min.combine_scalar(&v).unwrap();
        let max = CombineMode::Max.combine_scalar(&v).unwrap();
        assert!(v.iter().all(|&x| min <= x));
        assert!(v.iter().all(|&x| max >= x));
    }

    #[test]
    fn first_last() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(CombineMode::First.combine_scalar(&v).unwrap(), 1.0);
        assert_eq!(CombineMode::Last.combine_scalar(&v).unwrap(), 3.0);
    }

    #[test]
    fn field_product() {
        let v = [2.0, 3.0, 4.0];
        assert_eq!(CombineMode::Product.combine_field_element(v.into_iter()).unwrap(), 24.0);
    }

    #[test]
    fn product_is_rejected_on_the_signal_side() {
        let v = [1.0, 2.0];
        assert_eq!(
            CombineMode::Product.combine_scalar(&v),
            Err(EvalError::UnknownCombineMode("Product".to_string()))
        );
    }

    #[test]
    fn first_is_rejected_on_the_field_side() {
        let v = [1.0, 2.0];
        assert_eq!(
            CombineMode::First.combine_field_element(v.into_iter()),
            Err(MaterializeError::UnknownFieldOp("First".to_string()))
        );
    }
}
