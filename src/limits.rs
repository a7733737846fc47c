//! Capacity configuration supplied at construction time, mirroring how
//! `fuel-vm`'s `Interpreter` takes a `ConsensusParameters` value up front
//! rather than reading global/env config (`src/interpreter.rs`).

use crate::field::FieldMaterializer;
use crate::signal::SignalEvaluator;

/// Buffer-pool growth policy: whether [`FieldMaterializer`] starts with an
/// empty pool (allocating lazily on first miss) or pre-warms a number of
/// buffers per `(format, elementCount)` bucket up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferPoolGrowth {
    /// Allocate only on a pool miss; the default.
    OnDemand,
    /// Unused today — reserved for a future pre-warming pass; the buffer
    /// pool has no bucket list to pre-warm until the first request names
    /// one, so this is currently equivalent to `OnDemand`.
    Preallocated { buffers_per_bucket: usize },
}

/// Capacities the caller (a block compiler or host application) derives
/// from the compiled IR and passes in at construction, per `spec.md §6`:
/// "the caller supplies sizes derived from the compiled IR."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Number of signal nodes in the IR's node array; sizes the frame
    /// cache.
    pub node_capacity: usize,
    /// `f64`-arena state-buffer cell count (summed stateful-node slab
    /// widths for `integrate`/`slewRate`/envelope state, etc.).
    pub state_f64_len: usize,
    /// `f32`-arena state-buffer cell count.
    pub state_f32_len: usize,
    /// `i32`-arena state-buffer cell count (delay-line write cursors,
    /// pulse-divider counters).
    pub state_i32_len: usize,
    /// Buffer-pool growth policy.
    pub buffer_pool_growth: BufferPoolGrowth,
}

impl EngineLimits {
    /// Sizes derived from a compiled graph with no stateful operators.
    pub const fn stateless(node_capacity: usize) -> Self {
        Self {
            node_capacity,
            state_f64_len: 0,
            state_f32_len: 0,
            state_i32_len: 0,
            buffer_pool_growth: BufferPoolGrowth::OnDemand,
        }
    }

    /// Build a [`SignalEvaluator`] sized per these limits.
    pub fn build_signal_evaluator(&self) -> SignalEvaluator {
        SignalEvaluator::new(self.node_capacity, self.state_f64_len, self.state_f32_len, self.state_i32_len)
    }

    /// Build a [`FieldMaterializer`]. The buffer pool starts empty
    /// regardless of `buffer_pool_growth` until pre-warming is implemented
    /// (see [`BufferPoolGrowth::Preallocated`]'s doc comment).
    pub fn build_field_materializer(&self) -> FieldMaterializer {
        FieldMaterializer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stateless_limits_zero_every_state_arena() {
        let limits = EngineLimits::stateless(16);
        assert_eq!(limits.node_capacity, 16);
        assert_eq!(limits.state_f64_len, 0);
        let evaluator = limits.build_signal_evaluator();
        assert_eq!(evaluator.frame_id(), 1);
    }
}
