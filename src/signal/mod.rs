//! The SignalExpr Evaluator: a per-frame scalar DAG interpreter.
//!
//! [`SignalEvaluator`] owns the two pieces of state that outlive a single
//! `eval` call — the memoization cache and the stateful-operator state
//! slab — and exposes one entry point, [`SignalEvaluator::eval`], mirroring
//! `fuel-vm`'s `Interpreter` owning its registers/memory across `execute`
//! calls.

pub mod dispatch;
pub mod env;
pub mod stateful;
pub mod trace;

use crate::error::EvalError;
use crate::frame_cache::FrameCache;
use crate::ids::SigExprId;
use crate::state_buffer::StateBuffer;

pub use env::{OwnedSignalEnv, SignalEnv};
#[cfg(feature = "trace")]
pub use trace::{CountingSignalTrace, SignalTrace, SignalTraceEvent, TransformStepTrace};

/// Evaluates signal-node DAGs against an externally supplied [`SignalEnv`].
///
/// One instance per independent signal graph (one per node-graph document,
/// typically). `new_frame` must be called once per rendered frame before any
/// `eval` call that frame.
pub struct SignalEvaluator {
    cache: FrameCache,
    state: StateBuffer,
    #[cfg(feature = "trace")]
    trace: Option<Box<dyn SignalTrace>>,
}

impl SignalEvaluator {
    /// Build an evaluator sized for `node_capacity` signal nodes and a state
    /// slab of the given per-arena sizes (typically derived from compiling
    /// the graph and summing each stateful node's slab width).
    pub fn new(node_capacity: usize, state_f64_len: usize, state_f32_len: usize, state_i32_len: usize) -> Self {
        Self {
            cache: FrameCache::create(node_capacity),
            state: StateBuffer::new(state_f64_len, state_f32_len, state_i32_len),
            #[cfg(feature = "trace")]
            trace: None,
        }
    }

    /// Advance the frame-cache stamp. No cached value is cleared; only
    /// `is_cached` comparisons against the new `frame_id` change.
    pub fn new_frame(&mut self, frame_id: u32) {
        self.cache.new_frame(frame_id);
    }

    /// Zero every stateful operator's state slab. Intended for an explicit
    /// "reset the animation" host action, not normal per-frame use.
    pub fn reset_state(&mut self) {
        self.state.reset();
    }

    /// Attach (or detach, with `None`) a debug-trace sink. Carries zero
    /// per-emission-site cost beyond the `Option` check when absent.
    #[cfg(feature = "trace")]
    pub fn set_trace(&mut self, trace: Option<Box<dyn SignalTrace>>) {
        self.trace = trace;
    }

    /// Evaluate `root` against `env`, using (and populating) this
    /// evaluator's frame cache and state buffer.
    pub fn eval(&mut self, root: SigExprId, env: &dyn SignalEnv) -> Result<f64, EvalError> {
        dispatch::eval_node(
            root,
            env,
            &mut self.cache,
            &mut self.state,
            #[cfg(feature = "trace")]
            &mut self.trace,
        )
    }

    /// The cache's current frame id, mostly useful for tests.
    pub fn frame_id(&self) -> u32 {
        self.cache.frame_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::CombineMode;
    use crate::const_pool::ConstPool;
    use crate::context::{MapSlotValues, RuntimeContext};
    use crate::ids::ConstId;
    use crate::ir::{SignalNode, SignalNodes};
    use crate::transform::TransformTable;

    fn env(nodes: Vec<SignalNode>, ctx: RuntimeContext) -> OwnedSignalEnv<MapSlotValues> {
        OwnedSignalEnv {
            nodes: SignalNodes(nodes),
            const_pool: ConstPool::new(vec![1.0]),
            transform_table: TransformTable::new(vec![]),
            #[cfg(feature = "legacy-closures")]
            closures: crate::closure::ClosureRegistry::new(),
            slots: MapSlotValues::new(),
            context: ctx,
        }
    }

    #[test]
    fn stateful_integrate_persists_across_frames() {
        let nodes = vec![
            SignalNode::Const(ConstId(0)),
            SignalNode::Stateful(crate::ir::StatefulNode::Integrate {
                input: SigExprId(0),
                state_offset: 0,
            }),
        ];
        let ctx = RuntimeContext {
            t_abs_ms: 0.0,
            t_model_ms: None,
            phase01: None,
            wrap_occurred: false,
            delta_sec: 1.0,
            frame_index: 0,
        };
        let env = env(nodes, ctx);
        let mut evaluator = SignalEvaluator::new(2, 1, 0, 0);

        let first = evaluator.eval(SigExprId(1), &env).unwrap();
        evaluator.new_frame(2);
        let second = evaluator.eval(SigExprId(1), &env).unwrap();

        assert_eq!(first, 1.0);
        assert_eq!(second, 2.0, "state accumulates across frames");
    }

    #[test]
    fn same_frame_reeval_hits_cache_not_state() {
        // Re-evaluating the same root within one frame must return the
        // cached value rather than re-running the stateful step twice.
        let nodes = vec![
            SignalNode::Const(ConstId(0)),
            SignalNode::Stateful(crate::ir::StatefulNode::Integrate {
                input: SigExprId(0),
                state_offset: 0,
            }),
        ];
        let ctx = RuntimeContext {
            t_abs_ms: 0.0,
            t_model_ms: None,
            phase01: None,
            wrap_occurred: false,
            delta_sec: 1.0,
            frame_index: 0,
        };
        let env = env(nodes, ctx);
        let mut evaluator = SignalEvaluator::new(2, 1, 0, 0);

        let a = evaluator.eval(SigExprId(1), &env).unwrap();
        let b = evaluator.eval(SigExprId(1), &env).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bus_combine_with_two_terms() {
        let nodes = vec![
            SignalNode::Const(ConstId(0)),
            SignalNode::Const(ConstId(0)),
            SignalNode::BusCombine {
                bus_index: 0,
                terms: vec![SigExprId(0), SigExprId(1)],
                mode: CombineMode::Sum,
                default: None,
            },
        ];
        let ctx = RuntimeContext {
            t_abs_ms: 0.0,
            t_model_ms: None,
            phase01: None,
            wrap_occurred: false,
            delta_sec: 0.0,
            frame_index: 0,
        };
        let env = env(nodes, ctx);
        let mut evaluator = SignalEvaluator::new(3, 0, 0, 0);
        assert_eq!(evaluator.eval(SigExprId(2), &env).unwrap(), 2.0);
    }
}
