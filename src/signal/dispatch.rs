//! Cache-first recursive evaluation over [`SignalNode`]s.
//!
//! One function, [`eval_node`], drives the whole signal graph: check the
//! frame cache, dispatch on the node's tag, recurse into sub-expressions
//! depth-first/left-to-right, write the cache only on a miss. `select` is
//! the one place recursion is *not* unconditional — the untaken branch is
//! never evaluated, so it can never enter the cache (`spec.md §4.1`).

use crate::combine::CombineMode;
use crate::consts::BOOL_THRESHOLD;
use crate::context::RuntimeContext;
use crate::error::EvalError;
use crate::frame_cache::FrameCache;
use crate::ids::SigExprId;
use crate::ir::{SignalNode, StatefulNode};
use crate::signal::env::SignalEnv;
#[cfg(feature = "trace")]
use crate::signal::trace::{SignalTrace, SignalTraceEvent, TransformStepTrace};
use crate::signal::stateful;
use crate::state_buffer::StateBuffer;
use crate::transform::TransformStep;

/// Evaluate `id`, consulting/populating `cache` and `state` as needed.
///
/// `trace` is a short-lived borrow of the evaluator's optional sink, threaded
/// through explicitly rather than stored on the node so this function stays
/// a free recursive helper with no `self`.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(level = "trace", name = "eval_node", skip_all, fields(node = id.get()))]
pub fn eval_node(
    id: SigExprId,
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    let idx = id.index();
    if cache.is_cached(idx) {
        tracing::trace!("cache hit");
        return Ok(cache.get_cached(idx));
    }

    let node = env
        .nodes()
        .get(id)
        .ok_or(EvalError::InvalidNodeId(id.get()))?
        .clone();

    let value = dispatch(
        id,
        &node,
        env,
        cache,
        state,
        #[cfg(feature = "trace")]
        trace,
    )?;

    cache.set_cached(idx, value);
    Ok(value)
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    id: SigExprId,
    node: &SignalNode,
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    let ctx = env.context();
    match node {
        SignalNode::Const(const_id) => env.const_pool().number(*const_id),

        SignalNode::TimeAbsMs => Ok(ctx.t_abs_ms),
        SignalNode::TimeModelMs => Ok(ctx.time_model_ms()),
        SignalNode::Phase01 => Ok(ctx.phase()),
        SignalNode::WrapEvent => Ok(ctx.wrap_event()),

        SignalNode::InputSlot { slot } => Ok(env.slot_values().read_number(*slot)),

        SignalNode::Map { src, op } => {
            let x = eval_node(
                *src,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(op.apply(x))
        }

        SignalNode::Zip { a, b, op } => {
            let av = eval_node(
                *a,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let bv = eval_node(
                *b,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(op.apply(av, bv))
        }

        SignalNode::Select { cond, t, f } => {
            let c = eval_node(
                *cond,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let branch = if c > BOOL_THRESHOLD { *t } else { *f };
            eval_node(
                branch,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )
        }

        SignalNode::BusCombine {
            bus_index,
            terms,
            mode,
            default,
        } => eval_bus_combine(
            id,
            *bus_index,
            terms,
            *mode,
            *default,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        ),

        SignalNode::Transform { src, chain_id } => eval_transform(
            id,
            *src,
            *chain_id,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        ),

        SignalNode::Stateful(stateful_node) => eval_stateful(
            *stateful_node,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        ),

        #[cfg(feature = "legacy-closures")]
        SignalNode::ClosureBridge { closure_id, input_slots } => eval_closure_bridge(
            id,
            closure_id,
            input_slots,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        ),

        #[cfg(feature = "legacy-closures")]
        SignalNode::Closure(callable) => {
            let legacy_ctx = crate::context::LegacyContext::from(ctx);
            Ok(callable.call(ctx.t_abs_ms, legacy_ctx))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn eval_bus_combine(
    node_id: SigExprId,
    bus_index: u32,
    terms: &[SigExprId],
    mode: CombineMode,
    default: Option<f64>,
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    if terms.is_empty() {
        return Ok(default.unwrap_or(0.0));
    }

    if terms.len() == 1 {
        return eval_node(
            terms[0],
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        );
    }

    let mut values = Vec::with_capacity(terms.len());
    for term in terms {
        values.push(eval_node(
            *term,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        )?);
    }
    let result = mode.combine_scalar(&values)?;

    #[cfg(feature = "trace")]
    if let Some(sink) = trace {
        sink.on_event(SignalTraceEvent::BusCombine {
            node: node_id,
            bus_index,
            term_values: values,
            result,
        });
    }
    #[cfg(not(feature = "trace"))]
    let _ = (node_id, bus_index);

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn eval_transform(
    node_id: SigExprId,
    src: SigExprId,
    chain_id: crate::ids::ChainId,
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    let input = eval_node(
        src,
        env,
        cache,
        state,
        #[cfg(feature = "trace")]
        trace,
    )?;

    let chain = env.transform_table().get(chain_id)?;
    let ctx = env.context();

    #[cfg(feature = "trace")]
    let mut step_traces = Vec::with_capacity(chain.steps.len());

    let mut x = input;
    for (step_index, step) in chain.steps.iter().enumerate() {
        let step_input = x;
        x = match step {
            TransformStep::ScaleBias { scale, bias } => crate::transform::scale_bias_step(*scale, *bias, x),
            TransformStep::Normalize { mode } => crate::transform::normalize_step(*mode, x),
            TransformStep::Quantize { step } => crate::transform::quantize_step(*step, x),
            TransformStep::Ease { curve_id } => crate::transform::ease_step(*curve_id, x)?,
            TransformStep::Map { op } => op.apply(x),
            TransformStep::Slew { rate, state_offset } => {
                stateful::slew(state, *state_offset, x, Some(*rate), ctx)
            }
            TransformStep::Cast => return Err(EvalError::UnsupportedStepKind),
        };

        #[cfg(feature = "trace")]
        step_traces.push(TransformStepTrace {
            step_index,
            input: step_input,
            output: x,
        });
        #[cfg(not(feature = "trace"))]
        let _ = step_input;
    }

    #[cfg(feature = "trace")]
    if let Some(sink) = trace {
        sink.on_event(SignalTraceEvent::Transform {
            node: node_id,
            input,
            output: x,
            steps: step_traces,
        });
    }
    #[cfg(not(feature = "trace"))]
    let _ = node_id;

    Ok(x)
}

#[allow(clippy::too_many_arguments)]
fn eval_stateful(
    node: StatefulNode,
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    let ctx = env.context();
    match node {
        StatefulNode::Integrate { input, state_offset } => {
            let x = eval_node(
                input,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::integrate(state, state_offset, x, ctx))
        }
        StatefulNode::SampleHold {
            input,
            trigger,
            state_offset,
        } => {
            let x = eval_node(
                input,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let t = eval_node(
                trigger,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::sample_hold(state, state_offset, x, t))
        }
        StatefulNode::Slew {
            input,
            rate,
            state_offset,
        } => {
            let x = eval_node(
                input,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::slew(state, state_offset, x, rate, ctx))
        }
        StatefulNode::DelayMs {
            input,
            delay_ms,
            buffer_size,
            state_offset,
        } => {
            let x = eval_node(
                input,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::delay_ms(state, state_offset, x, delay_ms, buffer_size, ctx))
        }
        StatefulNode::DelayFrames {
            input,
            delay_frames,
            state_offset,
        } => {
            let x = eval_node(
                input,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::delay_frames(state, state_offset, x, delay_frames))
        }
        StatefulNode::EdgeDetectWrap { state_offset } => Ok(stateful::edge_detect_wrap(state, state_offset, ctx)),
        StatefulNode::PulseDivider { divisions, state_offset } => {
            Ok(stateful::pulse_divider(state, state_offset, divisions, ctx))
        }
        StatefulNode::EnvelopeAD {
            trigger,
            attack_ms,
            decay_ms,
            peak,
            state_offset,
        } => {
            let t = eval_node(
                trigger,
                env,
                cache,
                state,
                #[cfg(feature = "trace")]
                trace,
            )?;
            Ok(stateful::envelope_ad(state, state_offset, t, attack_ms, decay_ms, peak, ctx))
        }
    }
}

#[cfg(feature = "legacy-closures")]
#[allow(clippy::too_many_arguments)]
fn eval_closure_bridge(
    node_id: SigExprId,
    closure_id: &str,
    input_slots: &[SigExprId],
    env: &dyn SignalEnv,
    cache: &mut FrameCache,
    state: &mut StateBuffer,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn SignalTrace>>,
) -> Result<f64, EvalError> {
    // Pre-evaluate every input slot before invoking, per the bridge's
    // contract: the legacy callable never sees partially-evaluated state.
    for slot in input_slots {
        eval_node(
            *slot,
            env,
            cache,
            state,
            #[cfg(feature = "trace")]
            trace,
        )?;
    }

    let callable = env
        .closures()
        .get(closure_id)
        .ok_or_else(|| EvalError::MissingClosure(closure_id.to_string()))?
        .clone();

    let ctx = env.context();
    let legacy_ctx = crate::context::LegacyContext::from(ctx);

    #[cfg(feature = "trace")]
    let started = std::time::Instant::now();
    let result = callable.call(ctx.t_abs_ms, legacy_ctx);

    #[cfg(feature = "trace")]
    if let Some(sink) = trace {
        sink.on_event(SignalTraceEvent::ClosureBridge {
            node: node_id,
            closure_id: closure_id.to_string(),
            result,
            duration: Some(started.elapsed()),
        });
    }
    #[cfg(not(feature = "trace"))]
    let _ = node_id;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::const_pool::ConstPool;
    use crate::context::MapSlotValues;
    use crate::ir::SignalNodes;
    use crate::signal::env::OwnedSignalEnv;
    use crate::transform::TransformTable;

    fn ctx() -> RuntimeContext {
        RuntimeContext {
            t_abs_ms: 1000.0,
            t_model_ms: None,
            phase01: Some(0.25),
            wrap_occurred: false,
            delta_sec: 1.0 / 60.0,
            frame_index: 0,
        }
    }

    fn base_env(nodes: Vec<SignalNode>) -> OwnedSignalEnv<MapSlotValues> {
        OwnedSignalEnv {
            nodes: SignalNodes(nodes),
            const_pool: ConstPool::new(vec![2.0, 3.0]),
            transform_table: TransformTable::new(vec![]),
            #[cfg(feature = "legacy-closures")]
            closures: crate::closure::ClosureRegistry::new(),
            slots: MapSlotValues::new(),
            context: ctx(),
        }
    }

    #[test]
    fn select_never_evaluates_untaken_branch() {
        // `f` branch is an InputSlot reading a slot that isn't wired; if it
        // were ever evaluated the result would still be fine numerically,
        // so we instead assert the untaken node is never cached.
        let env = base_env(vec![
            SignalNode::Const(crate::ids::ConstId(0)), // 0: cond = 2.0 (truthy)
            SignalNode::Const(crate::ids::ConstId(1)), // 1: t = 3.0
            SignalNode::InputSlot { slot: 99 },         // 2: f = NaN slot
            SignalNode::Select {
                cond: SigExprId(0),
                t: SigExprId(1),
                f: SigExprId(2),
            },
        ]);
        let mut cache = FrameCache::create(4);
        let mut state = StateBuffer::new(0, 0, 0);
        #[cfg(feature = "trace")]
        let mut trace: Option<Box<dyn SignalTrace>> = None;

        let result = eval_node(
            SigExprId(3),
            &env,
            &mut cache,
            &mut state,
            #[cfg(feature = "trace")]
            &mut trace,
        )
        .unwrap();
        assert_eq!(result, 3.0);
        assert!(!cache.is_cached(2), "untaken branch must never be cached");
    }

    #[test]
    fn cached_node_evaluated_once() {
        let env = base_env(vec![
            SignalNode::Const(crate::ids::ConstId(0)),
            SignalNode::Map {
                src: SigExprId(0),
                op: crate::opcode::UnaryOp::Abs,
            },
            SignalNode::Zip {
                a: SigExprId(1),
                b: SigExprId(1),
                op: crate::opcode::BinaryOp::Add,
            },
        ]);
        let mut cache = FrameCache::create(3);
        let mut state = StateBuffer::new(0, 0, 0);
        #[cfg(feature = "trace")]
        let mut trace: Option<Box<dyn SignalTrace>> = None;

        let result = eval_node(
            SigExprId(2),
            &env,
            &mut cache,
            &mut state,
            #[cfg(feature = "trace")]
            &mut trace,
        )
        .unwrap();
        assert_eq!(result, 4.0);
        assert!(cache.is_cached(1));
    }

    #[test]
    fn bus_combine_empty_uses_default() {
        let env = base_env(vec![SignalNode::BusCombine {
            bus_index: 0,
            terms: vec![],
            mode: CombineMode::Sum,
            default: Some(7.0),
        }]);
        let mut cache = FrameCache::create(1);
        let mut state = StateBuffer::new(0, 0, 0);
        #[cfg(feature = "trace")]
        let mut trace: Option<Box<dyn SignalTrace>> = None;

        let result = eval_node(
            SigExprId(0),
            &env,
            &mut cache,
            &mut state,
            #[cfg(feature = "trace")]
            &mut trace,
        )
        .unwrap();
        assert_eq!(result, 7.0);
    }
}
