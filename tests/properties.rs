//! Property-based tests for the laws in `spec.md §8` that are naturally
//! quantified over arbitrary inputs. Scenario-shaped laws live in
//! `tests/signal_eval.rs`/`tests/field_materialize.rs`/`tests/buffer_pool.rs`
//! instead.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use sigfield_core::combine::CombineMode;
use sigfield_core::const_pool::ConstPool;
use sigfield_core::context::{MapSlotValues, RuntimeContext};
use sigfield_core::field::BufferFormat;
use sigfield_core::ids::{ChainId, ConstId, SigExprId};
use sigfield_core::ir::{SignalNode, SignalNodes, StatefulNode};
use sigfield_core::opcode::BinaryOp;
use sigfield_core::signal::{OwnedSignalEnv, SignalEvaluator};
use sigfield_core::transform::{NormalizeMode, TransformChain, TransformStep, TransformTable};

fn ctx(delta_sec: f64) -> RuntimeContext {
    RuntimeContext {
        t_abs_ms: 0.0,
        t_model_ms: None,
        phase01: None,
        wrap_occurred: false,
        delta_sec,
        frame_index: 0,
    }
}

fn env(nodes: Vec<SignalNode>, consts: Vec<f64>, chains: Vec<TransformChain>, delta_sec: f64) -> OwnedSignalEnv<MapSlotValues> {
    OwnedSignalEnv {
        nodes: SignalNodes(nodes),
        const_pool: ConstPool::new(consts),
        transform_table: TransformTable::new(chains),
        #[cfg(feature = "legacy-closures")]
        closures: sigfield_core::closure::ClosureRegistry::new(),
        slots: MapSlotValues::new(),
        context: ctx(delta_sec),
    }
}

/// Law 5: every binary-div form returns `0` on a zero divisor, for any
/// finite dividend.
#[quickcheck]
fn law5_div_by_zero_is_zero(dividend: i32) -> bool {
    let a = dividend as f64;
    BinaryOp::Div.apply(a, 0.0) == 0.0 && BinaryOp::Mod.apply(a, 0.0) == 0.0
}

/// Law 6: sum/average over a non-empty finite vector satisfy `sum / n ==
/// average`; min is <= every element; max is >= every element; first/last
/// match the vector's endpoints.
#[quickcheck]
fn law6_combine_laws_over_arbitrary_vectors(xs: Vec<i32>) -> TestResult {
    if xs.is_empty() {
        return TestResult::discard();
    }
    let values: Vec<f64> = xs.iter().map(|&x| x as f64).collect();

    let sum = CombineMode::Sum.combine_scalar(&values).unwrap();
    let average = CombineMode::Average.combine_scalar(&values).unwrap();
    let mean = sum / values.len() as f64;
    if (average - mean).abs() > 1e-9 {
        return TestResult::failed();
    }

    let min = CombineMode::Min.combine_scalar(&values).unwrap();
    let max = CombineMode::Max.combine_scalar(&values).unwrap();
    if !values.iter().all(|&v| min <= v) || !values.iter().all(|&v| max >= v) {
        return TestResult::failed();
    }

    let first = CombineMode::First.combine_scalar(&values).unwrap();
    let last = CombineMode::Last.combine_scalar(&values).unwrap();
    TestResult::from_bool(first == values[0] && last == values[values.len() - 1])
}

/// Law 6 (field side): the elementwise product combine matches a manual
/// fold, for any non-empty finite vector.
#[quickcheck]
fn law6_field_product_matches_manual_fold(xs: Vec<i16>) -> TestResult {
    if xs.is_empty() || xs.len() > 8 {
        return TestResult::discard();
    }
    let values: Vec<f64> = xs.iter().map(|&x| x as f64).collect();
    let expected: f64 = values.iter().product();
    let actual = CombineMode::Product.combine_field_element(values.into_iter()).unwrap();
    TestResult::from_bool((actual - expected).abs() < 1e-6 || (actual.is_nan() && expected.is_nan()))
}

/// Law 7: a compiled transform chain equals sequential application of its
/// steps; an empty chain is the identity.
#[quickcheck]
fn law7_transform_chain_equals_sequential_application(x: i32, scale: i8, bias: i8, quant_step: i8) -> bool {
    let x = x as f64;
    let scale = scale as f64;
    let bias = bias as f64;
    let quant_step = (quant_step as f64).abs();

    let steps = vec![
        TransformStep::ScaleBias { scale, bias },
        TransformStep::Quantize { step: quant_step },
        TransformStep::Normalize {
            mode: NormalizeMode::NegOneToOne,
        },
    ];
    let expected = {
        let mut v = x;
        v = sigfield_core::transform::scale_bias_step(scale, bias, v);
        v = sigfield_core::transform::quantize_step(quant_step, v);
        sigfield_core::transform::normalize_step(NormalizeMode::NegOneToOne, v)
    };

    let nodes = vec![
        SignalNode::Const(ConstId(0)),
        SignalNode::Transform {
            src: SigExprId(0),
            chain_id: ChainId(0),
        },
    ];
    let env = env(nodes, vec![x], vec![TransformChain { steps }], 0.0);
    let mut evaluator = SignalEvaluator::new(2, 0, 0, 0);
    let actual = evaluator.eval(SigExprId(1), &env).unwrap();

    (actual - expected).abs() < 1e-9
}

/// Law 7 (empty chain): an empty transform chain is the identity function.
#[quickcheck]
fn law7_empty_chain_is_identity(x: i32) -> bool {
    let x = x as f64;
    let nodes = vec![
        SignalNode::Const(ConstId(0)),
        SignalNode::Transform {
            src: SigExprId(0),
            chain_id: ChainId(0),
        },
    ];
    let env = env(nodes, vec![x], vec![TransformChain::default()], 0.0);
    let mut evaluator = SignalEvaluator::new(2, 0, 0, 0);
    evaluator.eval(SigExprId(1), &env).unwrap() == x
}

/// Law 8: `integrate` with a constant input accumulates to
/// `frames * deltaSec` within `1e-5`, for any reasonable frame count and
/// time step.
#[quickcheck]
fn law8_stateful_integrate_persists(frames: u8, delta_milli: u16) -> TestResult {
    let frames = (frames % 60) as u32 + 1;
    let delta_sec = (delta_milli % 1000) as f64 / 1000.0;
    if delta_sec == 0.0 {
        return TestResult::discard();
    }

    let nodes = vec![
        SignalNode::Const(ConstId(0)),
        SignalNode::Stateful(StatefulNode::Integrate {
            input: SigExprId(0),
            state_offset: 0,
        }),
    ];
    let env = env(nodes, vec![1.0], vec![], delta_sec);
    let mut evaluator = SignalEvaluator::new(2, 1, 0, 0);

    let mut last = 0.0;
    for frame in 1..=frames {
        evaluator.new_frame(frame);
        last = evaluator.eval(SigExprId(1), &env).unwrap();
    }
    let expected = frames as f64 * delta_sec;
    TestResult::from_bool((last - expected).abs() < 1e-5)
}

/// Law 11: buffer layouts scale by stride: vec2 = 2N, vec3 = 3N, vec4/quat =
/// 4N, mat4 = 16N, rgba8 byte length = 4N, for any element count.
#[quickcheck]
fn law11_layout_invariants(n: u16) -> bool {
    let n = n as usize % 512;
    BufferFormat::Vec2F32.stride() * n == 2 * n
        && BufferFormat::Vec3F32.stride() * n == 3 * n
        && BufferFormat::Vec4F32.stride() * n == 4 * n
        && BufferFormat::QuatF32.stride() * n == 4 * n
        && BufferFormat::Mat4F32.stride() * n == 16 * n
        && BufferFormat::Rgba8.stride() * n == 4 * n
}
