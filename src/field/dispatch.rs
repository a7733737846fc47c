//! Recursive `materialize` dispatch over [`FieldNode`]s.
//!
//! Mirrors [`crate::signal::dispatch`]'s shape: one entry point, cache-first,
//! dispatch on tag, recurse for sub-handles. The per-frame cache here is
//! keyed by `"<fieldId>:<domainId>:<format>"` rather than by node id alone,
//! since the same handle may be requested at more than one format.

use std::collections::HashMap;
use std::rc::Rc;

use itertools::multiunzip;

use crate::combine::CombineMode;
use crate::error::MaterializeError;
use crate::field::env::FieldEnv;
use crate::field::format::{BufferFormat, BufferView};
use crate::field::ir::{FieldNode, FieldValueType};
use crate::field::ops::{FieldOp, ParamValue, ScalarOp, Vec2Op};
use crate::field::pool::BufferPool;
#[cfg(feature = "trace")]
use crate::field::trace::{FieldTrace, FieldTraceEvent};
use crate::ids::{DomainId, FieldId};
use crate::signal::SignalEvaluator;

/// Cache entry: the format/element-count a buffer was allocated with (so it
/// can be returned to the right pool bucket) plus the buffer itself.
pub type FieldCache = HashMap<String, (BufferFormat, usize, Rc<BufferView>)>;

/// The default output format for a field handle's declared value type, used
/// when recursively materializing a sub-handle that has no explicit request
/// of its own.
pub fn default_format_for(value_type: FieldValueType) -> BufferFormat {
    match value_type {
        FieldValueType::Number | FieldValueType::Boolean => BufferFormat::F32,
        FieldValueType::Vec2 => BufferFormat::Vec2F32,
        FieldValueType::Vec3 => BufferFormat::Vec3F32,
        FieldValueType::Vec4 => BufferFormat::Vec4F32,
        FieldValueType::Quat => BufferFormat::QuatF32,
        FieldValueType::Mat4 => BufferFormat::Mat4F32,
        FieldValueType::Color => BufferFormat::Rgba8,
    }
}

/// Infer a field handle's declared value type by walking through
/// type-preserving wrapper kinds (`Op`, `Zip`, `Select`, `ZipSig`) down to a
/// kind that declares one directly.
pub fn value_type_of(field_id: FieldId, nodes: &crate::field::ir::FieldNodes) -> Result<FieldValueType, MaterializeError> {
    let node = nodes.get(field_id).ok_or(MaterializeError::InvalidFieldId(field_id.get()))?;
    match node {
        FieldNode::Const { value_type, .. } => Ok(*value_type),
        FieldNode::Broadcast { value_type, .. } => Ok(*value_type),
        FieldNode::Source { value_type, .. } => Ok(*value_type),
        FieldNode::Op { op, src } => match op {
            FieldOp::Scalar(_) => Ok(FieldValueType::Number),
            FieldOp::Vec2(_) => {
                let _ = src;
                Ok(FieldValueType::Vec2)
            }
        },
        FieldNode::Zip { a, op, .. } => {
            use crate::field::ops::FieldZipOp::*;
            match op {
                Vec2Add | Vec2Sub | Vec2Mul | Vec2Div => Ok(FieldValueType::Vec2),
                _ => value_type_of(*a, nodes),
            }
        }
        FieldNode::Select { t, .. } => value_type_of(*t, nodes),
        FieldNode::Transform { .. } => Err(MaterializeError::UnsupportedFieldKind),
        FieldNode::Combine { value_type, .. } => Ok(*value_type),
        FieldNode::MapIndexed { .. } => Ok(FieldValueType::Number),
        FieldNode::ZipSig { field, .. } => value_type_of(*field, nodes),
    }
}

fn cache_key(field_id: FieldId, domain_id: DomainId, format: BufferFormat) -> String {
    format!("{}:{}:{:?}", field_id.get(), domain_id.get(), format)
}

fn resolve_param(
    p: ParamValue,
    signal_eval: &mut SignalEvaluator,
    env: &dyn FieldEnv,
) -> Result<f64, MaterializeError> {
    match p {
        ParamValue::Literal(v) => Ok(v),
        ParamValue::Signal(id) => Ok(signal_eval.eval(id, env.signal_env())?),
    }
}

fn resolve_signals(
    ids: &[crate::ids::SigExprId],
    signal_eval: &mut SignalEvaluator,
    env: &dyn FieldEnv,
) -> Result<Vec<f64>, MaterializeError> {
    ids.iter()
        .map(|id| Ok(signal_eval.eval(*id, env.signal_env())?))
        .collect()
}

fn fill_scalar(buf: &mut BufferView, n: usize, mut f: impl FnMut(usize) -> f64) {
    match buf {
        BufferView::F32(v) => {
            for i in 0..n {
                v[i] = f(i) as f32;
            }
        }
        BufferView::F64(v) => {
            for i in 0..n {
                v[i] = f(i);
            }
        }
        BufferView::I32(v) => {
            for i in 0..n {
                v[i] = f(i) as i32;
            }
        }
        BufferView::U32(v) => {
            for i in 0..n {
                v[i] = f(i).max(0.0) as u32;
            }
        }
        BufferView::U8(v) => {
            for i in 0..n {
                v[i] = f(i).clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn fill_vec_n(buf: &mut BufferView, n: usize, stride: usize, mut f: impl FnMut(usize) -> Vec<f64>) {
    let v = buf.as_f32_mut().expect("vector buffer must be f32-backed");
    for i in 0..n {
        let components = f(i);
        for (c, value) in components.into_iter().enumerate().take(stride) {
            v[i * stride + c] = value as f32;
        }
    }
}

fn fill_color(buf: &mut BufferView, n: usize, mut f: impl FnMut(usize) -> (f64, f64, f64, f64)) {
    let v = buf.as_u8_mut().expect("color buffer must be u8-backed");
    for i in 0..n {
        let (r, g, b, a) = f(i);
        v[i * 4] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        v[i * 4 + 1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        v[i * 4 + 2] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
        v[i * 4 + 3] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

fn read_scalar(buf: &BufferView, i: usize) -> f64 {
    match buf {
        BufferView::F32(v) => v[i] as f64,
        BufferView::F64(v) => v[i],
        BufferView::I32(v) => v[i] as f64,
        BufferView::U32(v) => v[i] as f64,
        BufferView::U8(v) => v[i] as f64,
    }
}

fn read_vec2(buf: &BufferView, i: usize) -> (f64, f64) {
    let v = buf.as_f32().expect("vec2 buffer must be f32-backed");
    (v[2 * i] as f64, v[2 * i + 1] as f64)
}

/// Materialize `field_id` over `domain_id` into `format`, consulting/
/// populating `cache` and `pool`. The top-level entry point used by
/// [`crate::field::FieldMaterializer::materialize`] and, recursively, by
/// every sub-handle kind.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(level = "trace", name = "materialize", skip_all, fields(field = field_id.get(), domain = domain_id.get(), format = ?format))]
pub fn materialize_internal(
    field_id: FieldId,
    domain_id: DomainId,
    format: BufferFormat,
    env: &dyn FieldEnv,
    signal_eval: &mut SignalEvaluator,
    pool: &mut BufferPool,
    cache: &mut FieldCache,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn FieldTrace>>,
) -> Result<Rc<BufferView>, MaterializeError> {
    let key = cache_key(field_id, domain_id, format);
    if let Some((_, _, buf)) = cache.get(&key) {
        tracing::trace!("cache hit");
        return Ok(buf.clone());
    }

    let node = env
        .field_nodes()
        .get(field_id)
        .ok_or(MaterializeError::InvalidFieldId(field_id.get()))?
        .clone();
    let n = env.domain_count(domain_id)?;
    let mut out = pool.alloc(format, n);
    tracing::trace!(elements = n, "allocated buffer");

    fill(
        field_id,
        &node,
        &mut out,
        n,
        domain_id,
        env,
        signal_eval,
        pool,
        cache,
        #[cfg(feature = "trace")]
        trace,
    )?;

    #[cfg(feature = "trace")]
    if let Some(sink) = trace {
        sink.on_event(FieldTraceEvent {
            field_id,
            domain_id,
            count: n,
            format: format!("{:?}", format),
            usage: String::new(),
        });
    }

    let rc = Rc::new(out);
    cache.insert(key, (format, n, rc.clone()));
    Ok(rc)
}

#[allow(clippy::too_many_arguments)]
fn materialize_default(
    field_id: FieldId,
    domain_id: DomainId,
    env: &dyn FieldEnv,
    signal_eval: &mut SignalEvaluator,
    pool: &mut BufferPool,
    cache: &mut FieldCache,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn FieldTrace>>,
) -> Result<Rc<BufferView>, MaterializeError> {
    let value_type = value_type_of(field_id, env.field_nodes())?;
    materialize_internal(
        field_id,
        domain_id,
        default_format_for(value_type),
        env,
        signal_eval,
        pool,
        cache,
        #[cfg(feature = "trace")]
        trace,
    )
}

#[allow(clippy::too_many_arguments)]
fn fill(
    field_id: FieldId,
    node: &FieldNode,
    out: &mut BufferView,
    n: usize,
    domain_id: DomainId,
    env: &dyn FieldEnv,
    signal_eval: &mut SignalEvaluator,
    pool: &mut BufferPool,
    cache: &mut FieldCache,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn FieldTrace>>,
) -> Result<(), MaterializeError> {
    let _ = field_id;
    match node {
        FieldNode::Const {
            const_id,
            value_type,
            per_element,
        } => fill_const(out, n, env, *const_id, *value_type, *per_element),

        FieldNode::Broadcast { sig_id, value_type } => {
            let v = signal_eval.eval(*sig_id, env.signal_env())?;
            match value_type {
                FieldValueType::Number | FieldValueType::Boolean => fill_scalar(out, n, |_| v),
                _ => return Err(MaterializeError::UnsupportedFieldKind),
            }
            Ok(())
        }

        FieldNode::Source { source_tag, .. } => {
            let source = env
                .source_field(source_tag)
                .ok_or_else(|| MaterializeError::MissingSourceField(source_tag.clone()))?;
            if source.raw_len() != out.raw_len() {
                return Err(MaterializeError::SourceSizeMismatch {
                    name: source_tag.clone(),
                    expected: out.raw_len(),
                    got: source.raw_len(),
                });
            }
            *out = source.clone();
            Ok(())
        }

        FieldNode::Op { op, src } => fill_op(
            out,
            n,
            domain_id,
            env,
            signal_eval,
            pool,
            cache,
            *op,
            *src,
            #[cfg(feature = "trace")]
            trace,
        ),

        FieldNode::Zip { a, b, op } => {
            let a_buf = materialize_default(
                *a,
                domain_id,
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let b_buf = materialize_default(
                *b,
                domain_id,
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            use crate::field::ops::FieldZipOp::*;
            match op {
                Vec2Add | Vec2Sub | Vec2Mul | Vec2Div => {
                    fill_vec_n(out, n, 2, |i| {
                        let (rx, ry) = op.apply_vec2(read_vec2(&a_buf, i), read_vec2(&b_buf, i));
                        vec![rx, ry]
                    });
                }
                _ => {
                    fill_scalar(out, n, |i| op.apply_scalar(read_scalar(&a_buf, i), read_scalar(&b_buf, i)));
                }
            }
            Ok(())
        }

        FieldNode::Select { cond, t, f } => {
            let cond_buf = materialize_internal(
                *cond,
                domain_id,
                BufferFormat::F32,
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let t_type = value_type_of(*t, env.field_nodes())?;
            let t_buf = materialize_internal(
                *t,
                domain_id,
                default_format_for(t_type),
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            let f_buf = materialize_internal(
                *f,
                domain_id,
                default_format_for(t_type),
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            match t_type {
                FieldValueType::Vec2 => fill_vec_n(out, n, 2, |i| {
                    let pick = if read_scalar(&cond_buf, i) != 0.0 { &t_buf } else { &f_buf };
                    let (x, y) = read_vec2(pick, i);
                    vec![x, y]
                }),
                _ => fill_scalar(out, n, |i| {
                    let pick = if read_scalar(&cond_buf, i) != 0.0 { &t_buf } else { &f_buf };
                    read_scalar(pick, i)
                }),
            }
            Ok(())
        }

        FieldNode::Transform { .. } => Err(MaterializeError::UnsupportedFieldKind),

        FieldNode::Combine { mode, terms, value_type } => {
            if terms.is_empty() {
                return Ok(());
            }
            let mut bufs = Vec::with_capacity(terms.len());
            for term in terms {
                bufs.push(materialize_default(
                    *term,
                    domain_id,
                    env,
                    signal_eval,
                    pool,
                    cache,
                    #[cfg(feature = "trace")]
                    trace,
                )?);
            }
            // The mode's validity for the field side doesn't depend on any
            // element's value, so check it once up front rather than
            // threading a `Result` through every per-element fill closure.
            mode.combine_field_element(std::iter::empty::<f64>())?;
            match value_type {
                FieldValueType::Vec2 => fill_vec_n(out, n, 2, |i| {
                    let (xs, ys): (Vec<f64>, Vec<f64>) = multiunzip(bufs.iter().map(|b| read_vec2(b, i)));
                    vec![
                        mode.combine_field_element(xs.into_iter()).expect("mode validated above"),
                        mode.combine_field_element(ys.into_iter()).expect("mode validated above"),
                    ]
                }),
                _ => fill_scalar(out, n, |i| {
                    mode.combine_field_element(bufs.iter().map(|b| read_scalar(b, i)))
                        .expect("mode validated above")
                }),
            }
            Ok(())
        }

        FieldNode::MapIndexed { kernel, signals } => {
            let resolved = resolve_signals(signals, signal_eval, env)?;
            fill_scalar(out, n, |i| kernel.apply(i, n, &resolved));
            Ok(())
        }

        FieldNode::ZipSig { kernel, field, signals } => {
            let resolved = resolve_signals(signals, signal_eval, env)?;
            let field_type = value_type_of(*field, env.field_nodes())?;
            let field_buf = materialize_default(
                *field,
                domain_id,
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            match field_type {
                FieldValueType::Vec2 => fill_vec_n(out, n, 2, |i| {
                    let (x, y) = kernel.apply_vec2(read_vec2(&field_buf, i), &resolved);
                    vec![x, y]
                }),
                _ => fill_scalar(out, n, |i| kernel.apply_scalar(read_scalar(&field_buf, i), &resolved)),
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_op(
    out: &mut BufferView,
    n: usize,
    domain_id: DomainId,
    env: &dyn FieldEnv,
    signal_eval: &mut SignalEvaluator,
    pool: &mut BufferPool,
    cache: &mut FieldCache,
    op: FieldOp,
    src: FieldId,
    #[cfg(feature = "trace")] trace: &mut Option<Box<dyn FieldTrace>>,
) -> Result<(), MaterializeError> {
    match op {
        FieldOp::Scalar(scalar_op) => {
            let resolved = resolve_scalar_op_params(scalar_op, signal_eval, env)?;
            let src_buf = materialize_default(
                src,
                domain_id,
                env,
                signal_eval,
                pool,
                cache,
                #[cfg(feature = "trace")]
                trace,
            )?;
            fill_scalar(out, n, |i| scalar_op.apply(read_scalar(&src_buf, i), i, &resolved));
            Ok(())
        }
        FieldOp::Vec2(vec2_op) => {
            let resolved = resolve_vec2_op_params(vec2_op, signal_eval, env)?;
            // `jitterVec2`'s source is a scalar `r`, not a vec2 point.
            if matches!(vec2_op, Vec2Op::JitterVec2 { .. }) {
                let src_buf = materialize_internal(
                    src,
                    domain_id,
                    BufferFormat::F32,
                    env,
                    signal_eval,
                    pool,
                    cache,
                    #[cfg(feature = "trace")]
                    trace,
                )?;
                fill_vec_n(out, n, 2, |i| {
                    let (x, y) = vec2_op.apply((read_scalar(&src_buf, i), 0.0), &resolved);
                    vec![x, y]
                });
            } else {
                let src_buf = materialize_internal(
                    src,
                    domain_id,
                    BufferFormat::Vec2F32,
                    env,
                    signal_eval,
                    pool,
                    cache,
                    #[cfg(feature = "trace")]
                    trace,
                )?;
                fill_vec_n(out, n, 2, |i| {
                    let (x, y) = vec2_op.apply(read_vec2(&src_buf, i), &resolved);
                    vec![x, y]
                });
            }
            Ok(())
        }
    }
}

fn resolve_scalar_op_params(
    op: ScalarOp,
    signal_eval: &mut SignalEvaluator,
    env: &dyn FieldEnv,
) -> Result<Vec<f64>, MaterializeError> {
    Ok(match op {
        ScalarOp::Smoothstep { a, b } | ScalarOp::Clamp { a, b } => {
            vec![resolve_param(a, signal_eval, env)?, resolve_param(b, signal_eval, env)?]
        }
        ScalarOp::Scale { k } | ScalarOp::Offset { k } | ScalarOp::Hash01ById { seed: k } => {
            vec![resolve_param(k, signal_eval, env)?]
        }
        ScalarOp::ZipSignal { signal, .. } => vec![signal_eval.eval(signal, env.signal_env())?],
        _ => vec![],
    })
}

fn resolve_vec2_op_params(
    op: Vec2Op,
    signal_eval: &mut SignalEvaluator,
    env: &dyn FieldEnv,
) -> Result<Vec<f64>, MaterializeError> {
    Ok(match op {
        Vec2Op::Rotate {
            center_x,
            center_y,
            angle_deg,
        } => vec![
            resolve_param(center_x, signal_eval, env)?,
            resolve_param(center_y, signal_eval, env)?,
            resolve_param(angle_deg, signal_eval, env)?,
        ],
        Vec2Op::Scale {
            center_x,
            center_y,
            scale_x,
            scale_y,
        } => vec![
            resolve_param(center_x, signal_eval, env)?,
            resolve_param(center_y, signal_eval, env)?,
            resolve_param(scale_x, signal_eval, env)?,
            resolve_param(scale_y, signal_eval, env)?,
        ],
        Vec2Op::Translate { offset_x, offset_y } => vec![
            resolve_param(offset_x, signal_eval, env)?,
            resolve_param(offset_y, signal_eval, env)?,
        ],
        Vec2Op::Reflect { center_x, center_y } => {
            vec![resolve_param(center_x, signal_eval, env)?, resolve_param(center_y, signal_eval, env)?]
        }
        Vec2Op::JitterVec2 { phase, amount, frequency } => vec![
            resolve_param(phase, signal_eval, env)?,
            resolve_param(amount, signal_eval, env)?,
            resolve_param(frequency, signal_eval, env)?,
        ],
    })
}

fn fill_const(
    out: &mut BufferView,
    n: usize,
    env: &dyn FieldEnv,
    const_id: crate::ids::ConstId,
    value_type: FieldValueType,
    per_element: bool,
) -> Result<(), MaterializeError> {
    let pool = env.const_pool();
    if per_element {
        let values = pool.number_array(const_id)?;
        if values.len() != n {
            return Err(MaterializeError::ConstArrayLengthMismatch {
                expected: n,
                got: values.len(),
            });
        }
        fill_scalar(out, n, |i| values[i]);
        return Ok(());
    }

    match value_type {
        FieldValueType::Number => {
            let v = pool.number(const_id)?;
            fill_scalar(out, n, |_| v);
        }
        FieldValueType::Boolean => {
            let v = if pool.boolean(const_id)? { 1.0 } else { 0.0 };
            fill_scalar(out, n, |_| v);
        }
        FieldValueType::Vec2 => {
            let lit = pool.vec2(const_id)?;
            fill_vec_n(out, n, 2, |_| vec![lit.x, lit.y]);
        }
        FieldValueType::Vec3 => {
            let lit = pool.vec3(const_id)?;
            fill_vec_n(out, n, 3, |_| vec![lit.x, lit.y, lit.z]);
        }
        FieldValueType::Vec4 => {
            let lit = pool.vec4(const_id)?;
            fill_vec_n(out, n, 4, |_| vec![lit.x, lit.y, lit.z, lit.w]);
        }
        FieldValueType::Quat => {
            let lit = pool.quat(const_id)?;
            fill_vec_n(out, n, 4, |_| vec![lit.x, lit.y, lit.z, lit.w]);
        }
        FieldValueType::Mat4 => {
            let lit = pool.mat4(const_id)?;
            fill_vec_n(out, n, 16, |_| lit.0.clone());
        }
        FieldValueType::Color => {
            let lit = pool.color(const_id)?;
            fill_color(out, n, |_| (lit.r, lit.g, lit.b, lit.a));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::const_pool::{ConstPool, Vec2Lit};
    use crate::context::MapSlotValues;
    use crate::field::env::OwnedFieldEnv;
    use crate::field::ir::{FieldNode, FieldNodes};
    use crate::ids::ConstId;
    use crate::signal::OwnedSignalEnv;
    use crate::transform::TransformTable;
    use std::collections::HashMap as StdHashMap;

    fn signal_env() -> OwnedSignalEnv<MapSlotValues> {
        OwnedSignalEnv {
            nodes: crate::ir::SignalNodes(vec![]),
            const_pool: ConstPool::default(),
            transform_table: TransformTable::new(vec![]),
            #[cfg(feature = "legacy-closures")]
            closures: crate::closure::ClosureRegistry::new(),
            slots: MapSlotValues::new(),
            context: crate::context::RuntimeContext {
                t_abs_ms: 0.0,
                t_model_ms: None,
                phase01: None,
                wrap_occurred: false,
                delta_sec: 0.0,
                frame_index: 0,
            },
        }
    }

    #[test]
    fn const_number_broadcasts() {
        let mut const_pool = ConstPool::new(vec![42.0]);
        let _ = const_pool.push_vec2(Vec2Lit { x: 1.0, y: 2.0 });
        let env = OwnedFieldEnv {
            field_nodes: FieldNodes(vec![FieldNode::Const {
                const_id: ConstId(0),
                value_type: FieldValueType::Number,
                per_element: false,
            }]),
            const_pool,
            transform_table: TransformTable::new(vec![]),
            signal_env: signal_env(),
            source_fields: StdHashMap::new(),
            domain_counts: StdHashMap::from([(DomainId(0), 5)]),
        };
        let mut evaluator = SignalEvaluator::new(0, 0, 0, 0);
        let mut pool = BufferPool::new();
        let mut cache = FieldCache::new();
        #[cfg(feature = "trace")]
        let mut trace: Option<Box<dyn FieldTrace>> = None;

        let buf = materialize_internal(
            FieldId(0),
            DomainId(0),
            BufferFormat::F32,
            &env,
            &mut evaluator,
            &mut pool,
            &mut cache,
            #[cfg(feature = "trace")]
            &mut trace,
        )
        .unwrap();
        assert_eq!(buf.as_f32().unwrap(), &[42.0, 42.0, 42.0, 42.0, 42.0]);
    }

    #[test]
    fn combine_sum_matches_scenario_s5() {
        let const_pool = ConstPool::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let env = OwnedFieldEnv {
            field_nodes: FieldNodes(vec![
                FieldNode::Source {
                    source_tag: "values".to_string(),
                    value_type: FieldValueType::Number,
                },
            ]),
            const_pool,
            transform_table: TransformTable::new(vec![]),
            signal_env: signal_env(),
            source_fields: StdHashMap::from([(
                "values".to_string(),
                BufferView::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            )]),
            domain_counts: StdHashMap::from([(DomainId(0), 5)]),
        };
        let mut evaluator = SignalEvaluator::new(0, 0, 0, 0);
        let mut pool = BufferPool::new();
        let mut cache = FieldCache::new();
        #[cfg(feature = "trace")]
        let mut trace: Option<Box<dyn FieldTrace>> = None;

        let buf = materialize_internal(
            FieldId(0),
            DomainId(0),
            BufferFormat::F32,
            &env,
            &mut evaluator,
            &mut pool,
            &mut cache,
            #[cfg(feature = "trace")]
            &mut trace,
        )
        .unwrap();
        let sum: f32 = buf.as_f32().unwrap().iter().sum();
        assert_eq!(sum, 15.0);
    }
}
