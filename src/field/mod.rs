//! The Field Materializer: a lazy field-to-buffer evaluator.
//!
//! [`FieldMaterializer`] owns the buffer pool and the per-frame buffer
//! cache, mirroring how [`crate::signal::SignalEvaluator`] owns the frame
//! cache and state buffer — the same "one instance per graph, one
//! `new_frame` per rendered frame" shape.

pub mod dispatch;
pub mod env;
pub mod format;
pub mod ir;
pub mod ops;
pub mod pool;
pub mod sink;
pub mod trace;

use std::rc::Rc;

use crate::combine::CombineMode;
use crate::error::MaterializeError;
use crate::ids::{DomainId, FieldId};
use crate::signal::SignalEvaluator;

pub use dispatch::{default_format_for, value_type_of};
pub use env::{FieldEnv, OwnedFieldEnv};
pub use format::{BufferFormat, BufferView, Layout};
pub use ir::{FieldNode, FieldNodes, FieldValueType, MaterializationRequest, RenderSinkRequest};
pub use ops::{FieldOp, FieldZipOp, MapIndexedKernel, ParamValue, ScalarOp, Vec2Op, ZipSigKernel};
pub use pool::{BufferPool, PoolStats};
pub use sink::RenderOutput;
#[cfg(feature = "trace")]
pub use trace::{CountingFieldTrace, FieldTrace, FieldTraceEvent};

/// Materializes field handles into typed buffers against an externally
/// supplied [`FieldEnv`].
pub struct FieldMaterializer {
    pool: BufferPool,
    cache: dispatch::FieldCache,
    #[cfg(feature = "trace")]
    trace: Option<Box<dyn FieldTrace>>,
}

impl FieldMaterializer {
    /// A fresh materializer with an empty buffer pool and per-frame cache.
    pub fn new() -> Self {
        Self {
            pool: BufferPool::new(),
            cache: dispatch::FieldCache::new(),
            #[cfg(feature = "trace")]
            trace: None,
        }
    }

    /// Attach (or detach, with `None`) a debug-trace sink.
    #[cfg(feature = "trace")]
    pub fn set_trace(&mut self, trace: Option<Box<dyn FieldTrace>>) {
        self.trace = trace;
    }

    /// Materialize one request against `env` and `signal_eval`, memoized
    /// within the current frame by `"<fieldId>:<domainId>:<format>"`
    /// (`spec.md §4.2`). Repeated calls for the identical key within the
    /// same frame return the identical `Rc` — observable via `Rc::ptr_eq`.
    pub fn materialize(
        &mut self,
        request: &MaterializationRequest,
        env: &dyn FieldEnv,
        signal_eval: &mut SignalEvaluator,
    ) -> Result<Rc<BufferView>, MaterializeError> {
        let format = BufferFormat::parse(&request.format)?;
        dispatch::materialize_internal(
            request.field_id,
            request.domain_id,
            format,
            env,
            signal_eval,
            &mut self.pool,
            &mut self.cache,
            #[cfg(feature = "trace")]
            &mut self.trace,
        )
    }

    /// The field→signal bridge (`spec.md §1`'s "Reduce (field→signal)
    /// bridge"): materialize `field_id` at its default format for
    /// `domain_id`, then fold every element through `mode`
    /// (`spec.md §8` scenario S5).
    pub fn reduce(
        &mut self,
        field_id: FieldId,
        domain_id: DomainId,
        mode: CombineMode,
        env: &dyn FieldEnv,
        signal_eval: &mut SignalEvaluator,
    ) -> Result<f64, MaterializeError> {
        let value_type = value_type_of(field_id, env.field_nodes())?;
        let format = default_format_for(value_type);
        let buf = dispatch::materialize_internal(
            field_id,
            domain_id,
            format,
            env,
            signal_eval,
            &mut self.pool,
            &mut self.cache,
            #[cfg(feature = "trace")]
            &mut self.trace,
        )?;
        let values: Vec<f64> = match &*buf {
            BufferView::F32(v) => v.iter().map(|x| *x as f64).collect(),
            BufferView::F64(v) => v.clone(),
            BufferView::I32(v) => v.iter().map(|x| *x as f64).collect(),
            BufferView::U32(v) => v.iter().map(|x| *x as f64).collect(),
            BufferView::U8(v) => v.iter().map(|x| *x as f64).collect(),
        };
        mode.combine_field_element(values.into_iter())
    }

    /// Plan and execute a render-sink request: materialize each named field
    /// input (per the usage-tag heuristic table), evaluate each signal
    /// uniform once, and assemble `{kind, instanceCount, buffers, uniforms}`
    /// (`spec.md §4.2`).
    pub fn execute_render_sink(
        &mut self,
        request: &RenderSinkRequest,
        env: &dyn FieldEnv,
        signal_eval: &mut SignalEvaluator,
    ) -> Result<RenderOutput, MaterializeError> {
        let instance_count = env.domain_count(request.domain_id)?;
        let mut output = RenderOutput::new(request.sink_type.clone(), instance_count);

        for planned in sink::plan(request) {
            let buf = self.materialize(&planned, env, signal_eval)?;
            output.buffers.insert(planned.usage_tag.clone(), buf);
        }
        for (name, sig_id) in &request.signal_uniforms {
            let value = signal_eval.eval(*sig_id, env.signal_env())?;
            output.uniforms.insert(name.clone(), value);
        }
        Ok(output)
    }

    /// Return every buffer touched this frame to the pool and clear the
    /// per-frame cache. Callers must not retain `Rc<BufferView>`s returned
    /// by earlier `materialize` calls past this call.
    pub fn release_frame(&mut self) {
        let entries: Vec<_> = self.cache.drain().collect();
        let mut released = Vec::with_capacity(entries.len());
        for (_, (format, count, rc)) in entries {
            let buf = Rc::try_unwrap(rc).unwrap_or_else(|rc| (*rc).clone());
            released.push((format, count, buf));
        }
        self.pool.release_all(released);
    }

    /// Current buffer-pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Default for FieldMaterializer {
    fn default() -> Self {
        Self::new()
    }
}
