//! Field-node IR, materialization requests, and render-sink descriptors.

use std::collections::BTreeMap;

use crate::combine::CombineMode;
use crate::field::ops::{FieldOp, FieldZipOp, MapIndexedKernel, ZipSigKernel};
use crate::ids::{ChainId, ConstId, DomainId, FieldId, SigExprId};

/// The structured type a field handle produces, independent of the
/// concrete [`crate::field::format::BufferFormat`] it's materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValueType {
    Number,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Mat4,
    Color,
    Boolean,
}

/// One field-handle IR entry. Cheap to hold; arrays are produced only on
/// `materialize`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldNode {
    Const {
        const_id: ConstId,
        value_type: FieldValueType,
        /// `true` reads a per-element numeric array from the const pool
        /// (length must equal the domain count); `false` broadcasts a
        /// single literal to every element.
        per_element: bool,
    },
    /// Evaluate `sig_id` once via the signal evaluator, repeat across every
    /// element of the request's domain.
    Broadcast { sig_id: SigExprId, value_type: FieldValueType },
    /// Copy bytes verbatim from the host-supplied source-field provider.
    Source { source_tag: String, value_type: FieldValueType },
    /// Recursively materialize `src`, then transform element-wise per `op`.
    Op { op: FieldOp, src: FieldId },
    /// Materialize both inputs, then combine element-wise per `op`.
    Zip { a: FieldId, b: FieldId, op: FieldZipOp },
    /// Materialize all three inputs (no short-circuit — selection is
    /// per-element); `cond[i] != 0 ? t[i] : f[i]`.
    Select { cond: FieldId, t: FieldId, f: FieldId },
    /// Reserved; always errors with `UnsupportedFieldKind`.
    Transform { src: FieldId, chain_id: ChainId },
    /// Field-level bus combine: materialize every term, combine
    /// element-wise. Empty terms fill with zeros.
    Combine {
        mode: CombineMode,
        terms: Vec<FieldId>,
        value_type: FieldValueType,
    },
    /// Evaluate `signals` once, then apply an index-parameterized kernel.
    MapIndexed { kernel: MapIndexedKernel, signals: Vec<SigExprId> },
    /// Evaluate `signals` once, materialize `field`, then apply a named
    /// kernel element-wise.
    ZipSig {
        kernel: ZipSigKernel,
        field: FieldId,
        signals: Vec<SigExprId>,
    },
}

/// Dense, immutable-after-compile table of field nodes, indexed by
/// [`FieldId`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldNodes(pub Vec<FieldNode>);

impl FieldNodes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldNode> {
        self.0.get(id.index())
    }
}

/// A request to materialize one field handle into a typed buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterializationRequest {
    pub field_id: FieldId,
    pub domain_id: DomainId,
    pub format: String,
    pub layout: String,
    pub usage_tag: String,
}

impl MaterializationRequest {
    /// The per-frame buffer cache key, `"<fieldId>:<domainId>:<format>"`
    /// (`spec.md §4.2`).
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", self.field_id, self.domain_id, self.format)
    }
}

/// A rendering request consumed by the Render-Sink Planner.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderSinkRequest {
    pub sink_type: String,
    pub domain_id: DomainId,
    /// Named field inputs, keyed by usage tag. `BTreeMap` keeps iteration
    /// lexically ordered so planning/execution is deterministic
    /// (`spec.md §4.2`/§5, the render-sink determinism requirement).
    pub field_inputs: BTreeMap<String, FieldId>,
    /// Named signal uniforms, keyed by name.
    pub signal_uniforms: BTreeMap<String, SigExprId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable() {
        let req = MaterializationRequest {
            field_id: FieldId(3),
            domain_id: DomainId(1),
            format: "vec2f32".to_string(),
            layout: "vec2".to_string(),
            usage_tag: "pos".to_string(),
        };
        assert_eq!(req.cache_key(), "3:1:vec2f32");
    }
}
