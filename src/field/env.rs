//! Borrowed references the field materializer needs for a single
//! `materialize` call, mirroring [`crate::signal::env::SignalEnv`]'s shape.

use crate::const_pool::ConstPool;
use crate::error::MaterializeError;
use crate::field::format::BufferView;
use crate::field::ir::FieldNodes;
use crate::ids::DomainId;
use crate::signal::env::SignalEnv;
use crate::transform::TransformTable;

/// Everything [`crate::field::FieldMaterializer::materialize`] needs that
/// isn't owned by the materializer itself (per-frame buffer cache, buffer
/// pool).
pub trait FieldEnv {
    /// The field-node IR array.
    fn field_nodes(&self) -> &FieldNodes;
    /// The constant pool (shared with the signal evaluator).
    fn const_pool(&self) -> &ConstPool;
    /// The compiled transform-chain table (unused until `Transform` field
    /// handles are implemented; present for forward compatibility).
    fn transform_table(&self) -> &TransformTable;
    /// The signal-evaluator sub-environment, for `Broadcast`/`MapIndexed`/
    /// `ZipSig`/`Op::ZipSignal` bridges.
    fn signal_env(&self) -> &dyn SignalEnv;
    /// Look up a host-supplied source buffer by its field-handle tag.
    fn source_field(&self, tag: &str) -> Option<&BufferView>;
    /// Element count for a domain.
    fn domain_count(&self, domain: DomainId) -> Result<usize, MaterializeError>;
    /// Optional per-element stable id vector (e.g. for `hash01ById`
    /// kernels that want identity-stable jitter across reorderings).
    fn domain_elements(&self) -> Option<&[String]> {
        None
    }
}

/// A plain, owned [`FieldEnv`] implementation convenient for tests and
/// simple hosts.
pub struct OwnedFieldEnv<S: SignalEnv> {
    pub field_nodes: FieldNodes,
    pub const_pool: ConstPool,
    pub transform_table: TransformTable,
    pub signal_env: S,
    pub source_fields: std::collections::HashMap<String, BufferView>,
    pub domain_counts: std::collections::HashMap<DomainId, usize>,
}

impl<S: SignalEnv> FieldEnv for OwnedFieldEnv<S> {
    fn field_nodes(&self) -> &FieldNodes {
        &self.field_nodes
    }

    fn const_pool(&self) -> &ConstPool {
        &self.const_pool
    }

    fn transform_table(&self) -> &TransformTable {
        &self.transform_table
    }

    fn signal_env(&self) -> &dyn SignalEnv {
        &self.signal_env
    }

    fn source_field(&self, tag: &str) -> Option<&BufferView> {
        self.source_fields.get(tag)
    }

    fn domain_count(&self, domain: DomainId) -> Result<usize, MaterializeError> {
        self.domain_counts
            .get(&domain)
            .copied()
            .ok_or(MaterializeError::InvalidDomainId(domain.get()))
    }
}
