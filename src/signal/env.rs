//! Borrowed references the evaluator needs for a single `eval` call.
//!
//! Grounded on `fuel-vm`'s `InterpreterStorage` trait (`src/storage/interpreter.rs`):
//! a single trait bundling everything the hot path reads, implemented once
//! by the host application/block compiler's IR bundle.

#[cfg(feature = "legacy-closures")]
use crate::closure::ClosureRegistry;
use crate::const_pool::ConstPool;
use crate::context::{RuntimeContext, SlotValues};
use crate::ir::SignalNodes;
use crate::transform::TransformTable;

/// Everything [`crate::signal::SignalEvaluator::eval`] needs that isn't
/// owned by the evaluator itself (frame cache, state buffer).
pub trait SignalEnv {
    /// The signal-node IR array.
    fn nodes(&self) -> &SignalNodes;
    /// The constant pool.
    fn const_pool(&self) -> &ConstPool;
    /// The compiled transform-chain table.
    fn transform_table(&self) -> &TransformTable;
    /// The closure registry, for `closureBridge` nodes.
    #[cfg(feature = "legacy-closures")]
    fn closures(&self) -> &ClosureRegistry;
    /// External scalar-input slot reader.
    fn slot_values(&self) -> &dyn SlotValues;
    /// This frame's runtime context.
    fn context(&self) -> &RuntimeContext;
}

/// A plain, owned [`SignalEnv`] implementation convenient for tests and for
/// hosts that don't need a custom borrowing strategy.
pub struct OwnedSignalEnv<S: SlotValues> {
    pub nodes: SignalNodes,
    pub const_pool: ConstPool,
    pub transform_table: TransformTable,
    #[cfg(feature = "legacy-closures")]
    pub closures: ClosureRegistry,
    pub slots: S,
    pub context: RuntimeContext,
}

impl<S: SlotValues> SignalEnv for OwnedSignalEnv<S> {
    fn nodes(&self) -> &SignalNodes {
        &self.nodes
    }

    fn const_pool(&self) -> &ConstPool {
        &self.const_pool
    }

    fn transform_table(&self) -> &TransformTable {
        &self.transform_table
    }

    #[cfg(feature = "legacy-closures")]
    fn closures(&self) -> &ClosureRegistry {
        &self.closures
    }

    fn slot_values(&self) -> &dyn SlotValues {
        &self.slots
    }

    fn context(&self) -> &RuntimeContext {
        &self.context
    }
}
