//! Signal-node IR: a flat, dense-indexed array of tagged variants. No
//! pointer-to-node references — all cross-node links are [`SigExprId`]
//! indices, mirroring the frame cache's own indexing (`spec.md §9`).

use std::sync::Arc;

use crate::closure::LegacyClosure;
use crate::combine::CombineMode;
use crate::ids::{ChainId, ConstId, SigExprId};
use crate::opcode::{BinaryOp, UnaryOp};

/// One signal-node IR entry. Immutable after compile.
#[derive(Clone)]
pub enum SignalNode {
    Const(ConstId),
    TimeAbsMs,
    TimeModelMs,
    Phase01,
    WrapEvent,
    InputSlot { slot: u32 },
    Map { src: SigExprId, op: UnaryOp },
    Zip { a: SigExprId, b: SigExprId, op: BinaryOp },
    Select { cond: SigExprId, t: SigExprId, f: SigExprId },
    BusCombine {
        bus_index: u32,
        terms: Vec<SigExprId>,
        mode: CombineMode,
        default: Option<f64>,
    },
    Transform { src: SigExprId, chain_id: ChainId },
    Stateful(StatefulNode),
    /// Temporary migration bridge: pre-evaluate every `input_slots` entry,
    /// then invoke the registered callable with `(tAbsMs, legacyCtx)`.
    #[cfg(feature = "legacy-closures")]
    ClosureBridge { closure_id: String, input_slots: Vec<SigExprId> },
    /// Embedded variant used by the V2 adapter: invokes the callable
    /// directly, with no registry indirection.
    #[cfg(feature = "legacy-closures")]
    Closure(Arc<dyn LegacyClosure>),
}

impl std::fmt::Debug for SignalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalNode::Const(id) => f.debug_tuple("Const").field(id).finish(),
            SignalNode::TimeAbsMs => write!(f, "TimeAbsMs"),
            SignalNode::TimeModelMs => write!(f, "TimeModelMs"),
            SignalNode::Phase01 => write!(f, "Phase01"),
            SignalNode::WrapEvent => write!(f, "WrapEvent"),
            SignalNode::InputSlot { slot } => f.debug_struct("InputSlot").field("slot", slot).finish(),
            SignalNode::Map { src, op } => f.debug_struct("Map").field("src", src).field("op", op).finish(),
            SignalNode::Zip { a, b, op } => f.debug_struct("Zip").field("a", a).field("b", b).field("op", op).finish(),
            SignalNode::Select { cond, t, f: ff } => f
                .debug_struct("Select")
                .field("cond", cond)
                .field("t", t)
                .field("f", ff)
                .finish(),
            SignalNode::BusCombine {
                bus_index,
                terms,
                mode,
                default,
            } => f
                .debug_struct("BusCombine")
                .field("bus_index", bus_index)
                .field("terms", terms)
                .field("mode", mode)
                .field("default", default)
                .finish(),
            SignalNode::Transform { src, chain_id } => {
                f.debug_struct("Transform").field("src", src).field("chain_id", chain_id).finish()
            }
            SignalNode::Stateful(s) => f.debug_tuple("Stateful").field(s).finish(),
            #[cfg(feature = "legacy-closures")]
            SignalNode::ClosureBridge { closure_id, input_slots } => f
                .debug_struct("ClosureBridge")
                .field("closure_id", closure_id)
                .field("input_slots", input_slots)
                .finish(),
            #[cfg(feature = "legacy-closures")]
            SignalNode::Closure(_) => write!(f, "Closure(..)"),
        }
    }
}

/// Stateful operator variants, each owning a `state_offset` naming the
/// first cell of its state slab.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatefulNode {
    Integrate { input: SigExprId, state_offset: usize },
    SampleHold {
        input: SigExprId,
        trigger: SigExprId,
        state_offset: usize,
    },
    Slew {
        input: SigExprId,
        rate: Option<f64>,
        state_offset: usize,
    },
    DelayMs {
        input: SigExprId,
        delay_ms: Option<f64>,
        buffer_size: Option<usize>,
        state_offset: usize,
    },
    DelayFrames {
        input: SigExprId,
        delay_frames: Option<usize>,
        state_offset: usize,
    },
    /// Reads the runtime context's `phase01` directly; no signal input.
    EdgeDetectWrap { state_offset: usize },
    /// Reads the runtime context's `phase01` directly; no signal input.
    PulseDivider { divisions: Option<f64>, state_offset: usize },
    EnvelopeAD {
        trigger: SigExprId,
        attack_ms: Option<f64>,
        decay_ms: Option<f64>,
        peak: Option<f64>,
        state_offset: usize,
    },
}

impl StatefulNode {
    /// The state slab's starting offset, common to every variant.
    pub fn state_offset(&self) -> usize {
        match self {
            StatefulNode::Integrate { state_offset, .. }
            | StatefulNode::SampleHold { state_offset, .. }
            | StatefulNode::Slew { state_offset, .. }
            | StatefulNode::DelayMs { state_offset, .. }
            | StatefulNode::DelayFrames { state_offset, .. }
            | StatefulNode::EdgeDetectWrap { state_offset }
            | StatefulNode::PulseDivider { state_offset, .. }
            | StatefulNode::EnvelopeAD { state_offset, .. } => *state_offset,
        }
    }
}

/// Dense, immutable-after-compile table of signal nodes, indexed by
/// [`SigExprId`].
#[derive(Debug, Clone, Default)]
pub struct SignalNodes(pub Vec<SignalNode>);

impl SignalNodes {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` iff there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a node by id.
    pub fn get(&self, id: SigExprId) -> Option<&SignalNode> {
        self.0.get(id.index())
    }
}
