#![forbid(unsafe_code)]

pub mod closure;
pub mod combine;
pub mod const_pool;
pub mod consts;
pub mod context;
pub mod easing;
pub mod error;
pub mod field;
pub mod frame_cache;
pub mod ids;
pub mod ir;
pub mod limits;
pub mod opcode;
pub mod signal;
pub mod state_buffer;
pub mod transform;

pub mod prelude {
    pub use crate::combine::CombineMode;
    pub use crate::const_pool::ConstPool;
    pub use crate::context::{DenseSlotValues, MapSlotValues, RuntimeContext, SlotValues};
    pub use crate::error::{EvalError, MaterializeError};
    pub use crate::field::{
        BufferFormat, BufferView, FieldEnv, FieldMaterializer, FieldNode, FieldNodes, FieldValueType,
        MaterializationRequest, OwnedFieldEnv, RenderOutput, RenderSinkRequest,
    };
    pub use crate::ids::{ChainId, ConstId, DomainId, FieldId, SigExprId};
    pub use crate::ir::{SignalNode, SignalNodes};
    pub use crate::limits::{BufferPoolGrowth, EngineLimits};
    pub use crate::signal::{OwnedSignalEnv, SignalEnv, SignalEvaluator};

    #[cfg(feature = "trace")]
    pub use crate::field::{CountingFieldTrace, FieldTrace, FieldTraceEvent};
    #[cfg(feature = "trace")]
    pub use crate::signal::{CountingSignalTrace, SignalTrace, SignalTraceEvent};
}
