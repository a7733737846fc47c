//! Error taxonomy for the signal evaluator and field materializer.

use thiserror::Error;

/// Errors raised while evaluating a [`crate::signal::SignalEvaluator`] call.
///
/// All variants are fatal for the single `eval` call that raises them; no
/// partial result is ever cached (see `spec.md §7`). Numeric anomalies
/// (`NaN`/`Inf`) are never represented here — they propagate as ordinary
/// `f64` values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// `rootId` or a referenced node id fell outside `0..nodes.len()`.
    #[error("signal node id {0} out of range")]
    InvalidNodeId(u32),
    /// A `const` node referenced a const-pool index out of range.
    #[error("const id {0} out of range")]
    InvalidConstId(u32),
    /// A `transform` node referenced a chain id out of range.
    #[error("transform chain id {0} out of range")]
    InvalidChainId(u32),
    /// An `ease` transform step referenced a curve id outside `0..7`.
    #[error("easing curve id {0} out of range")]
    InvalidEasingCurveId(u32),
    /// A `closureBridge` node referenced an id missing from the registry.
    #[error("missing closure for id {0:?}")]
    MissingClosure(String),
    /// A `sampleHold` stateful node had no `trigger` slot configured.
    #[error("sampleHold node missing trigger parameter")]
    MissingTriggerParam,
    /// A stateful or transform operator was missing a required parameter.
    #[error("op missing required parameter {0:?}")]
    MissingOpParam(&'static str),
    /// A node carried an unrecognized `kind` tag.
    #[error("unknown node kind tag {0}")]
    UnknownNodeKind(u32),
    /// A `map`/`zip` node referenced an unrecognized opcode.
    #[error("unknown opcode {0:?}")]
    UnknownOpCode(String),
    /// A transform chain referenced an unrecognized step kind.
    #[error("unknown transform step kind {0:?}")]
    UnknownStepKind(String),
    /// A `busCombine` node referenced an unrecognized combine mode.
    #[error("unknown combine mode {0:?}")]
    UnknownCombineMode(String),
    /// The `cast` transform step is a reserved placeholder.
    #[error("cast transform step is not implemented")]
    UnsupportedStepKind,
}

/// Errors raised while evaluating a [`crate::field::FieldMaterializer`] call.
///
/// Wraps [`EvalError`] for the Broadcast/Reduce/ZipSig/MapIndexed bridges
/// into the signal evaluator, the same way `fuel-vm`'s `InterpreterError`
/// wraps its nested `VmValidationError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterializeError {
    /// Delegated failure from the signal evaluator (Broadcast/Reduce/etc).
    #[error(transparent)]
    Signal(#[from] EvalError),
    /// `fieldId` fell outside `0..fieldNodes.len()`.
    #[error("field id {0} out of range")]
    InvalidFieldId(u32),
    /// A domain id had no registered element count.
    #[error("domain id {0} has no registered element count")]
    InvalidDomainId(u32),
    /// A field node carried an unrecognized `kind` tag.
    #[error("unknown field handle kind {0:?}")]
    UnknownHandleKind(String),
    /// A requested buffer format was not recognized.
    #[error("unknown buffer format {0:?}")]
    UnknownFormat(String),
    /// A field op referenced an unrecognized operator name.
    #[error("unknown field op {0:?}")]
    UnknownFieldOp(String),
    /// A field op/zip/combine/mapIndexed/zipSig node was missing a required
    /// parameter.
    #[error("field op missing required parameter {0:?}")]
    MissingOpParam(&'static str),
    /// A `Source` handle named a field not present in the source provider.
    #[error("missing source field {0:?}")]
    MissingSourceField(String),
    /// A `Source` handle's byte length did not match the output buffer's.
    #[error("source field {name:?} byte length {got} does not match expected {expected}")]
    SourceSizeMismatch {
        /// Source-field name.
        name: String,
        /// Expected byte length (derived from domain count and format).
        expected: usize,
        /// Actual byte length of the supplied source buffer.
        got: usize,
    },
    /// A const array-literal's length did not match the domain count.
    #[error("const array length {got} does not match domain count {expected}")]
    ConstArrayLengthMismatch {
        /// Expected element count (the domain's element count).
        expected: usize,
        /// Actual element count found in the literal.
        got: usize,
    },
    /// A vector/quaternion/color const literal had an unexpected shape.
    #[error("invalid vector constant: {0}")]
    InvalidVecConstant(String),
    /// A quaternion const's length deviated from 1 by more than `1e-3`.
    #[error("quaternion const {0} has non-unit length")]
    NonUnitQuaternion(u32),
    /// A mat4 const did not have exactly 16 elements.
    #[error("mat4 const {0} does not have exactly 16 elements")]
    Mat4LengthMismatch(u32),
    /// `Transform` field handles are reserved and not yet implemented.
    #[error("Transform field handle is not implemented")]
    UnsupportedFieldKind,
}
