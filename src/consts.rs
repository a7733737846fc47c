//! Numeric defaults and fixed-size tables shared across the evaluator and
//! materializer.

/// Number of built-in easing curves, and the fixed order in which their ids
/// are assigned (linear, easeInQuad, easeOutQuad, easeInOutQuad, easeInCubic,
/// easeOutCubic, smoothstep).
pub const EASING_CURVE_COUNT: usize = 7;

/// Threshold above which a `select`/boolean-coded signal is considered
/// "true" (`cond > 0.5`).
pub const BOOL_THRESHOLD: f64 = 0.5;

/* Stateful operator defaults, one named constant per operator parameter,
 * mirroring a per-opcode cost table: a flat, inline-number-free lookup the
 * dispatch code reads from instead of embedding magic numbers. */

/// `slew` default rate (units/sec) when `params.rate` is absent.
pub const DEFAULT_SLEW_RATE: f64 = 1.0;

/// `delayMs` default delay, in milliseconds.
pub const DEFAULT_DELAY_MS: f64 = 100.0;

/// `delayMs` default ring-buffer capacity, in samples.
pub const DEFAULT_DELAY_BUFFER_SIZE: usize = 64;

/// `delayFrames` default delay, in frames.
pub const DEFAULT_DELAY_FRAMES: usize = 1;

/// `pulseDivider` default subdivision count.
pub const DEFAULT_PULSE_DIVISIONS: f64 = 4.0;

/// `envelopeAD` default attack time, in milliseconds.
pub const DEFAULT_ENVELOPE_ATTACK_MS: f64 = 50.0;

/// `envelopeAD` default decay time, in milliseconds.
pub const DEFAULT_ENVELOPE_DECAY_MS: f64 = 500.0;

/// `envelopeAD` default peak value.
pub const DEFAULT_ENVELOPE_PEAK: f64 = 1.0;

/// Rising-edge detection threshold used by `sampleHold`/`envelopeAD`.
pub const EDGE_RISING_THRESHOLD: f64 = 0.5;

/// `edgeDetectWrap` high-phase threshold (previous phase must exceed this).
pub const EDGE_WRAP_HIGH: f64 = 0.8;

/// `edgeDetectWrap` low-phase threshold (current phase must be below this).
pub const EDGE_WRAP_LOW: f64 = 0.2;
