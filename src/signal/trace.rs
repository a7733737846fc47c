//! Debug-tracing sink for the signal evaluator.
//!
//! Modeled on `fuel-vm`'s `Profiler`/`ProfileReceiver`: an optional boxed
//! receiver that costs one `if let Some(..)` check per emission site when
//! absent, and never constructs a trace record unless a sink is attached
//! (`spec.md §4.1`, "Debug tracing").

use crate::ids::SigExprId;

/// One transform-chain step's observed input/output, for the per-step trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformStepTrace {
    pub step_index: usize,
    pub input: f64,
    pub output: f64,
}

/// A single structured trace event. Strictly observational — never used in
/// numeric decisions (`spec.md §4.1`).
#[derive(Debug, Clone)]
pub enum SignalTraceEvent {
    /// A `busCombine` node evaluated 2+ terms.
    BusCombine {
        node: SigExprId,
        bus_index: u32,
        term_values: Vec<f64>,
        result: f64,
    },
    /// A `transform` node applied its chain.
    Transform {
        node: SigExprId,
        input: f64,
        output: f64,
        steps: Vec<TransformStepTrace>,
    },
    /// A `closureBridge` node invoked its registered callable.
    ClosureBridge {
        node: SigExprId,
        closure_id: String,
        result: f64,
        /// Wall-clock duration of the call, if the sink requested timing.
        duration: Option<std::time::Duration>,
    },
}

/// Receiver for [`SignalTraceEvent`]s.
#[cfg(feature = "trace")]
pub trait SignalTrace: dyn_clone::DynClone {
    /// Called once per emission site, per `spec.md §4.1`'s emission-site
    /// list.
    fn on_event(&mut self, event: SignalTraceEvent);
}

#[cfg(feature = "trace")]
dyn_clone::clone_trait_object!(SignalTrace);

/// Counts events by kind; used by property tests that need to observe
/// "evaluated exactly once" without depending on the value itself.
#[cfg(feature = "trace")]
#[derive(Debug, Clone, Default)]
pub struct CountingSignalTrace {
    pub bus_combines: usize,
    pub transforms: usize,
    pub closure_bridges: usize,
}

#[cfg(feature = "trace")]
impl SignalTrace for CountingSignalTrace {
    fn on_event(&mut self, event: SignalTraceEvent) {
        match event {
            SignalTraceEvent::BusCombine { .. } => self.bus_combines += 1,
            SignalTraceEvent::Transform { .. } => self.transforms += 1,
            SignalTraceEvent::ClosureBridge { .. } => self.closure_bridges += 1,
        }
    }
}
