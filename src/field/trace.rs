//! Debug-tracing sink for the field materializer, parallel to
//! [`crate::signal::trace`].

use crate::ids::{DomainId, FieldId};

/// One `materialize` call's summary, emitted after a cache-miss fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTraceEvent {
    pub field_id: FieldId,
    pub domain_id: DomainId,
    pub count: usize,
    pub format: String,
    pub usage: String,
}

/// Receiver for [`FieldTraceEvent`]s.
#[cfg(feature = "trace")]
pub trait FieldTrace: dyn_clone::DynClone {
    fn on_event(&mut self, event: FieldTraceEvent);
}

#[cfg(feature = "trace")]
dyn_clone::clone_trait_object!(FieldTrace);

/// Counts materialize calls; used by tests that need to observe caching
/// behavior without inspecting buffer identity directly.
#[cfg(feature = "trace")]
#[derive(Debug, Clone, Default)]
pub struct CountingFieldTrace {
    pub materializations: usize,
}

#[cfg(feature = "trace")]
impl FieldTrace for CountingFieldTrace {
    fn on_event(&mut self, _event: FieldTraceEvent) {
        self.materializations += 1;
    }
}
