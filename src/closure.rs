//! Temporary id→opaque-callable map for migration off legacy closures.
//!
//! This is scaffolding, not a permanent part of the evaluator's surface —
//! `spec.md §9` calls for it to be gated so it can be deleted wholesale once
//! the migration it supports completes. It is kept behind the crate's
//! `legacy-closures` feature for exactly that reason.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::LegacyContext;

/// An opaque legacy callable: `(tAbsMs, legacyCtx) -> scalar`.
pub trait LegacyClosure: Send + Sync {
    /// Invoke the callable.
    fn call(&self, t_abs_ms: f64, ctx: LegacyContext) -> f64;
}

impl<F> LegacyClosure for F
where
    F: Fn(f64, LegacyContext) -> f64 + Send + Sync,
{
    fn call(&self, t_abs_ms: f64, ctx: LegacyContext) -> f64 {
        self(t_abs_ms, ctx)
    }
}

/// Registry of closure-bridge callables, keyed by the string id a compiled
/// `closureBridge` node carries. Missing ids are a [`crate::error::EvalError::MissingClosure`]
/// during evaluation, never a silent default.
#[derive(Clone, Default)]
pub struct ClosureRegistry {
    callables: HashMap<String, Arc<dyn LegacyClosure>>,
}

impl ClosureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under `id`, replacing any previous entry.
    ///
    /// Mutation is scoped to this builder method rather than exposed as a
    /// process-global singleton — `spec.md §9` explicitly calls out the
    /// "global mutable migration set" anti-pattern this avoids.
    pub fn register(&mut self, id: impl Into<String>, callable: Arc<dyn LegacyClosure>) {
        self.callables.insert(id.into(), callable);
    }

    /// Look up a callable by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn LegacyClosure>> {
        self.callables.get(id)
    }
}

impl fmt::Debug for ClosureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureRegistry")
            .field("len", &self.callables.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_yields_none() {
        let registry = ClosureRegistry::new();
        assert!(registry.get("legacy.wiggle").is_none());
    }

    #[test]
    fn registered_callable_invokes() {
        let mut registry = ClosureRegistry::new();
        registry.register("legacy.double", Arc::new(|t: f64, _ctx: LegacyContext| t * 2.0));
        let callable = registry.get("legacy.double").unwrap();
        let ctx = LegacyContext {
            delta_sec: 0.016,
            delta_ms: 16.0,
            frame_index: 0,
        };
        assert_eq!(callable.call(21.0, ctx), 42.0);
    }
}
