//! Periodic alert rule evaluation.
//!
//! [`AlertEngine`] owns the three source capabilities and the notifier.
//! [`AlertEngine::tick`] runs one evaluation pass; [`AlertEngine::run`] and
//! [`AlertEngine::start`] drive passes on a fixed interval until cancelled.

use std::sync::Arc;

use crate::notifier::BreachNotifier;
use crate::sources::{EventSink, RuleSource, SampleSource};

pub mod evaluation;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use evaluation::{PassSummary, RuleOutcome};
pub use scheduler::EngineHandle;

/// The rule evaluation engine.
///
/// Cloning is cheap; all collaborators are shared.
#[derive(Clone)]
pub struct AlertEngine {
    rules: Arc<dyn RuleSource>,
    samples: Arc<dyn SampleSource>,
    events: Arc<dyn EventSink>,
    notifier: Arc<dyn BreachNotifier>,
    rule_scope: Option<String>,
}

impl AlertEngine {
    pub fn new(
        rules: Arc<dyn RuleSource>,
        samples: Arc<dyn SampleSource>,
        events: Arc<dyn EventSink>,
        notifier: Arc<dyn BreachNotifier>,
    ) -> Self {
        Self {
            rules,
            samples,
            events,
            notifier,
            rule_scope: None,
        }
    }

    /// Only evaluate rules targeting `service`. `None` evaluates all.
    pub fn with_rule_scope(mut self, service: Option<String>) -> Self {
        self.rule_scope = service;
        self
    }
}
