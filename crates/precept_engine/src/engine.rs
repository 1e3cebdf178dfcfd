//! Rules engines.
//!
//! Two strategies share the same listener protocol and parameters:
//! - [`DefaultRulesEngine`] walks the registry once in order
//! - [`InferenceRulesEngine`] repeatedly fires the rules whose conditions
//!   currently hold until none do

mod default;
mod inference;

pub use default::DefaultRulesEngine;
pub use inference::InferenceRulesEngine;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use precept_foundation::Facts;
use tracing::debug;

use crate::listener::{RuleListener, RulesEngineListener};
use crate::parameters::EngineParameters;
use crate::rule::{Rule, RuleKey};
use crate::rules::Rules;

// =============================================================================
// Rules Engine
// =============================================================================

/// Common surface of the rules engines.
pub trait RulesEngine {
    /// Returns a copy of the engine parameters.
    fn parameters(&self) -> EngineParameters;

    /// Returns the registered rule listeners, in call order.
    fn rule_listeners(&self) -> &[Arc<dyn RuleListener>];

    /// Returns the registered session listeners, in call order.
    fn rules_engine_listeners(&self) -> &[Arc<dyn RulesEngineListener>];

    /// Evaluates the rules and executes those that trigger.
    ///
    /// Rule errors are reported to listeners and never returned.
    fn fire(&self, rules: &Rules, facts: &mut Facts) -> FireSummary;

    /// Evaluates the rules without executing them.
    fn check(&self, rules: &Rules, facts: &Facts) -> CheckReport;
}

// =============================================================================
// Engine Core
// =============================================================================

/// Parameters and listeners shared by both engines.
#[derive(Clone, Default)]
pub(crate) struct EngineCore {
    pub(crate) parameters: EngineParameters,
    pub(crate) rule_listeners: Vec<Arc<dyn RuleListener>>,
    pub(crate) rules_engine_listeners: Vec<Arc<dyn RulesEngineListener>>,
}

impl EngineCore {
    pub(crate) fn new(parameters: EngineParameters) -> Self {
        Self {
            parameters,
            rule_listeners: Vec::new(),
            rules_engine_listeners: Vec::new(),
        }
    }

    pub(crate) fn before_rules(&self, rules: &Rules, facts: &Facts) {
        for listener in &self.rules_engine_listeners {
            listener.before_evaluate(rules, facts);
        }
    }

    pub(crate) fn after_rules(&self, rules: &Rules, facts: &Facts) {
        for listener in &self.rules_engine_listeners {
            listener.after_execute(rules, facts);
        }
    }

    /// Logs the parameters, rules, and facts of a session.
    pub(crate) fn log_session(&self, rules: &Rules, facts: &Facts) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        debug!("{}", self.parameters);
        debug!("Registered rules:");
        for rule in rules {
            debug!("{}", RuleKey::of(rule.as_ref()));
        }
        debug!("Known facts:");
        for fact in facts {
            debug!("{fact}");
        }
    }
}

/// Implements listener registration and [`RulesEngine`] for an engine
/// holding an `EngineCore` in its `core` field and providing inherent
/// `fire_rules` and `check_rules` methods.
macro_rules! impl_rules_engine {
    ($engine:ty) => {
        impl $engine {
            /// Appends a rule listener.
            pub fn register_rule_listener(
                &mut self,
                listener: ::std::sync::Arc<dyn $crate::listener::RuleListener>,
            ) {
                self.core.rule_listeners.push(listener);
            }

            /// Appends several rule listeners, in order.
            pub fn register_rule_listeners(
                &mut self,
                listeners: impl IntoIterator<
                    Item = ::std::sync::Arc<dyn $crate::listener::RuleListener>,
                >,
            ) {
                self.core.rule_listeners.extend(listeners);
            }

            /// Appends a session listener.
            pub fn register_rules_engine_listener(
                &mut self,
                listener: ::std::sync::Arc<dyn $crate::listener::RulesEngineListener>,
            ) {
                self.core.rules_engine_listeners.push(listener);
            }

            /// Appends several session listeners, in order.
            pub fn register_rules_engine_listeners(
                &mut self,
                listeners: impl IntoIterator<
                    Item = ::std::sync::Arc<dyn $crate::listener::RulesEngineListener>,
                >,
            ) {
                self.core.rules_engine_listeners.extend(listeners);
            }
        }

        impl $crate::engine::RulesEngine for $engine {
            fn parameters(&self) -> $crate::parameters::EngineParameters {
                self.core.parameters.clone()
            }

            fn rule_listeners(&self) -> &[::std::sync::Arc<dyn $crate::listener::RuleListener>] {
                &self.core.rule_listeners
            }

            fn rules_engine_listeners(
                &self,
            ) -> &[::std::sync::Arc<dyn $crate::listener::RulesEngineListener>] {
                &self.core.rules_engine_listeners
            }

            fn fire(
                &self,
                rules: &$crate::rules::Rules,
                facts: &mut ::precept_foundation::Facts,
            ) -> $crate::engine::FireSummary {
                self.fire_rules(rules, facts)
            }

            fn check(
                &self,
                rules: &$crate::rules::Rules,
                facts: &::precept_foundation::Facts,
            ) -> $crate::engine::CheckReport {
                self.check_rules(rules, facts)
            }
        }
    };
}

pub(crate) use impl_rules_engine;

// =============================================================================
// Fire Summary
// =============================================================================

/// Why a pass stopped before reaching the end of the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// A rule's priority exceeded the threshold.
    PriorityThreshold {
        /// The first rule above the threshold
        rule: String,
        /// Its priority
        priority: i32,
    },
    /// A rule executed successfully with `skip_on_first_applied_rule` set.
    FirstApplied {
        /// The applied rule
        rule: String,
    },
    /// A rule failed with `skip_on_first_failed_rule` set.
    FirstFailed {
        /// The failed rule
        rule: String,
    },
    /// A rule did not trigger, or errored, with
    /// `skip_on_first_non_triggered_rule` set.
    FirstNonTriggered {
        /// The non-triggered rule
        rule: String,
    },
    /// The inference engine ran `max_iterations` passes with candidates left.
    IterationLimit {
        /// The configured limit
        limit: usize,
    },
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriorityThreshold { rule, priority } => {
                write!(f, "priority threshold exceeded at rule '{rule}' with priority={priority}")
            }
            Self::FirstApplied { rule } => write!(f, "first applied rule '{rule}'"),
            Self::FirstFailed { rule } => write!(f, "first failed rule '{rule}'"),
            Self::FirstNonTriggered { rule } => write!(f, "first non-triggered rule '{rule}'"),
            Self::IterationLimit { limit } => write!(f, "iteration limit ({limit}) reached"),
        }
    }
}

/// Counters describing a `fire` session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FireSummary {
    /// Rules whose condition was evaluated (including errors)
    pub evaluated: usize,
    /// Rules vetoed by a listener
    pub vetoed: usize,
    /// Rules whose condition held
    pub triggered: usize,
    /// Rules executed successfully
    pub succeeded: usize,
    /// Rules whose execution failed
    pub failed: usize,
    /// Conditions that returned an error
    pub evaluation_errors: usize,
    /// Passes over the registry
    pub iterations: usize,
    /// Why the most recent pass stopped early, if it did
    pub halt: Option<Halt>,
}

impl FireSummary {
    /// Returns true if the session stopped early.
    #[must_use]
    pub fn halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Folds the counters of one pass into this summary.
    pub(crate) fn absorb(&mut self, pass: FireSummary) {
        self.evaluated += pass.evaluated;
        self.vetoed += pass.vetoed;
        self.triggered += pass.triggered;
        self.succeeded += pass.succeeded;
        self.failed += pass.failed;
        self.evaluation_errors += pass.evaluation_errors;
        self.iterations += pass.iterations;
        self.halt = pass.halt;
    }
}

// =============================================================================
// Check Report
// =============================================================================

/// Outcome of a `check` session: one entry per evaluated rule, in order.
#[derive(Clone, Default)]
pub struct CheckReport {
    entries: Vec<(Arc<dyn Rule>, bool)>,
}

impl CheckReport {
    pub(crate) fn push(&mut self, rule: Arc<dyn Rule>, triggered: bool) {
        self.entries.push((rule, triggered));
    }

    /// Returns the result of the first evaluated rule with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(rule, _)| rule.name() == name)
            .map(|(_, triggered)| *triggered)
    }

    /// Returns the result of the rule equal to `rule`.
    #[must_use]
    pub fn get_rule(&self, rule: &dyn Rule) -> Option<bool> {
        let key = RuleKey::of(rule);
        self.entries
            .iter()
            .find(|(evaluated, _)| key.matches(evaluated.as_ref()))
            .map(|(_, triggered)| *triggered)
    }

    /// Iterates over evaluated rules and their results, in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&dyn Rule, bool)> {
        self.entries
            .iter()
            .map(|(rule, triggered)| (rule.as_ref(), *triggered))
    }

    /// Iterates over the rules whose condition held.
    pub fn triggered(&self) -> impl Iterator<Item = &dyn Rule> {
        self.iter()
            .filter(|(_, triggered)| *triggered)
            .map(|(rule, _)| rule)
    }

    /// Returns the number of evaluated rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no rule was evaluated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the report into a map keyed by rule identity.
    #[must_use]
    pub fn into_map(self) -> HashMap<RuleKey, bool> {
        self.entries
            .into_iter()
            .map(|(rule, triggered)| (RuleKey::of(rule.as_ref()), triggered))
            .collect()
    }
}

impl fmt::Debug for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(rule, triggered)| (rule.name(), triggered)))
            .finish()
    }
}

// =============================================================================
// Shared Pass
// =============================================================================

/// Asks the rule listeners, in order, whether `rule` may be evaluated.
///
/// Stops at the first veto.
fn should_evaluate(listeners: &[Arc<dyn RuleListener>], rule: &dyn Rule, facts: &Facts) -> bool {
    listeners
        .iter()
        .all(|listener| listener.before_evaluate(rule, facts))
}
