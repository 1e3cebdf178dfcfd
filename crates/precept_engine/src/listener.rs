//! Listener protocol.
//!
//! Engines notify two kinds of listeners:
//! - [`RuleListener`] around the evaluation and execution of each rule
//! - [`RulesEngineListener`] around a whole `fire` or `check` session
//!
//! Every callback has a no-op default. Listeners are called in
//! registration order.

use precept_foundation::{Error, Facts};

use crate::rule::Rule;
use crate::rules::Rules;

/// Observes the lifecycle of individual rules.
pub trait RuleListener: Send + Sync {
    /// Called before a rule is evaluated.
    ///
    /// Returning false vetoes the rule: it is neither evaluated nor executed
    /// and no other callback fires for it.
    fn before_evaluate(&self, _rule: &dyn Rule, _facts: &Facts) -> bool {
        true
    }

    /// Called after a rule is evaluated without error.
    fn after_evaluate(&self, _rule: &dyn Rule, _facts: &Facts, _triggered: bool) {}

    /// Called when a rule condition returns an error.
    fn on_evaluation_error(&self, _rule: &dyn Rule, _facts: &Facts, _error: &Error) {}

    /// Called before a triggered rule is executed.
    fn before_execute(&self, _rule: &dyn Rule, _facts: &Facts) {}

    /// Called after a rule executes successfully.
    fn on_success(&self, _rule: &dyn Rule, _facts: &Facts) {}

    /// Called when a rule action returns an error.
    fn on_failure(&self, _rule: &dyn Rule, _facts: &Facts, _error: &Error) {}
}

/// Observes whole firing sessions.
pub trait RulesEngineListener: Send + Sync {
    /// Called before the rules are evaluated.
    fn before_evaluate(&self, _rules: &Rules, _facts: &Facts) {}

    /// Called after the rules have been processed.
    fn after_execute(&self, _rules: &Rules, _facts: &Facts) {}
}
