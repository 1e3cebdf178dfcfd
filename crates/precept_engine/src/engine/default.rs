//! Single-pass engine.

use std::sync::Arc;

use precept_foundation::Facts;
use tracing::{debug, error, warn};

use super::{CheckReport, EngineCore, FireSummary, Halt, impl_rules_engine, should_evaluate};
use crate::listener::RuleListener;
use crate::parameters::EngineParameters;
use crate::rules::Rules;

/// Evaluates every rule once, in order, and executes those that trigger.
///
/// Parameters are applied to all registered rules.
#[derive(Clone, Default)]
pub struct DefaultRulesEngine {
    core: EngineCore,
}

impl DefaultRulesEngine {
    /// Creates an engine with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given parameters.
    #[must_use]
    pub fn with_parameters(parameters: EngineParameters) -> Self {
        Self {
            core: EngineCore::new(parameters),
        }
    }

    fn fire_rules(&self, rules: &Rules, facts: &mut Facts) -> FireSummary {
        if rules.is_empty() {
            warn!("No rules registered! Nothing to apply");
            return FireSummary::default();
        }

        self.core.before_rules(rules, facts);
        self.core.log_session(rules, facts);
        debug!("Rules evaluation started");
        let summary = run_pass(rules, facts, &self.core.parameters, &self.core.rule_listeners);
        self.core.after_rules(rules, facts);
        summary
    }

    fn check_rules(&self, rules: &Rules, facts: &Facts) -> CheckReport {
        self.core.before_rules(rules, facts);
        let report = check_pass(rules, facts, &self.core.rule_listeners);
        self.core.after_rules(rules, facts);
        report
    }
}

impl_rules_engine!(DefaultRulesEngine);

// =============================================================================
// Passes
// =============================================================================

/// Walks `rules` once in order, applying the parameters.
pub(super) fn run_pass(
    rules: &Rules,
    facts: &mut Facts,
    parameters: &EngineParameters,
    listeners: &[Arc<dyn RuleListener>],
) -> FireSummary {
    let mut summary = FireSummary {
        iterations: 1,
        ..FireSummary::default()
    };

    for rule in rules {
        let rule = rule.as_ref();
        let name = rule.name();
        let priority = rule.priority();

        if priority > parameters.priority_threshold {
            debug!(
                "Rule priority threshold ({}) exceeded at rule '{}' with priority={}, next rules will be skipped",
                parameters.priority_threshold, name, priority
            );
            summary.halt = Some(Halt::PriorityThreshold {
                rule: name.to_string(),
                priority,
            });
            break;
        }

        if !should_evaluate(listeners, rule, facts) {
            debug!("Rule '{name}' has been skipped before being evaluated");
            summary.vetoed += 1;
            continue;
        }

        summary.evaluated += 1;
        let triggered = match rule.evaluate(facts) {
            Ok(triggered) => triggered,
            Err(err) => {
                error!("Rule '{name}' evaluated with error: {err}");
                summary.evaluation_errors += 1;
                for listener in listeners {
                    listener.on_evaluation_error(rule, facts, &err);
                }
                if parameters.skip_on_first_non_triggered_rule {
                    debug!("Next rules will be skipped since parameter skip_on_first_non_triggered_rule is set");
                    summary.halt = Some(Halt::FirstNonTriggered {
                        rule: name.to_string(),
                    });
                    break;
                }
                continue;
            }
        };

        if triggered {
            debug!("Rule '{name}' triggered");
            summary.triggered += 1;
            for listener in listeners {
                listener.after_evaluate(rule, facts, true);
            }
            for listener in listeners {
                listener.before_execute(rule, facts);
            }

            match rule.execute(facts) {
                Ok(()) => {
                    debug!("Rule '{name}' performed successfully");
                    summary.succeeded += 1;
                    for listener in listeners {
                        listener.on_success(rule, facts);
                    }
                    if parameters.skip_on_first_applied_rule {
                        debug!("Next rules will be skipped since parameter skip_on_first_applied_rule is set");
                        summary.halt = Some(Halt::FirstApplied {
                            rule: name.to_string(),
                        });
                        break;
                    }
                }
                Err(err) => {
                    error!("Rule '{name}' performed with error: {err}");
                    summary.failed += 1;
                    for listener in listeners {
                        listener.on_failure(rule, facts, &err);
                    }
                    if parameters.skip_on_first_failed_rule {
                        debug!("Next rules will be skipped since parameter skip_on_first_failed_rule is set");
                        summary.halt = Some(Halt::FirstFailed {
                            rule: name.to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            debug!("Rule '{name}' has been evaluated to false, it has not been executed");
            for listener in listeners {
                listener.after_evaluate(rule, facts, false);
            }
            if parameters.skip_on_first_non_triggered_rule {
                debug!("Next rules will be skipped since parameter skip_on_first_non_triggered_rule is set");
                summary.halt = Some(Halt::FirstNonTriggered {
                    rule: name.to_string(),
                });
                break;
            }
        }
    }

    summary
}

/// Evaluates every non-vetoed rule without executing anything.
///
/// Errors are reported to listeners and recorded as not triggered.
pub(super) fn check_pass(
    rules: &Rules,
    facts: &Facts,
    listeners: &[Arc<dyn RuleListener>],
) -> CheckReport {
    debug!("Checking rules");
    let mut report = CheckReport::default();

    for rule in rules {
        if !should_evaluate(listeners, rule.as_ref(), facts) {
            continue;
        }
        let triggered = match rule.evaluate(facts) {
            Ok(triggered) => triggered,
            Err(err) => {
                error!("Rule '{}' evaluated with error: {err}", rule.name());
                for listener in listeners {
                    listener.on_evaluation_error(rule.as_ref(), facts, &err);
                }
                false
            }
        };
        report.push(rule, triggered);
    }

    report
}

// =============================================================================
// Tests
// =============================================================================
