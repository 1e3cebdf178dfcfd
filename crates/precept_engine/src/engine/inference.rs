//! Forward-chaining engine.

use precept_foundation::{Error, Facts, SemanticLimit};
use tracing::{debug, warn};

use super::default::{check_pass, run_pass};
use super::{CheckReport, EngineCore, FireSummary, Halt, impl_rules_engine};
use crate::parameters::EngineParameters;
use crate::rules::Rules;

/// Fires candidate rules repeatedly until no rule's condition holds.
///
/// Each iteration selects the rules whose condition currently holds and
/// runs a single pass over them with the engine parameters. Actions are
/// expected to change the facts so that their own condition eventually
/// stops holding; `max_iterations` bounds the loop otherwise.
#[derive(Clone, Default)]
pub struct InferenceRulesEngine {
    core: EngineCore,
}

impl InferenceRulesEngine {
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

        let parameters = &self.core.parameters;
        let mut summary = FireSummary::default();
        loop {
            debug!("Selecting candidate rules based on the following facts: {facts}");
            let candidates = select_candidates(rules, facts);
            if candidates.is_empty() {
                debug!(
                    "No candidate rules left, fixpoint reached after {} iterations",
                    summary.iterations
                );
                break;
            }

            if let Some(limit) = parameters.max_iterations {
                if summary.iterations >= limit {
                    let err = Error::limit_exceeded(SemanticLimit::MaxIterations { limit });
                    warn!("{err}, {} candidate rules left unfired", candidates.len());
                    summary.halt = Some(Halt::IterationLimit { limit });
                    break;
                }
            }

            debug!("Firing {} candidate rules", candidates.len());
            let pass = run_pass(&candidates, facts, parameters, &self.core.rule_listeners);
            summary.absorb(pass);
        }

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

impl_rules_engine!(InferenceRulesEngine);

/// Returns the rules whose condition currently holds.
///
/// Listeners are not consulted. A rule whose condition errors is not a
/// candidate.
fn select_candidates(rules: &Rules, facts: &Facts) -> Rules {
    rules
        .iter()
        .filter(|rule| match rule.evaluate(facts) {
            Ok(triggered) => triggered,
            Err(err) => {
                warn!(
                    "Rule '{}' ignored during candidate selection: {err}",
                    rule.name()
                );
                false
            }
        })
        .collect()
}
