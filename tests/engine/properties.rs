//! Property tests for ordering and parameter semantics

use std::collections::BTreeSet;
use std::sync::Arc;

use precept_engine::{
    Action, Condition, DefaultRulesEngine, EngineParameters, Rule, RuleBuilder, Rules, RulesEngine,
};
use precept_foundation::Facts;
use proptest::prelude::*;

/// A rule that always fires and counts its executions in `runs`.
fn counting(name: &str, priority: i32) -> Arc<dyn Rule> {
    Arc::new(
        RuleBuilder::new()
            .name(name)
            .priority(priority)
            .when(Condition::new("always", |_, _| Ok(true)))
            .then(Action::new("count", |_, facts| {
                let runs = facts.get_or_default::<i64>("runs", 0)?;
                facts.put("runs", runs + 1);
                Ok(())
            }))
            .build()
            .unwrap(),
    )
}

fn specs() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec(("[a-e]{1,2}", -5..5_i32), 0..16)
}

fn build(specs: &[(String, i32)]) -> Rules {
    specs.iter().map(|(name, priority)| counting(name, *priority)).collect()
}

proptest! {
    #[test]
    fn iteration_is_sorted_and_unique(specs in specs()) {
        let rules = build(&specs);
        let order: Vec<(i32, String)> = rules
            .iter()
            .map(|rule| (rule.priority(), rule.name().to_string()))
            .collect();

        let expected: Vec<(i32, String)> = specs
            .iter()
            .map(|(name, priority)| (*priority, name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn threshold_limits_executions(specs in specs(), threshold in -6..6_i32) {
        let rules = build(&specs);
        let engine = DefaultRulesEngine::with_parameters(
            EngineParameters::new().with_priority_threshold(threshold),
        );
        let mut facts = Facts::new();
        engine.fire(&rules, &mut facts);

        let expected = rules.iter().filter(|rule| rule.priority() <= threshold).count();
        let runs = facts.get_or_default::<i64>("runs", 0).unwrap();
        prop_assert_eq!(usize::try_from(runs).unwrap(), expected);
    }

    #[test]
    fn skip_on_first_applied_runs_at_most_one(specs in specs()) {
        let rules = build(&specs);
        let engine = DefaultRulesEngine::with_parameters(
            EngineParameters::new().with_skip_on_first_applied_rule(true),
        );
        let mut facts = Facts::new();
        let summary = engine.fire(&rules, &mut facts);

        let expected = usize::from(!rules.is_empty());
        prop_assert_eq!(summary.succeeded, expected);
    }

    #[test]
    fn check_never_changes_facts(specs in specs()) {
        let rules = build(&specs);
        let facts = Facts::new();
        let report = DefaultRulesEngine::new().check(&rules, &facts);
        prop_assert_eq!(report.len(), rules.len());
        prop_assert!(facts.is_empty());
    }
}
