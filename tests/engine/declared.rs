//! Integration tests for rules declared through the builder

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicI32, Ordering};

use precept_engine::{
    Action, Condition, DefaultRulesEngine, DeclaredRule, EngineParameters, Rule, RuleBuilder,
    Rules, RulesEngine,
};
use precept_foundation::{Error, ErrorKind, Facts};

use crate::support::{Recorder, entries};

fn always() -> Condition {
    Condition::new("always", |_, _| Ok(true))
}

fn append(method: &'static str) -> Action {
    Action::new(method, move |_, facts| {
        let mut trail: String = facts.get_or_default("trail", String::new())?;
        trail.push_str(method);
        facts.put("trail", trail);
        Ok(())
    })
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn rejects_incomplete_declarations() {
    let no_condition = RuleBuilder::new().name("r").then(append("a")).build();
    assert!(matches!(
        no_condition.unwrap_err().kind,
        ErrorKind::InvalidDefinition(_)
    ));

    let no_action = RuleBuilder::new().name("r").when(always()).build();
    assert!(matches!(
        no_action.unwrap_err().kind,
        ErrorKind::InvalidDefinition(_)
    ));
}

#[test]
fn rejects_malformed_fact_declarations() {
    let empty = RuleBuilder::new()
        .when(always().fact(""))
        .then(append("a"))
        .build();
    assert!(empty.is_err());

    let twice = RuleBuilder::new()
        .when(always())
        .then(append("a").fact("x").fact("x"))
        .build();
    assert!(twice.unwrap_err().to_string().contains("more than once"));
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn generated_description_lists_methods() {
    let rule = DeclaredRule::builder()
        .name("weather")
        .when(Condition::new("it rains", |_, _| Ok(true)))
        .then(append("umbrella").order(2))
        .then(append("boots").order(1))
        .build()
        .unwrap();

    assert_eq!(rule.description(), "when it rains then boots,umbrella");
    assert_eq!(rule.to_string(), "weather");
    assert_eq!(rule.condition().method(), "it rains");
    assert_eq!(
        rule.actions().iter().map(Action::method).collect::<Vec<_>>(),
        vec!["boots", "umbrella"]
    );
}

#[test]
fn explicit_description_is_kept() {
    let rule = RuleBuilder::new()
        .description("if it rains then take an umbrella")
        .when(always())
        .then(append("a"))
        .build()
        .unwrap();
    assert_eq!(rule.description(), "if it rains then take an umbrella");
    assert_eq!(rule.name(), "rule");
}

// =============================================================================
// Evaluation and Execution
// =============================================================================

#[test]
fn declared_facts_are_bound() {
    let rule = RuleBuilder::new()
        .when(
            Condition::new("adult", |b, _| Ok(b.require::<i64>("age")? >= 18))
                .fact("age"),
        )
        .then(append("a"))
        .build()
        .unwrap();

    let mut facts = Facts::new();
    facts.put("age", 18);
    assert!(rule.evaluate(&facts).unwrap());

    facts.put("age", 17);
    assert!(!rule.evaluate(&facts).unwrap());

    // Missing or mistyped declared facts make the condition false.
    facts.remove("age");
    assert!(!rule.evaluate(&facts).unwrap());
    facts.put("age", "old");
    assert!(!rule.evaluate(&facts).unwrap());
}

#[test]
fn actions_run_in_order_until_one_fails() {
    let rule = RuleBuilder::new()
        .when(always())
        .then(append("a").order(1))
        .then(Action::new("fail", |_, _| Err(Error::execution("stop"))).order(2))
        .then(append("c").order(3))
        .build()
        .unwrap();

    let mut facts = Facts::new();
    let err = rule.execute(&mut facts).unwrap_err();

    assert_eq!(err.to_string(), "execution failed: stop");
    assert_eq!(facts.require::<String>("trail").unwrap(), "a");
}

#[test]
fn missing_action_fact_fails_the_rule() {
    let rule = RuleBuilder::new()
        .name("partial")
        .when(always())
        .then(append("a"))
        .then(append("b").fact("absent"))
        .then(append("c"))
        .build()
        .unwrap();
    let rules: Rules = [Arc::new(rule) as Arc<dyn Rule>].into_iter().collect();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = DefaultRulesEngine::with_parameters(
        EngineParameters::new().with_skip_on_first_applied_rule(true),
    );
    engine.register_rule_listener(Recorder::shared("l", &log));

    let mut facts = Facts::new();
    let summary = engine.fire(&rules, &mut facts);

    assert_eq!(facts.require::<String>("trail").unwrap(), "a");
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        entries(&log),
        vec![
            "l:before_evaluate partial",
            "l:after_evaluate partial true",
            "l:before_execute partial",
            "l:on_failure partial no fact named 'absent' found in known facts",
        ]
    );
}

#[test]
fn execution_errors_name_the_failing_action() {
    let rule = RuleBuilder::new()
        .name("exploding")
        .when(always())
        .then(Action::new("explode", |_, _| Err(Error::execution("boom"))))
        .build()
        .unwrap();

    let err = rule.execute(&mut Facts::new()).unwrap_err();
    let context = err.context.unwrap();
    assert_eq!(context.rule.as_deref(), Some("exploding"));
    assert_eq!(context.stack, vec!["explode".to_string()]);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn dynamic_priority_is_read_on_each_traversal() {
    let priority = Arc::new(AtomicI32::new(10));
    let source = Arc::clone(&priority);
    let dynamic = RuleBuilder::new()
        .name("dynamic")
        .priority_fn(move || source.load(Ordering::SeqCst))
        .when(always())
        .then(append("d"))
        .build()
        .unwrap();
    let fixed = RuleBuilder::new()
        .name("fixed")
        .priority(5)
        .when(always())
        .then(append("f"))
        .build()
        .unwrap();

    let rules: Rules = [Arc::new(dynamic) as Arc<dyn Rule>, Arc::new(fixed) as Arc<dyn Rule>]
        .into_iter()
        .collect();

    let mut facts = Facts::new();
    DefaultRulesEngine::new().fire(&rules, &mut facts);
    assert_eq!(facts.require::<String>("trail").unwrap(), "fd");

    priority.store(1, Ordering::SeqCst);
    let mut facts = Facts::new();
    DefaultRulesEngine::new().fire(&rules, &mut facts);
    assert_eq!(facts.require::<String>("trail").unwrap(), "df");
}

#[test]
fn custom_ordering_overrides_priority() {
    let by_name_desc = |a: &dyn Rule, b: &dyn Rule| b.name().cmp(a.name());
    let first = RuleBuilder::new()
        .name("zzz")
        .priority(100)
        .ordering(by_name_desc)
        .when(always())
        .then(append("z"))
        .build()
        .unwrap();
    let other = RuleBuilder::new()
        .name("aaa")
        .priority(1)
        .ordering(by_name_desc)
        .when(always())
        .then(append("a"))
        .build()
        .unwrap();

    let rules: Rules = [Arc::new(other) as Arc<dyn Rule>, Arc::new(first) as Arc<dyn Rule>]
        .into_iter()
        .collect();
    assert_eq!(rules.sorted()[0].name(), "zzz");
}
