//! Integration tests for rule and session listeners

use std::sync::{Arc, Mutex};

use precept_engine::{
    DefaultRulesEngine, EngineParameters, InferenceRulesEngine, RuleListener, Rules, RulesEngine, RulesEngineListener,
};
use precept_foundation::Facts;

use crate::support::{Recorder, broken_rule, entries, failing_rule, fired, flag_rule, registry};

fn raining() -> Facts {
    let mut facts = Facts::new();
    facts.put("rain", true);
    facts
}

fn engine_with(listeners: &[Arc<Recorder>]) -> DefaultRulesEngine {
    let mut engine = DefaultRulesEngine::new();
    for listener in listeners {
        engine.register_rule_listener(listener.clone());
        engine.register_rules_engine_listener(listener.clone());
    }
    engine
}

#[test]
fn callbacks_run_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::shared("r1", &log), Recorder::shared("r2", &log)]);

    engine.fire(&registry([flag_rule("a", 1, "rain")]), &mut raining());

    assert_eq!(
        entries(&log),
        vec![
            "r1:session_start 1",
            "r2:session_start 1",
            "r1:before_evaluate a",
            "r2:before_evaluate a",
            "r1:after_evaluate a true",
            "r2:after_evaluate a true",
            "r1:before_execute a",
            "r2:before_execute a",
            "r1:on_success a",
            "r2:on_success a",
            "r1:session_end 1",
            "r2:session_end 1",
        ]
    );
}

#[test]
fn non_triggered_rules_only_report_evaluation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::shared("r", &log)]);

    engine.fire(&registry([flag_rule("a", 1, "sun")]), &mut raining());

    assert_eq!(
        entries(&log),
        vec![
            "r:session_start 1",
            "r:before_evaluate a",
            "r:after_evaluate a false",
            "r:session_end 1",
        ]
    );
}

#[test]
fn failures_are_reported_with_the_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::shared("r", &log)]);

    engine.fire(&registry([failing_rule("a", 1)]), &mut Facts::new());

    assert!(entries(&log).contains(&"r:on_failure a execution failed: boom".to_string()));
}

#[test]
fn evaluation_errors_are_reported() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::shared("r", &log)]);

    engine.fire(&registry([broken_rule("a", 1)]), &mut Facts::new());

    let log = entries(&log);
    assert!(log.contains(&"r:on_evaluation_error a".to_string()));
    assert!(!log.iter().any(|entry| entry.contains("after_evaluate")));
}

#[test]
fn any_listener_can_veto() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[
        Recorder::vetoing("r1", &log, &["a"]),
        Recorder::shared("r2", &log),
    ]);
    let mut facts = raining();

    let summary = engine.fire(
        &registry([flag_rule("a", 1, "rain"), flag_rule("b", 2, "rain")]),
        &mut facts,
    );

    assert!(!fired(&facts, "a"));
    assert!(fired(&facts, "b"));
    assert_eq!(summary.vetoed, 1);

    let log = entries(&log);
    // Nothing else hears about a vetoed rule.
    assert!(log.contains(&"r1:before_evaluate a".to_string()));
    assert!(!log.iter().any(|entry| entry.starts_with("r2:") && entry.ends_with(" a")));
    assert!(!log.iter().any(|entry| entry.contains(" a true")));
}

#[test]
fn vetoed_rules_are_left_out_of_check() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::vetoing("r", &log, &["a"])]);

    let report = engine.check(
        &registry([flag_rule("a", 1, "rain"), flag_rule("b", 2, "rain")]),
        &raining(),
    );

    assert_eq!(report.get("a"), None);
    assert_eq!(report.get("b"), Some(true));
}

#[test]
fn empty_fire_skips_session_listeners_but_check_does_not() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(&[Recorder::shared("r", &log)]);

    engine.fire(&Rules::new(), &mut Facts::new());
    assert!(entries(&log).is_empty());

    engine.check(&Rules::new(), &Facts::new());
    assert_eq!(entries(&log), vec!["r:session_start 0", "r:session_end 0"]);
}

#[test]
fn inference_session_wraps_all_iterations() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::shared("r", &log);
    let mut engine =
        InferenceRulesEngine::with_parameters(EngineParameters::new().with_max_iterations(3));
    engine.register_rule_listeners([recorder.clone() as Arc<dyn RuleListener>]);
    engine.register_rules_engine_listeners([recorder as Arc<dyn RulesEngineListener>]);

    let mut facts = raining();
    let rules = registry([flag_rule("a", 1, "rain"), flag_rule("b", 2, "sun")]);
    engine.fire(&rules, &mut facts);

    let log = entries(&log);
    assert_eq!(log.first().map(String::as_str), Some("r:session_start 2"));
    assert_eq!(log.last().map(String::as_str), Some("r:session_end 2"));
    assert_eq!(log.iter().filter(|entry| entry.contains("session")).count(), 2);
    assert_eq!(log.iter().filter(|entry| entry.contains("on_success a")).count(), 3);
    assert_eq!(engine.rule_listeners().len(), 1);
    assert_eq!(engine.rules_engine_listeners().len(), 1);
}
