//! Shared rules and listeners for engine tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use precept_engine::{Action, Condition, Rule, RuleBuilder, RuleListener, Rules, RulesEngineListener};
use precept_foundation::{Error, Facts};

/// A rule that fires while the bool fact `when` is true and records
/// `"<name> fired"` in the `fired` list fact.
pub fn flag_rule(name: &str, priority: i32, when: &'static str) -> Arc<dyn Rule> {
    let fired = format!("{name} fired");
    Arc::new(
        RuleBuilder::new()
            .name(name)
            .priority(priority)
            .when(Condition::new(when, move |_, facts| facts.get_or_default(when, false)))
            .then(Action::new("record", move |_, facts| {
                facts.put(fired.as_str(), true);
                Ok(())
            }))
            .build()
            .unwrap(),
    )
}

/// A rule that always triggers and always fails.
pub fn failing_rule(name: &str, priority: i32) -> Arc<dyn Rule> {
    Arc::new(
        RuleBuilder::new()
            .name(name)
            .priority(priority)
            .when(Condition::new("always", |_, _| Ok(true)))
            .then(Action::new("explode", |_, _| Err(Error::execution("boom"))))
            .build()
            .unwrap(),
    )
}

/// A rule whose condition always errors.
pub fn broken_rule(name: &str, priority: i32) -> Arc<dyn Rule> {
    Arc::new(
        RuleBuilder::new()
            .name(name)
            .priority(priority)
            .when(Condition::new("broken", |_, _| Err(Error::evaluation("bad condition"))))
            .then(Action::new("never", |_, _| Ok(())))
            .build()
            .unwrap(),
    )
}

pub fn registry(rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Rules {
    rules.into_iter().collect()
}

pub fn fired(facts: &Facts, name: &str) -> bool {
    facts.contains(&format!("{name} fired"))
}

/// Logs every callback it receives, optionally vetoing some rules.
#[derive(Default)]
pub struct Recorder {
    pub label: &'static str,
    pub veto: HashSet<String>,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn shared(label: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            label,
            veto: HashSet::new(),
            log: Arc::clone(log),
        })
    }

    pub fn vetoing(label: &'static str, log: &Arc<Mutex<Vec<String>>>, veto: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            label,
            veto: veto.iter().map(|name| (*name).to_string()).collect(),
            log: Arc::clone(log),
        })
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(format!("{}:{entry}", self.label));
    }
}

impl RuleListener for Recorder {
    fn before_evaluate(&self, rule: &dyn Rule, _facts: &Facts) -> bool {
        self.push(format!("before_evaluate {}", rule.name()));
        !self.veto.contains(rule.name())
    }

    fn after_evaluate(&self, rule: &dyn Rule, _facts: &Facts, triggered: bool) {
        self.push(format!("after_evaluate {} {triggered}", rule.name()));
    }

    fn on_evaluation_error(&self, rule: &dyn Rule, _facts: &Facts, _error: &Error) {
        self.push(format!("on_evaluation_error {}", rule.name()));
    }

    fn before_execute(&self, rule: &dyn Rule, _facts: &Facts) {
        self.push(format!("before_execute {}", rule.name()));
    }

    fn on_success(&self, rule: &dyn Rule, _facts: &Facts) {
        self.push(format!("on_success {}", rule.name()));
    }

    fn on_failure(&self, rule: &dyn Rule, _facts: &Facts, error: &Error) {
        self.push(format!("on_failure {} {error}", rule.name()));
    }
}

impl RulesEngineListener for Recorder {
    fn before_evaluate(&self, rules: &Rules, _facts: &Facts) {
        self.push(format!("session_start {}", rules.len()));
    }

    fn after_execute(&self, rules: &Rules, _facts: &Facts) {
        self.push(format!("session_end {}", rules.len()));
    }
}

pub fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}
