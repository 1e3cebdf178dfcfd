//! Declarative rules built from closures.
//!
//! A [`RuleBuilder`] collects a condition, one or more actions, and the
//! names of the facts each of them needs. [`RuleBuilder::build`] validates
//! the declaration and produces a [`DeclaredRule`], which resolves the
//! declared facts before every call:
//!
//! - a declared fact missing at evaluation makes the rule evaluate to false
//! - a type mismatch raised by the condition makes it evaluate to false
//! - an action whose declared fact is missing fails the execution, and no
//!   later action runs
//!
//! Errors leaving a declared rule carry an [`ErrorContext`] naming the rule
//! and the condition or action they came from.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use precept_foundation::{Error, ErrorContext, Facts, FromValue, Result, Value};

use super::{
    DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_PRIORITY, Rule, RuleOrdering, natural_order,
};

type ConditionFn = dyn Fn(&FactBindings, &Facts) -> Result<bool> + Send + Sync;
type ActionFn = dyn Fn(&FactBindings, &mut Facts) -> Result<()> + Send + Sync;
type PriorityFn = dyn Fn() -> i32 + Send + Sync;

// =============================================================================
// Fact Bindings
// =============================================================================

/// Values of the facts declared by a condition or action.
///
/// Bindings are resolved against the store right before the closure runs,
/// in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FactBindings {
    values: Vec<(Arc<str>, Value)>,
}

impl FactBindings {
    /// Resolves each declared name against the store.
    fn resolve(names: &[Arc<str>], facts: &Facts) -> Result<Self> {
        let values = names
            .iter()
            .map(|name| {
                facts
                    .get(name)
                    .cloned()
                    .map(|value| (Arc::clone(name), value))
                    .ok_or_else(|| Error::missing_fact(name.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Returns the bound value of a declared fact.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(bound, _)| bound.as_ref() == name)
            .map(|(_, value)| value)
    }

    /// Returns the bound value of a declared fact converted to `T`.
    ///
    /// # Errors
    /// Returns a missing fact error if `name` was not declared, or a type
    /// mismatch error if the value has another type.
    pub fn require<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| Error::missing_fact(name))?;
        T::from_value(value)
    }

    /// Iterates over bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Condition
// =============================================================================

/// The condition of a declared rule.
#[derive(Clone)]
pub struct Condition {
    method: String,
    facts: Vec<Arc<str>>,
    test: Arc<ConditionFn>,
}

impl Condition {
    /// Creates a condition. `method` names it in the default description.
    pub fn new<F>(method: impl Into<String>, test: F) -> Self
    where
        F: Fn(&FactBindings, &Facts) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            method: method.into(),
            facts: Vec::new(),
            test: Arc::new(test),
        }
    }

    /// Declares a fact to bind before the condition runs.
    #[must_use]
    pub fn fact(mut self, name: impl Into<Arc<str>>) -> Self {
        self.facts.push(name.into());
        self
    }

    /// Returns the condition name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("method", &self.method)
            .field("facts", &self.facts)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Action
// =============================================================================

/// An action of a declared rule.
#[derive(Clone)]
pub struct Action {
    method: String,
    facts: Vec<Arc<str>>,
    order: i32,
    run: Arc<ActionFn>,
}

impl Action {
    /// Creates an action with order 0.
    pub fn new<F>(method: impl Into<String>, run: F) -> Self
    where
        F: Fn(&FactBindings, &mut Facts) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            method: method.into(),
            facts: Vec::new(),
            order: 0,
            run: Arc::new(run),
        }
    }

    /// Sets the execution order (lower runs first).
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Declares a fact to bind before the action runs.
    #[must_use]
    pub fn fact(mut self, name: impl Into<Arc<str>>) -> Self {
        self.facts.push(name.into());
        self
    }

    /// Returns the action name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("method", &self.method)
            .field("facts", &self.facts)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Rule Builder
// =============================================================================

/// Builds a [`DeclaredRule`].
#[derive(Default)]
pub struct RuleBuilder {
    name: Option<String>,
    description: Option<String>,
    priority: Option<i32>,
    priority_fn: Option<Arc<PriorityFn>>,
    condition: Option<Condition>,
    actions: Vec<Action>,
    ordering: Option<RuleOrdering>,
}

impl RuleBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the rule description.
    ///
    /// Passing [`DEFAULT_DESCRIPTION`] keeps the generated description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a fixed priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Computes the priority on every call instead of fixing it.
    ///
    /// Takes precedence over [`RuleBuilder::priority`].
    #[must_use]
    pub fn priority_fn<F>(mut self, priority: F) -> Self
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        self.priority_fn = Some(Arc::new(priority));
        self
    }

    /// Sets the condition.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Replaces the natural order used when this rule is compared.
    #[must_use]
    pub fn ordering<F>(mut self, ordering: F) -> Self
    where
        F: Fn(&dyn Rule, &dyn Rule) -> Ordering + Send + Sync + 'static,
    {
        self.ordering = Some(Arc::new(ordering));
        self
    }

    /// Validates the declaration and builds the rule.
    ///
    /// # Errors
    /// Returns an invalid definition error if the condition is missing,
    /// there are no actions, or a fact name is empty or declared twice.
    pub fn build(self) -> Result<DeclaredRule> {
        let name = self.name.unwrap_or_else(|| DEFAULT_NAME.to_string());

        let Some(condition) = self.condition else {
            return Err(Error::invalid_definition(format!(
                "rule '{name}' must declare a condition"
            )));
        };
        if self.actions.is_empty() {
            return Err(Error::invalid_definition(format!(
                "rule '{name}' must declare at least one action"
            )));
        }

        check_facts(&name, &condition.method, &condition.facts)?;
        for action in &self.actions {
            check_facts(&name, &action.method, &action.facts)?;
        }

        let mut actions = self.actions;
        // Stable, so equal orders keep declaration order.
        actions.sort_by_key(|action| action.order);

        let description = self
            .description
            .filter(|description| description != DEFAULT_DESCRIPTION)
            .unwrap_or_else(|| {
                let methods: Vec<&str> = actions.iter().map(|a| a.method.as_str()).collect();
                format!("when {} then {}", condition.method, methods.join(","))
            });

        Ok(DeclaredRule {
            name,
            description,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            priority_fn: self.priority_fn,
            condition,
            actions,
            ordering: self.ordering,
        })
    }
}

fn check_facts(rule: &str, method: &str, facts: &[Arc<str>]) -> Result<()> {
    let mut seen = HashSet::new();
    for fact in facts {
        if fact.is_empty() {
            return Err(Error::invalid_definition(format!(
                "'{method}' in rule '{rule}' declares a fact with an empty name"
            )));
        }
        if !seen.insert(fact.as_ref()) {
            return Err(Error::invalid_definition(format!(
                "'{method}' in rule '{rule}' declares fact '{fact}' more than once"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Declared Rule
// =============================================================================

/// A rule assembled from a condition and ordered actions.
#[derive(Clone)]
pub struct DeclaredRule {
    name: String,
    description: String,
    priority: i32,
    priority_fn: Option<Arc<PriorityFn>>,
    condition: Condition,
    actions: Vec<Action>,
    ordering: Option<RuleOrdering>,
}

impl DeclaredRule {
    /// Starts a new declaration.
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::new()
    }

    /// Returns the condition.
    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Returns the actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Records `frame` on the error, naming this rule if nothing did yet.
    fn in_frame(&self, mut err: Error, frame: &str) -> Error {
        let context = err
            .context
            .take()
            .unwrap_or_else(|| ErrorContext::new().with_rule(self.name.as_str()));
        err.with_context(context.with_frame(frame))
    }
}

impl Rule for DeclaredRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn priority(&self) -> i32 {
        self.priority_fn.as_ref().map_or(self.priority, |f| f())
    }

    fn evaluate(&self, facts: &Facts) -> Result<bool> {
        let bindings = match FactBindings::resolve(&self.condition.facts, facts) {
            Ok(bindings) => bindings,
            Err(err) if err.is_missing_fact() => {
                tracing::warn!(
                    "Rule '{}' has been evaluated to false due to a declared but missing fact: {}",
                    self.name,
                    err
                );
                return Ok(false);
            }
            Err(err) => return Err(self.in_frame(err, &self.condition.method)),
        };

        match (self.condition.test)(&bindings, facts) {
            Err(err) if err.is_type_mismatch() => {
                tracing::warn!(
                    "Types of injected facts in '{}' in rule '{}' do not match: {}",
                    self.condition.method,
                    self.name,
                    err
                );
                Ok(false)
            }
            result => result.map_err(|err| self.in_frame(err, &self.condition.method)),
        }
    }

    fn execute(&self, facts: &mut Facts) -> Result<()> {
        for action in &self.actions {
            FactBindings::resolve(&action.facts, facts)
                .and_then(|bindings| (action.run)(&bindings, facts))
                .map_err(|err| self.in_frame(err, &action.method))?;
        }
        Ok(())
    }

    fn compare(&self, other: &dyn Rule) -> Ordering {
        match &self.ordering {
            Some(ordering) => ordering(self as &dyn Rule, other),
            None => natural_order(self, other),
        }
    }
}

impl fmt::Debug for DeclaredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredRule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("priority", &self.priority())
            .field("condition", &self.condition)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DeclaredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// Tests
// =============================================================================
