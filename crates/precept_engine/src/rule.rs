//! The rule contract.
//!
//! A rule is an identity triple (name, description, priority) plus a
//! condition and an action over a [`Facts`] store. Rules are totally
//! ordered: lower priority values come first, and ties are broken by name.

pub mod declared;

pub use declared::{Action, Condition, DeclaredRule, FactBindings, RuleBuilder};

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use precept_foundation::{Facts, Result};

/// Name used by rules that do not configure one.
pub const DEFAULT_NAME: &str = "rule";

/// Description used by rules that do not configure one.
pub const DEFAULT_DESCRIPTION: &str = "description";

/// Priority used by rules that do not configure one.
pub const DEFAULT_PRIORITY: i32 = i32::MAX - 1;

/// A pluggable comparison between two rules.
pub type RuleOrdering = Arc<dyn Fn(&dyn Rule, &dyn Rule) -> Ordering + Send + Sync>;

// =============================================================================
// Rule
// =============================================================================

/// A condition/action unit fired by an engine.
///
/// `evaluate` should not mutate anything; the engines do not enforce this.
/// Errors returned by either method are caught at the engine boundary and
/// reported to listeners.
pub trait Rule: Send + Sync {
    /// Rule name, unique within a registry together with description and priority.
    fn name(&self) -> &str {
        DEFAULT_NAME
    }

    /// Human readable description.
    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    /// Priority (lower fires first).
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Evaluates the rule condition against the facts.
    ///
    /// # Errors
    /// Returns an error if the condition cannot be evaluated.
    fn evaluate(&self, facts: &Facts) -> Result<bool>;

    /// Executes the rule actions, possibly mutating the facts.
    ///
    /// # Errors
    /// Returns an error if an action fails.
    fn execute(&self, facts: &mut Facts) -> Result<()>;

    /// Compares this rule with another for registry ordering.
    ///
    /// Defaults to priority ascending, then name ascending.
    fn compare(&self, other: &dyn Rule) -> Ordering {
        self.priority()
            .cmp(&other.priority())
            .then_with(|| self.name().cmp(other.name()))
    }
}

/// The natural rule order: priority ascending, then name ascending.
#[must_use]
pub fn natural_order(a: &dyn Rule, b: &dyn Rule) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.name().cmp(b.name()))
}

impl fmt::Debug for dyn Rule + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("description", &self.description())
            .field("priority", &self.priority())
            .finish()
    }
}

// =============================================================================
// Rule Key
// =============================================================================

/// The identity of a rule.
///
/// Two rules are equal iff their keys are equal; behavior is not part of
/// identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleKey {
    /// Rule name
    pub name: String,
    /// Rule description
    pub description: String,
    /// Rule priority
    pub priority: i32,
}

impl RuleKey {
    /// Extracts the identity of a rule.
    #[must_use]
    pub fn of(rule: &dyn Rule) -> Self {
        Self {
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            priority: rule.priority(),
        }
    }

    /// Returns true if the rule has this identity.
    #[must_use]
    pub fn matches(&self, rule: &dyn Rule) -> bool {
        self.priority == rule.priority()
            && self.name == rule.name()
            && self.description == rule.description()
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule {{ name = '{}', description = '{}', priority = '{}' }}",
            self.name, self.description, self.priority
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
