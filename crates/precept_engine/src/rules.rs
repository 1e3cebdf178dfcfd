//! The rule registry.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::rule::{Rule, RuleKey};

/// A de-duplicating, priority-ordered set of rules.
///
/// Rules are unique by [`RuleKey`]. Iteration yields rules in ascending
/// order as defined by [`Rule::compare`]; the order is recomputed from the
/// current members on each traversal.
#[derive(Clone, Default)]
pub struct Rules {
    rules: Vec<Arc<dyn Rule>>,
}

impl Rules {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    ///
    /// Returns false if an equal rule is already registered, in which case
    /// the registry is unchanged.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> bool {
        let key = RuleKey::of(rule.as_ref());
        if self.rules.iter().any(|existing| key.matches(existing.as_ref())) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Registers every rule, skipping duplicates.
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        for rule in rules {
            self.register(rule);
        }
    }

    /// Unregisters the rule equal to `rule`.
    ///
    /// Returns true if a rule was removed.
    pub fn unregister(&mut self, rule: &dyn Rule) -> bool {
        let key = RuleKey::of(rule);
        let before = self.rules.len();
        self.rules.retain(|existing| !key.matches(existing.as_ref()));
        self.rules.len() != before
    }

    /// Unregisters every rule with this name.
    ///
    /// Returns the number of rules removed.
    pub fn unregister_by_name(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|existing| existing.name() != name);
        before - self.rules.len()
    }

    /// Removes every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true if a rule equal to `rule` is registered.
    #[must_use]
    pub fn contains(&self, rule: &dyn Rule) -> bool {
        let key = RuleKey::of(rule);
        self.rules.iter().any(|existing| key.matches(existing.as_ref()))
    }

    /// Returns the first rule, in order, with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.iter().find(|rule| rule.name() == name)
    }

    /// Iterates over rules in ascending order.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<dyn Rule>> {
        self.sorted().into_iter()
    }

    /// Returns the rules sorted in ascending order.
    ///
    /// Each rule is placed by its own [`Rule::compare`] against the rules
    /// already placed, so a mix of custom and natural orderings that is not
    /// a total order still yields every rule exactly once. Rules that
    /// compare equal keep registration order.
    #[must_use]
    pub fn sorted(&self) -> Vec<Arc<dyn Rule>> {
        let mut sorted: Vec<Arc<dyn Rule>> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let at = sorted
                .partition_point(|placed| rule.compare(placed.as_ref()) != Ordering::Less);
            sorted.insert(at, Arc::clone(rule));
        }
        sorted
    }
}

impl IntoIterator for &Rules {
    type Item = Arc<dyn Rule>;
    type IntoIter = std::vec::IntoIter<Arc<dyn Rule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorted().into_iter()
    }
}

impl FromIterator<Arc<dyn Rule>> for Rules {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Rule>>>(iter: I) -> Self {
        let mut rules = Self::new();
        rules.register_all(iter);
        rules
    }
}

impl Extend<Arc<dyn Rule>> for Rules {
    fn extend<I: IntoIterator<Item = Arc<dyn Rule>>>(&mut self, iter: I) {
        self.register_all(iter);
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sorted()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
