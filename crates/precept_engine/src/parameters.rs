//! Engine parameters.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controls early termination of a firing pass.
///
/// Engines copy their parameters at construction, so changing a value after
/// building an engine has no effect on it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct EngineParameters {
    /// Stop the pass after the first rule that executes successfully.
    pub skip_on_first_applied_rule: bool,
    /// Stop the pass after the first rule that does not trigger.
    pub skip_on_first_non_triggered_rule: bool,
    /// Stop the pass after the first rule whose execution fails.
    pub skip_on_first_failed_rule: bool,
    /// Stop the pass at the first rule with a priority above this value.
    pub priority_threshold: i32,
    /// Maximum passes run by the inference engine (unbounded when `None`).
    pub max_iterations: Option<usize>,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineParameters {
    /// Default priority threshold (no cutoff).
    pub const DEFAULT_PRIORITY_THRESHOLD: i32 = i32::MAX;

    /// Creates parameters with every skip disabled and no threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skip_on_first_applied_rule: false,
            skip_on_first_non_triggered_rule: false,
            skip_on_first_failed_rule: false,
            priority_threshold: Self::DEFAULT_PRIORITY_THRESHOLD,
            max_iterations: None,
        }
    }

    /// Sets whether to stop after the first applied rule.
    #[must_use]
    pub const fn with_skip_on_first_applied_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_applied_rule = skip;
        self
    }

    /// Sets whether to stop after the first non-triggered rule.
    #[must_use]
    pub const fn with_skip_on_first_non_triggered_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_non_triggered_rule = skip;
        self
    }

    /// Sets whether to stop after the first failed rule.
    #[must_use]
    pub const fn with_skip_on_first_failed_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_failed_rule = skip;
        self
    }

    /// Sets the priority threshold.
    #[must_use]
    pub const fn with_priority_threshold(mut self, threshold: i32) -> Self {
        self.priority_threshold = threshold;
        self
    }

    /// Caps the number of inference passes.
    #[must_use]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }
}

impl fmt::Display for EngineParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Engine parameters {{ skip_on_first_applied_rule = {}, \
             skip_on_first_non_triggered_rule = {}, skip_on_first_failed_rule = {}, \
             priority_threshold = {}, max_iterations = ",
            self.skip_on_first_applied_rule,
            self.skip_on_first_non_triggered_rule,
            self.skip_on_first_failed_rule,
            self.priority_threshold,
        )?;
        match self.max_iterations {
            Some(max) => write!(f, "{max} }}"),
            None => write!(f, "unbounded }}"),
        }
    }
}
