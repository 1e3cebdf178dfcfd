//! Trace event and record types.
//!
//! Events mirror the listener callbacks of the engines, one event per
//! callback.

use precept_foundation::{Facts, Value};
use serde::Serialize;

// =============================================================================
// Trace Event
// =============================================================================

/// Events recorded while an engine fires or checks rules.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceEvent {
    /// A `fire` or `check` session has started.
    SessionStart {
        /// Number of registered rules.
        rules: usize,
        /// Facts known when the session started, in insertion order.
        facts: Vec<(String, Value)>,
    },

    /// A session has ended.
    SessionEnd {
        /// Facts known when the session ended, in insertion order.
        facts: Vec<(String, Value)>,
    },

    /// A rule condition was evaluated.
    RuleEvaluated {
        /// The evaluated rule.
        rule: String,
        /// Whether the condition held.
        triggered: bool,
    },

    /// A rule condition returned an error.
    EvaluationError {
        /// The rule.
        rule: String,
        /// The error message.
        error: String,
    },

    /// A rule is about to execute.
    RuleExecuting {
        /// The rule.
        rule: String,
    },

    /// A rule executed successfully.
    RuleSucceeded {
        /// The rule.
        rule: String,
    },

    /// A rule action returned an error.
    RuleFailed {
        /// The rule.
        rule: String,
        /// The error message.
        error: String,
    },
}

impl TraceEvent {
    /// Snapshots the facts of a store.
    #[must_use]
    pub fn snapshot(facts: &Facts) -> Vec<(String, Value)> {
        facts
            .iter()
            .map(|fact| (fact.name().to_string(), fact.value().clone()))
            .collect()
    }

    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStart { .. } => "session-start",
            Self::SessionEnd { .. } => "session-end",
            Self::RuleEvaluated { .. } => "rule-evaluated",
            Self::EvaluationError { .. } => "evaluation-error",
            Self::RuleExecuting { .. } => "rule-executing",
            Self::RuleSucceeded { .. } => "rule-succeeded",
            Self::RuleFailed { .. } => "rule-failed",
        }
    }

    /// Returns the rule this event concerns, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::SessionStart { .. } | Self::SessionEnd { .. } => None,
            Self::RuleEvaluated { rule, .. }
            | Self::EvaluationError { rule, .. }
            | Self::RuleExecuting { rule }
            | Self::RuleSucceeded { rule }
            | Self::RuleFailed { rule, .. } => Some(rule),
        }
    }

    /// Returns true if this is a session boundary event.
    #[must_use]
    pub fn is_session_boundary(&self) -> bool {
        matches!(self, Self::SessionStart { .. } | Self::SessionEnd { .. })
    }

    /// Returns true if this event reports an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::EvaluationError { .. } | Self::RuleFailed { .. })
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped trace record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceRecord {
    /// Unique, monotonically increasing record ID.
    pub id: u64,
    /// The session during which this event occurred (0 before any session).
    pub session: u64,
    /// Timestamp in nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The trace event.
    #[serde(flatten)]
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, session: u64, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            session,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
