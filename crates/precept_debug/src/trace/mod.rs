//! Tracing of rules engine sessions.
//!
//! A [`Tracer`] is registered on an engine as both a rule listener and a
//! session listener, and records one [`TraceEvent`] per callback. Recording
//! costs a single atomic load when the tracer is disabled.
//!
//! ```
//! use std::sync::Arc;
//! use precept_debug::{Tracer, TracerConfig};
//! use precept_engine::DefaultRulesEngine;
//!
//! let tracer = Arc::new(Tracer::new(TracerConfig::new().enabled()));
//! let mut engine = DefaultRulesEngine::new();
//! engine.register_rule_listener(tracer.clone());
//! engine.register_rules_engine_listener(tracer.clone());
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use precept_engine::{Rule, RuleListener, Rules, RulesEngineListener};
use precept_foundation::{Error, Facts};

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace output should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (traces still recorded in buffer).
    #[default]
    None,
    /// Write to stderr.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Where to output traces.
    pub output: TraceOutput,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Filter for specific event types (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: TraceBuffer::DEFAULT_SIZE,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to output to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to keep only the given event types, such as
    /// `"rule-failed"`.
    #[must_use]
    pub fn filter_events<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_filter = types.into_iter().map(Into::into).collect();
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Mutable tracer state, guarded by a single lock.
struct TracerState {
    buffer: TraceBuffer,
    session: u64,
    output: TraceOutput,
    json_format: bool,
    event_filter: Vec<String>,
}

/// Records the evaluation and execution of rules.
///
/// Listener callbacks take `&self`, so the tracer keeps its buffer behind
/// a lock and can be shared with an engine through an `Arc`.
pub struct Tracer {
    enabled: AtomicBool,
    state: Mutex<TracerState>,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            state: Mutex::new(TracerState {
                buffer: TraceBuffer::new(config.buffer_size),
                session: 0,
                output: config.output,
                json_format: config.json_format,
                event_filter: config.event_filter,
            }),
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new().with_timestamps(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a tracer with default configuration (disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that outputs to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enables tracing.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disables tracing.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&self, json: bool) {
        self.state.lock().json_format = json;
    }

    /// Sets the trace output destination.
    pub fn set_output(&self, output: TraceOutput) {
        self.state.lock().output = output;
    }

    /// Returns the number of the current (or last) session.
    #[must_use]
    pub fn current_session(&self) -> u64 {
        self.state.lock().session
    }

    /// Records a trace event in the current session.
    #[inline]
    pub fn record(&self, event: TraceEvent) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.lock();
        let session = state.session;
        self.record_locked(&mut state, session, event);
    }

    /// Starts a new session and records its first event.
    fn record_session_start(&self, event: TraceEvent) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.lock();
        state.session += 1;
        let session = state.session;
        self.record_locked(&mut state, session, event);
    }

    fn record_locked(&self, state: &mut TracerState, session: u64, event: TraceEvent) {
        if !state.event_filter.is_empty()
            && !state
                .event_filter
                .iter()
                .any(|allowed| allowed == event.event_type())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        state.buffer.push(session, timestamp_ns, event);

        if state.output == TraceOutput::Stderr {
            if let Some(record) = state.buffer.last() {
                let line = self.format_with(record, state.json_format);
                let _ = writeln!(io::stderr().lock(), "{line}");
            }
        }
    }

    fn format_with(&self, record: &TraceRecord, json: bool) -> String {
        if json {
            self.json_formatter.format(record)
        } else {
            self.human_formatter.format(record)
        }
    }

    /// Formats the most recent records with the configured format.
    #[must_use]
    pub fn format_recent(&self, count: usize) -> String {
        let state = self.state.lock();
        state
            .buffer
            .recent(count)
            .into_iter()
            .map(|record| self.format_with(record, state.json_format))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns a copy of every buffered record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.state.lock().buffer.iter().cloned().collect()
    }

    /// Returns a copy of the records of one session.
    #[must_use]
    pub fn records_for_session(&self, session: u64) -> Vec<TraceRecord> {
        self.state
            .lock()
            .buffer
            .records_for_session(session)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns a copy of the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<TraceRecord> {
        self.state
            .lock()
            .buffer
            .recent(count)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Clears the trace buffer.
    pub fn clear(&self) {
        self.state.lock().buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.state.lock().buffer.stats()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

// =============================================================================
// Listener Integration
// =============================================================================

impl RulesEngineListener for Tracer {
    fn before_evaluate(&self, rules: &Rules, facts: &Facts) {
        if !self.is_enabled() {
            return;
        }
        self.record_session_start(TraceEvent::SessionStart {
            rules: rules.len(),
            facts: TraceEvent::snapshot(facts),
        });
    }

    fn after_execute(&self, _rules: &Rules, facts: &Facts) {
        if !self.is_enabled() {
            return;
        }
        self.record(TraceEvent::SessionEnd {
            facts: TraceEvent::snapshot(facts),
        });
    }
}

impl RuleListener for Tracer {
    fn before_evaluate(&self, _rule: &dyn Rule, _facts: &Facts) -> bool {
        true
    }

    fn after_evaluate(&self, rule: &dyn Rule, _facts: &Facts, triggered: bool) {
        self.record(TraceEvent::RuleEvaluated {
            rule: rule.name().to_string(),
            triggered,
        });
    }

    fn on_evaluation_error(&self, rule: &dyn Rule, _facts: &Facts, error: &Error) {
        self.record(TraceEvent::EvaluationError {
            rule: rule.name().to_string(),
            error: error.to_string(),
        });
    }

    fn before_execute(&self, rule: &dyn Rule, _facts: &Facts) {
        self.record(TraceEvent::RuleExecuting {
            rule: rule.name().to_string(),
        });
    }

    fn on_success(&self, rule: &dyn Rule, _facts: &Facts) {
        self.record(TraceEvent::RuleSucceeded {
            rule: rule.name().to_string(),
        });
    }

    fn on_failure(&self, rule: &dyn Rule, _facts: &Facts, error: &Error) {
        self.record(TraceEvent::RuleFailed {
            rule: rule.name().to_string(),
            error: error.to_string(),
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
