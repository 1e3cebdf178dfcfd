//! Rule registry, listeners, and execution engines for Precept.
//!
//! This crate provides:
//! - [`Rule`] - The condition/action contract and its natural order
//! - [`Rules`] - A de-duplicating, priority-ordered rule registry
//! - [`RuleBuilder`] - Declarative rules built from closures
//! - [`DefaultRulesEngine`] - Single-pass evaluation and execution
//! - [`InferenceRulesEngine`] - Forward chaining to a fixpoint

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod listener;
pub mod parameters;
pub mod rule;
pub mod rules;

pub use engine::{
    CheckReport, DefaultRulesEngine, FireSummary, Halt, InferenceRulesEngine, RulesEngine,
};
pub use listener::{RuleListener, RulesEngineListener};
pub use parameters::EngineParameters;
pub use rule::{
    Action, Condition, DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_PRIORITY, DeclaredRule,
    FactBindings, Rule, RuleBuilder, RuleKey, RuleOrdering, natural_order,
};
pub use rules::Rules;
