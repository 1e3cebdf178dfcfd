//! Precept - Rule orchestration engine
//!
//! This crate re-exports all layers of the Precept system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: precept_debug      - Trace listener, trace buffer, formatters
//! Layer 1: precept_engine     - Rules, registry, listeners, engines
//! Layer 0: precept_foundation - Core types (Value, Facts, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use precept::prelude::*;
//!
//! let rule = RuleBuilder::new()
//!     .name("weather rule")
//!     .when(Condition::new("is raining", |_, facts| facts.get_or_default("rain", false)))
//!     .then(Action::new("take an umbrella", |_, facts| {
//!         facts.put("umbrella", true);
//!         Ok(())
//!     }))
//!     .build()?;
//!
//! let mut rules = Rules::new();
//! rules.register(Arc::new(rule));
//!
//! let mut facts = Facts::new();
//! facts.put("rain", true);
//!
//! DefaultRulesEngine::new().fire(&rules, &mut facts);
//! assert_eq!(facts.get_as::<bool>("umbrella")?, Some(true));
//! # Ok::<(), precept::foundation::Error>(())
//! ```

pub use precept_debug as debug;
pub use precept_engine as engine;
pub use precept_foundation as foundation;

/// The types most programs need.
pub mod prelude {
    pub use precept_engine::{
        Action, Condition, DeclaredRule, DefaultRulesEngine, EngineParameters,
        InferenceRulesEngine, Rule, RuleBuilder, RuleListener, Rules, RulesEngine,
        RulesEngineListener,
    };
    pub use precept_foundation::{Error, Facts, Result, Value};
}
