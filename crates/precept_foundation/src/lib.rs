//! Core values, facts, and error types for Precept.
//!
//! This crate provides:
//! - [`Value`] - The dynamically typed value carried by every fact
//! - [`Type`] - Type descriptors used in type-mismatch reports
//! - [`Facts`] - The ordered, mutable fact store shared by rules
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod facts;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result, SemanticLimit};
pub use facts::{Fact, Facts};
pub use types::Type;
pub use value::{FromValue, OpaqueValue, Value};
