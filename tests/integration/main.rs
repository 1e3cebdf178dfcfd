//! Cross-layer integration tests for Precept
//!
//! Tests that verify correct interaction between multiple crates.
