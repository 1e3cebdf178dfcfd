//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Facts, and Error.

mod facts;
