//! Structured tracing for Precept engines.
//!
//! This crate provides:
//! - [`Tracer`] - A rule and session listener that records trace events
//! - [`TraceBuffer`] - A ring buffer of trace records indexed by session
//! - [`HumanFormatter`] and [`JsonFormatter`] - Trace output formats

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod trace;

pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceBufferStats, TraceEvent, TraceFormatter,
    TraceOutput, TraceRecord, Tracer, TracerConfig,
};
