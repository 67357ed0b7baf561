//! Rate-limited HTTP load generator.
//!
//! A run sends a fixed number of templated requests through a bounded
//! worker pool, admitting them at a steady rate. Every result is appended
//! to a line-oriented log which is aggregated into a latency summary once
//! the run has drained.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;
