//! HTTP request instrumentation.
//!
//! Request count and duration are declared through a promdecl namespace and
//! recorded by an axum middleware.

pub mod collector;

pub use collector::{track, HttpCollector, UNMATCHED_PATH};
