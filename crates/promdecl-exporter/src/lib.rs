//! promdecl exporter library entry.
//!
//! HTTP side of promdecl: strict YAML config with a declaration manifest,
//! the `/metrics` exposition route, request instrumentation middleware, and
//! a self-hosted exposition server. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;

pub use obs::HttpCollector;
pub use server::Exposer;
