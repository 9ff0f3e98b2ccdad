//! promdecl core: declarative instrument namespaces over the `prometheus`
//! engine.
//!
//! Applications declare counters, gauges, histograms and summaries on a
//! [`Namespace`], optionally under preset labels ([`Declare::with_presets`])
//! and nested subsystems ([`Declare::subsystem`]) that prefix metric names.
//! The [`Registry`] facade is the only code that talks to the engine.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every engine or transport failure surfaces as [`Error`] at the call
//! that caused it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod instrument;
pub mod labels;
pub mod namespace;
pub mod registry;

pub use error::{Error, ErrorCode, Result};
pub use instrument::{Counter, Descriptor, Gauge, Histogram, Instrument, Kind, Summary};
pub use labels::{label_map, InstrumentOptions, LabelMap, SubsystemOptions};
pub use namespace::{Binding, Declare, Namespace, Scope, FORBIDDEN_IDENTIFIERS};
pub use registry::{BasicAuth, PushOptions, Registry, DEFAULT_GATEWAY, DEFAULT_PUSH_INTERVAL};
