//! Top-level facade crate for promdecl.
//!
//! Re-exports the declaration layer and the exporter library so users can
//! depend on a single crate.

pub mod core {
    pub use promdecl_core::*;
}

pub mod exporter {
    pub use promdecl_exporter::*;
}
