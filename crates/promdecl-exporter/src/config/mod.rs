//! Exporter config loader (strict parsing).

pub mod manifest;
pub mod schema;

use std::fs;

use promdecl_core::error::{Error, Result};

pub use manifest::{apply, Declaration};
pub use schema::{ExporterConfig, ExporterSection, PushSection};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| Error::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| Error::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
