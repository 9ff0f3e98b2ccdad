use std::time::Duration;

use serde::Deserialize;
use promdecl_core::error::{Error, Result};
use promdecl_core::{LabelMap, PushOptions, DEFAULT_GATEWAY};

use super::manifest::Declaration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub push: Option<PushSection>,

    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub declarations: Vec<Declaration>,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::UnsupportedVersion);
        }

        self.exporter.validate()?;
        if let Some(push) = &self.push {
            push.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_path")]
    pub path: String,

    /// Record request count/duration for the exposition server itself.
    #[serde(default)]
    pub collect_http: bool,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            path: default_path(),
            collect_http: false,
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::Config("exporter.address must not be empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(Error::Config("exporter.path must start with '/'".into()));
        }
        Ok(())
    }
}

fn default_address() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    9394
}
fn default_path() -> String {
    "/metrics".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushSection {
    #[serde(default = "default_gateway")]
    pub gateway: String,

    pub job: String,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default)]
    pub grouping: LabelMap,

    #[serde(default)]
    pub basic_auth: Option<BasicAuthSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuthSection {
    pub username: String,
    pub password: String,
}

impl PushSection {
    pub fn validate(&self) -> Result<()> {
        if self.job.is_empty() || self.job.contains('/') {
            return Err(Error::Config(
                "push.job must be non-empty and must not contain '/'".into(),
            ));
        }
        if !(1..=86_400).contains(&self.interval_secs) {
            return Err(Error::Config(
                "push.interval_secs must be between 1 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn options(&self) -> PushOptions {
        let mut opts = PushOptions::default().gateway(self.gateway.clone());
        opts.grouping = self.grouping.clone();
        if let Some(auth) = &self.basic_auth {
            opts = opts.basic_auth(auth.username.clone(), auth.password.clone());
        }
        opts
    }
}

fn default_gateway() -> String {
    DEFAULT_GATEWAY.into()
}
fn default_interval_secs() -> u64 {
    10
}
