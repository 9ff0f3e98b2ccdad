//! Declaration manifest: the YAML form of the declaration API.
//!
//! Each entry maps onto one [`Declare`] call; `with_presets` and `subsystem`
//! entries carry a nested `body`.

use serde::Deserialize;
use promdecl_core::error::{Error, Result};
use promdecl_core::{Declare, InstrumentOptions, Kind, LabelMap, SubsystemOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    Counter(InstrumentDecl),
    Gauge(InstrumentDecl),
    Histogram(InstrumentDecl),
    Summary(InstrumentDecl),
    WithPresets(PresetsDecl),
    Subsystem(SubsystemDecl),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentDecl {
    pub id: String,
    #[serde(default)]
    pub docs: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub preset_labels: LabelMap,
    #[serde(default)]
    pub buckets: Option<Vec<f64>>,
}

impl InstrumentDecl {
    fn options(&self) -> InstrumentOptions {
        InstrumentOptions {
            labels: self.labels.clone(),
            preset_labels: self.preset_labels.clone(),
            buckets: self.buckets.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetsDecl {
    #[serde(default)]
    pub labels: Option<LabelMap>,
    #[serde(default)]
    pub body: Option<Vec<Declaration>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubsystemDecl {
    pub name: String,
    #[serde(default)]
    pub inherit_presets: bool,
    #[serde(default)]
    pub presets: LabelMap,
    #[serde(default)]
    pub body: Option<Vec<Declaration>>,
}

/// Apply `decls` in order. Stops at the first failing declaration.
pub fn apply<D: Declare>(target: &mut D, decls: &[Declaration]) -> Result<()> {
    for decl in decls {
        apply_one(target, decl)?;
    }
    Ok(())
}

fn apply_one<D: Declare>(target: &mut D, decl: &Declaration) -> Result<()> {
    match decl {
        Declaration::Counter(i) => declare(target, Kind::Counter, i),
        Declaration::Gauge(i) => declare(target, Kind::Gauge, i),
        Declaration::Histogram(i) => declare(target, Kind::Histogram, i),
        Declaration::Summary(i) => declare(target, Kind::Summary, i),
        Declaration::WithPresets(p) => {
            let body = p
                .body
                .as_deref()
                .ok_or_else(|| Error::MissingBlock("with_presets".into()))?;
            let labels = p.labels.clone().unwrap_or_default();
            target.with_presets(labels, |s| apply(s, body))
        }
        Declaration::Subsystem(s) => {
            let body = s
                .body
                .as_deref()
                .ok_or_else(|| Error::MissingBlock(format!("subsystem {}", s.name)))?;
            let opts = SubsystemOptions::new()
                .inherit_presets(s.inherit_presets)
                .presets(s.presets.clone());
            target.subsystem(&s.name, opts, |scope| apply(scope, body))
        }
    }
}

fn declare<D: Declare>(target: &mut D, kind: Kind, decl: &InstrumentDecl) -> Result<()> {
    target.declare(kind, &decl.id, &decl.docs, decl.options())?;
    Ok(())
}
