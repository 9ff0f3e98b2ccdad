//! Label and option types shared by declarations and the registry facade.
//!
//! Preset label sets are plain ordered maps so merges are deterministic and
//! rendering order never depends on insertion order.

use std::collections::BTreeMap;

/// Label name -> fixed label value.
pub type LabelMap = BTreeMap<String, String>;

/// Build a [`LabelMap`] from borrowed pairs.
pub fn label_map<K, V, I>(pairs: I) -> LabelMap
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Per-instrument options handed to the metrics engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentOptions {
    /// Runtime label names, in declaration order.
    pub labels: Vec<String>,
    /// Labels fixed to a constant value for this instrument.
    pub preset_labels: LabelMap,
    /// Histogram bucket upper bounds. Ignored by other kinds.
    pub buckets: Option<Vec<f64>>,
}

impl InstrumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn preset(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.preset_labels.insert(name.into(), value.into());
        self
    }

    pub fn preset_labels(mut self, presets: LabelMap) -> Self {
        self.preset_labels = presets;
        self
    }

    pub fn buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = Some(buckets);
        self
    }

    /// Merge the active namespace presets into these options.
    ///
    /// Preset names are appended to `labels` (each name appears once), and the
    /// instrument's own `preset_labels` win over namespace presets on a
    /// shared key.
    pub fn merge_presets(mut self, presets: &LabelMap) -> Self {
        for (k, v) in presets {
            self.preset_labels
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        let declared = std::mem::take(&mut self.labels);
        for l in declared.into_iter().chain(self.preset_labels.keys().cloned()) {
            if !self.labels.contains(&l) {
                self.labels.push(l);
            }
        }
        self
    }

    /// Labels whose values are supplied at observation time.
    pub fn variable_labels(&self) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|l| !self.preset_labels.contains_key(l.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Options for opening a subsystem.
#[derive(Debug, Clone, Default)]
pub struct SubsystemOptions {
    /// Merge the parent's active presets in as defaults.
    pub inherit_presets: bool,
    /// Presets applied to every instrument of the subsystem.
    pub presets: LabelMap,
}

impl SubsystemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inherit_presets(mut self, inherit: bool) -> Self {
        self.inherit_presets = inherit;
        self
    }

    pub fn preset(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.presets.insert(name.into(), value.into());
        self
    }

    pub fn presets(mut self, presets: LabelMap) -> Self {
        self.presets = presets;
        self
    }

    /// Resolve the child's preset set from the parent's active presets.
    pub fn resolve(self, parent: &LabelMap) -> LabelMap {
        let mut presets = self.presets;
        if self.inherit_presets {
            for (k, v) in parent {
                presets.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        presets
    }
}
