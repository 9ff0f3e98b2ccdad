//! Instrument handles returned by the registry facade.
//!
//! Handles are cheap to clone and delegate every runtime call to the
//! engine's vector type. Runtime label pairs cover only the non-preset
//! labels; preset labels are baked into the engine as const labels.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use prometheus::{CounterVec, GaugeVec, HistogramVec};

use crate::error::{Error, Result};
use crate::labels::LabelMap;
use crate::registry::SummaryVec;

/// Instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Counter => "counter",
            Kind::Gauge => "gauge",
            Kind::Histogram => "histogram",
            Kind::Summary => "summary",
        }
    }
}

/// Resolved declaration of a registered instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub name: String,
    pub docs: String,
    pub kind: Kind,
    /// Every label the instrument holds, preset ones included.
    pub labels: Vec<String>,
    pub preset_labels: LabelMap,
}

pub(crate) fn label_set<'a>(labels: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
    labels.iter().copied().collect()
}

macro_rules! descriptor_accessors {
    ($ty:ident) => {
        impl $ty {
            pub fn descriptor(&self) -> &Descriptor {
                &self.desc
            }

            /// Fully resolved (prefixed) metric name.
            pub fn name(&self) -> &str {
                &self.desc.name
            }

            pub fn docs(&self) -> &str {
                &self.desc.docs
            }

            pub fn kind(&self) -> Kind {
                self.desc.kind
            }

            pub fn labels(&self) -> &[String] {
                &self.desc.labels
            }

            pub fn preset_labels(&self) -> &LabelMap {
                &self.desc.preset_labels
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("desc", &self.desc)
                    .finish()
            }
        }
    };
}

#[derive(Clone)]
pub struct Counter {
    desc: Arc<Descriptor>,
    vec: CounterVec,
}

impl Counter {
    pub(crate) fn new(desc: Descriptor, vec: CounterVec) -> Self {
        Self { desc: Arc::new(desc), vec }
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.inc_by(1.0, labels)
    }

    /// Increment by a non-negative amount.
    pub fn inc_by(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        if v.is_nan() || v < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "counter {} cannot decrease (got {v})",
                self.desc.name
            )));
        }
        self.child(labels)?.inc_by(v);
        Ok(())
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Result<f64> {
        Ok(self.child(labels)?.get())
    }

    fn child(&self, labels: &[(&str, &str)]) -> Result<prometheus::Counter> {
        self.vec
            .get_metric_with(&label_set(labels))
            .map_err(Error::Labels)
    }
}

descriptor_accessors!(Counter);

#[derive(Clone)]
pub struct Gauge {
    desc: Arc<Descriptor>,
    vec: GaugeVec,
}

impl Gauge {
    pub(crate) fn new(desc: Descriptor, vec: GaugeVec) -> Self {
        Self { desc: Arc::new(desc), vec }
    }

    pub fn set(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        self.child(labels)?.set(v);
        Ok(())
    }

    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(1.0, labels)
    }

    pub fn dec(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.sub(1.0, labels)
    }

    pub fn add(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        self.child(labels)?.add(v);
        Ok(())
    }

    pub fn sub(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        self.child(labels)?.sub(v);
        Ok(())
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Result<f64> {
        Ok(self.child(labels)?.get())
    }

    fn child(&self, labels: &[(&str, &str)]) -> Result<prometheus::Gauge> {
        self.vec
            .get_metric_with(&label_set(labels))
            .map_err(Error::Labels)
    }
}

descriptor_accessors!(Gauge);

#[derive(Clone)]
pub struct Histogram {
    desc: Arc<Descriptor>,
    vec: HistogramVec,
}

impl Histogram {
    pub(crate) fn new(desc: Descriptor, vec: HistogramVec) -> Self {
        Self { desc: Arc::new(desc), vec }
    }

    pub fn observe(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        self.child(labels)?.observe(v);
        Ok(())
    }

    /// Run `f` and observe its wall-clock duration in seconds.
    ///
    /// The observation is recorded whatever `f` returns, and also when it
    /// unwinds. Label problems are reported before `f` runs.
    pub fn measure<T>(&self, labels: &[(&str, &str)], f: impl FnOnce() -> T) -> Result<T> {
        let _timer = ObserveOnDrop {
            child: self.child(labels)?,
            started: Instant::now(),
        };
        Ok(f())
    }

    pub fn sample_count(&self, labels: &[(&str, &str)]) -> Result<u64> {
        Ok(self.child(labels)?.get_sample_count())
    }

    pub fn sample_sum(&self, labels: &[(&str, &str)]) -> Result<f64> {
        Ok(self.child(labels)?.get_sample_sum())
    }

    fn child(&self, labels: &[(&str, &str)]) -> Result<prometheus::Histogram> {
        self.vec
            .get_metric_with(&label_set(labels))
            .map_err(Error::Labels)
    }
}

descriptor_accessors!(Histogram);

struct ObserveOnDrop {
    child: prometheus::Histogram,
    started: Instant,
}

impl Drop for ObserveOnDrop {
    fn drop(&mut self) {
        self.child.observe(self.started.elapsed().as_secs_f64());
    }
}

#[derive(Clone)]
pub struct Summary {
    desc: Arc<Descriptor>,
    vec: SummaryVec,
}

impl Summary {
    pub(crate) fn new(desc: Descriptor, vec: SummaryVec) -> Self {
        Self { desc: Arc::new(desc), vec }
    }

    pub fn observe(&self, v: f64, labels: &[(&str, &str)]) -> Result<()> {
        self.vec
            .observe(&label_set(labels), v)
            .map_err(Error::Labels)
    }

    pub fn sample_count(&self, labels: &[(&str, &str)]) -> Result<u64> {
        self.vec
            .sample_count(&label_set(labels))
            .map_err(Error::Labels)
    }

    pub fn sample_sum(&self, labels: &[(&str, &str)]) -> Result<f64> {
        self.vec
            .sample_sum(&label_set(labels))
            .map_err(Error::Labels)
    }
}

descriptor_accessors!(Summary);

/// Kind-erased instrument as stored in a namespace binding table.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
    Summary(Summary),
}

impl Instrument {
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            Instrument::Counter(c) => c.descriptor(),
            Instrument::Gauge(g) => g.descriptor(),
            Instrument::Histogram(h) => h.descriptor(),
            Instrument::Summary(s) => s.descriptor(),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    pub fn docs(&self) -> &str {
        &self.descriptor().docs
    }

    pub fn kind(&self) -> Kind {
        self.descriptor().kind
    }

    pub fn labels(&self) -> &[String] {
        &self.descriptor().labels
    }

    pub fn preset_labels(&self) -> &LabelMap {
        &self.descriptor().preset_labels
    }

    pub fn as_counter(&self) -> Option<&Counter> {
        match self {
            Instrument::Counter(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_gauge(&self) -> Option<&Gauge> {
        match self {
            Instrument::Gauge(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&Histogram> {
        match self {
            Instrument::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<&Summary> {
        match self {
            Instrument::Summary(s) => Some(s),
            _ => None,
        }
    }
}
