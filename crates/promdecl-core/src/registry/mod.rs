//! Registry facade: the only place that talks to the metrics engine.
//!
//! Creates engine instruments, registers them, gathers snapshots, and
//! pushes snapshots to a Pushgateway. Engine failures are surfaced as-is
//! (wrapped in [`Error`]); nothing is retried or swallowed here.

mod summary;

use std::collections::HashMap;
use std::fmt;
use std::thread::JoinHandle;
use std::time::Duration;

use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, TextEncoder};

use crate::error::{Error, Result};
use crate::instrument::{Counter, Descriptor, Gauge, Histogram, Instrument, Kind, Summary};
use crate::labels::{InstrumentOptions, LabelMap};

pub use summary::SummaryVec;

/// Docstring used when a declaration leaves it empty.
pub const DEFAULT_DOCS: &str = "...";

/// Pushgateway address used when none is configured.
pub const DEFAULT_GATEWAY: &str = "http://localhost:9091";

/// Delay before a scheduled push.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(10);

/// HTTP basic credentials for the Pushgateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Transport options for a push. Passed through to the engine unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct PushOptions {
    pub gateway: String,
    pub grouping: LabelMap,
    pub basic_auth: Option<BasicAuth>,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_GATEWAY.to_string(),
            grouping: LabelMap::new(),
            basic_auth: None,
        }
    }
}

impl PushOptions {
    pub fn gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    pub fn group(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.grouping.insert(name.into(), value.into());
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

/// Handle to one engine registry. Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct Registry {
    engine: prometheus::Registry,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the engine registry (for collectors declared outside promdecl).
    pub fn engine(&self) -> &prometheus::Registry {
        &self.engine
    }

    /// Create and register an instrument of the given kind.
    pub fn create(
        &self,
        kind: Kind,
        name: &str,
        docs: &str,
        opts: &InstrumentOptions,
    ) -> Result<Instrument> {
        Ok(match kind {
            Kind::Counter => Instrument::Counter(self.new_counter(name, docs, opts)?),
            Kind::Gauge => Instrument::Gauge(self.new_gauge(name, docs, opts)?),
            Kind::Histogram => Instrument::Histogram(self.new_histogram(name, docs, opts)?),
            Kind::Summary => Instrument::Summary(self.new_summary(name, docs, opts)?),
        })
    }

    pub fn new_counter(&self, name: &str, docs: &str, opts: &InstrumentOptions) -> Result<Counter> {
        let desc = descriptor(Kind::Counter, name, docs, opts);
        let vec = CounterVec::new(engine_opts(&desc), &opts.variable_labels())
            .map_err(Error::Registration)?;
        self.register(Box::new(vec.clone()))?;
        if opts.variable_labels().is_empty() {
            vec.get_metric_with_label_values(&[])
                .map_err(Error::Labels)?;
        }
        Ok(Counter::new(desc, vec))
    }

    pub fn new_gauge(&self, name: &str, docs: &str, opts: &InstrumentOptions) -> Result<Gauge> {
        let desc = descriptor(Kind::Gauge, name, docs, opts);
        let vec = GaugeVec::new(engine_opts(&desc), &opts.variable_labels())
            .map_err(Error::Registration)?;
        self.register(Box::new(vec.clone()))?;
        if opts.variable_labels().is_empty() {
            vec.get_metric_with_label_values(&[])
                .map_err(Error::Labels)?;
        }
        Ok(Gauge::new(desc, vec))
    }

    pub fn new_histogram(
        &self,
        name: &str,
        docs: &str,
        opts: &InstrumentOptions,
    ) -> Result<Histogram> {
        let desc = descriptor(Kind::Histogram, name, docs, opts);
        let mut hopts = HistogramOpts::from(engine_opts(&desc));
        if let Some(buckets) = &opts.buckets {
            hopts = hopts.buckets(buckets.clone());
        }
        let vec = HistogramVec::new(hopts, &opts.variable_labels())
            .map_err(Error::Registration)?;
        self.register(Box::new(vec.clone()))?;
        if opts.variable_labels().is_empty() {
            vec.get_metric_with_label_values(&[])
                .map_err(Error::Labels)?;
        }
        Ok(Histogram::new(desc, vec))
    }

    pub fn new_summary(&self, name: &str, docs: &str, opts: &InstrumentOptions) -> Result<Summary> {
        let desc = descriptor(Kind::Summary, name, docs, opts);
        let vec = SummaryVec::new(
            &desc.name,
            &desc.docs,
            &opts.variable_labels(),
            &desc.preset_labels,
        )
        .map_err(Error::Registration)?;
        self.register(Box::new(vec.clone()))?;
        Ok(Summary::new(desc, vec))
    }

    fn register(&self, collector: Box<dyn prometheus::core::Collector>) -> Result<()> {
        self.engine.register(collector).map_err(Error::Registration)
    }

    /// Current snapshot of every registered family.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.engine.gather()
    }

    /// Snapshot rendered in the text exposition format.
    pub fn encode_text(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.gather(), &mut buf)
            .map_err(|e| Error::Internal(format!("encode failed: {e}")))?;
        String::from_utf8(buf).map_err(|e| Error::Internal(format!("encode failed: {e}")))
    }

    /// Push the full snapshot to a Pushgateway under `job` (blocking).
    pub fn push(&self, job: &str, opts: &PushOptions) -> Result<()> {
        let grouping: HashMap<String, String> = opts
            .grouping
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let auth = opts
            .basic_auth
            .as_ref()
            .map(|a| prometheus::BasicAuthentication {
                username: a.username.clone(),
                password: a.password.clone(),
            });

        prometheus::push_add_metrics(job, grouping, &opts.gateway, self.gather(), auth)
            .map_err(Error::Push)?;
        tracing::info!(job, gateway = %opts.gateway, "pushed registry snapshot");
        Ok(())
    }

    /// Wait `interval` on a background thread, then push once.
    ///
    /// The returned handle may be joined to observe the push outcome, or
    /// dropped; the thread is never cancelled.
    pub fn push_periodically(
        &self,
        job: &str,
        interval: Duration,
        opts: &PushOptions,
    ) -> Result<JoinHandle<Result<()>>> {
        let registry = self.clone();
        let job = job.to_string();
        let opts = opts.clone();

        std::thread::Builder::new()
            .name(format!("promdecl-push-{job}"))
            .spawn(move || {
                std::thread::sleep(interval);
                let res = registry.push(&job, &opts);
                if let Err(e) = &res {
                    tracing::warn!(job = %job, error = %e, "scheduled push failed");
                }
                res
            })
            .map_err(|e| Error::Internal(format!("spawn push thread failed: {e}")))
    }
}

fn descriptor(kind: Kind, name: &str, docs: &str, opts: &InstrumentOptions) -> Descriptor {
    let docs = if docs.trim().is_empty() { DEFAULT_DOCS } else { docs };
    // Preset-only keys still count as instrument labels.
    let resolved = opts.clone().merge_presets(&LabelMap::new());
    Descriptor {
        name: name.to_string(),
        docs: docs.to_string(),
        kind,
        labels: resolved.labels,
        preset_labels: resolved.preset_labels,
    }
}

fn engine_opts(desc: &Descriptor) -> Opts {
    Opts::new(desc.name.clone(), desc.docs.clone()).const_labels(
        desc.preset_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
