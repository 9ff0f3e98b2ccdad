//! Declaration scopes.
//!
//! A [`Namespace`] owns the instruments and child subsystems declared on it,
//! keyed by identifier. Declarations go through the [`Declare`] trait,
//! implemented by both `Namespace` and the borrowed [`Scope`] context that
//! carries the active preset labels. Preset scoping is done by passing a new
//! `Scope` down, never by mutating the namespace.
//!
//! Declarations are expected to happen during initialization. `&mut`
//! receivers make concurrent declaration on one namespace impossible; the
//! resulting instrument handles are `Send + Sync` and safe to share.

mod naming;
mod scope;

use std::collections::HashMap;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::instrument::{Counter, Gauge, Histogram, Instrument, Kind, Summary};
use crate::labels::{InstrumentOptions, LabelMap, SubsystemOptions};
use crate::registry::{PushOptions, Registry};

pub use naming::{check_identifier, FORBIDDEN_IDENTIFIERS};
pub use scope::Scope;

/// What an identifier is bound to inside a namespace.
#[derive(Debug)]
pub enum Binding {
    Instrument(Instrument),
    Subsystem(Namespace),
}

#[derive(Debug)]
pub struct Namespace {
    registry: Registry,
    prefix: Option<String>,
    presets: LabelMap,
    bindings: HashMap<String, Binding>,
}

impl Namespace {
    /// Root namespace: no prefix, no presets.
    pub fn new(registry: Registry) -> Self {
        Self::with_parts(registry, None, LabelMap::new())
    }

    pub(crate) fn with_parts(registry: Registry, prefix: Option<String>, presets: LabelMap) -> Self {
        Self {
            registry,
            prefix,
            presets,
            bindings: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prefix chain applied to every instrument name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Preset snapshot taken when the namespace was opened.
    pub fn presets(&self) -> &LabelMap {
        &self.presets
    }

    /// Final registered name for `identifier` in this namespace.
    pub fn id_for(&self, identifier: &str) -> String {
        naming::join_prefix(self.prefix(), identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Instrument> {
        match self.bindings.get(identifier)? {
            Binding::Instrument(i) => Some(i),
            Binding::Subsystem(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Namespace> {
        match self.bindings.get(name)? {
            Binding::Subsystem(ns) => Some(ns),
            Binding::Instrument(_) => None,
        }
    }

    /// Look up an instrument through subsystem accessors, e.g.
    /// `"postgres.master.op_count"`.
    pub fn resolve(&self, path: &str) -> Option<&Instrument> {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };
        let mut ns = self;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                ns = ns.child(part)?;
            }
        }
        ns.get(leaf)
    }

    /// Identifiers bound in this namespace (instruments and subsystems).
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub(crate) fn bind(&mut self, identifier: &str, binding: Binding) {
        if let Some(prev) = self.bindings.insert(identifier.to_string(), binding) {
            tracing::warn!(
                identifier,
                prefix = self.prefix().unwrap_or(""),
                replaced = binding_kind(&prev),
                "identifier re-bound; previous accessor replaced"
            );
        }
    }

    /// Push the whole registry to a Pushgateway under `job` (blocking).
    pub fn push(&self, job: &str, opts: &PushOptions) -> Result<()> {
        self.registry.push(job, opts)
    }

    /// Push once after `interval` on a background thread.
    pub fn push_periodically(
        &self,
        job: &str,
        interval: Duration,
        opts: &PushOptions,
    ) -> Result<JoinHandle<Result<()>>> {
        self.registry.push_periodically(job, interval, opts)
    }
}

fn binding_kind(b: &Binding) -> &'static str {
    match b {
        Binding::Instrument(i) => i.kind().as_str(),
        Binding::Subsystem(_) => "subsystem",
    }
}

/// Declaration operations shared by [`Namespace`] and [`Scope`].
pub trait Declare {
    /// Declaration context with the currently active presets.
    fn scope(&mut self) -> Scope<'_>;

    /// Declare an instrument with literal options.
    fn declare(
        &mut self,
        kind: Kind,
        identifier: &str,
        docs: &str,
        opts: InstrumentOptions,
    ) -> Result<Instrument> {
        self.scope().declare_resolved(kind, identifier, docs, opts)
    }

    /// Declare an instrument whose options come from `provider`.
    ///
    /// `_literal` is ignored: the provider's result always replaces it.
    /// Kept so call sites can pass both forms and let the provider win.
    fn declare_with<F>(
        &mut self,
        kind: Kind,
        identifier: &str,
        docs: &str,
        _literal: InstrumentOptions,
        provider: F,
    ) -> Result<Instrument>
    where
        F: FnOnce() -> InstrumentOptions,
    {
        self.scope()
            .declare_resolved(kind, identifier, docs, provider())
    }

    fn counter(&mut self, identifier: &str, docs: &str, opts: InstrumentOptions) -> Result<Counter> {
        match self.declare(Kind::Counter, identifier, docs, opts)? {
            Instrument::Counter(c) => Ok(c),
            other => Err(kind_mismatch(Kind::Counter, &other)),
        }
    }

    fn gauge(&mut self, identifier: &str, docs: &str, opts: InstrumentOptions) -> Result<Gauge> {
        match self.declare(Kind::Gauge, identifier, docs, opts)? {
            Instrument::Gauge(g) => Ok(g),
            other => Err(kind_mismatch(Kind::Gauge, &other)),
        }
    }

    fn histogram(
        &mut self,
        identifier: &str,
        docs: &str,
        opts: InstrumentOptions,
    ) -> Result<Histogram> {
        match self.declare(Kind::Histogram, identifier, docs, opts)? {
            Instrument::Histogram(h) => Ok(h),
            other => Err(kind_mismatch(Kind::Histogram, &other)),
        }
    }

    fn summary(&mut self, identifier: &str, docs: &str, opts: InstrumentOptions) -> Result<Summary> {
        match self.declare(Kind::Summary, identifier, docs, opts)? {
            Instrument::Summary(s) => Ok(s),
            other => Err(kind_mismatch(Kind::Summary, &other)),
        }
    }

    /// Run `body` with `labels` merged over the active presets. New keys
    /// override existing ones; the outer presets are untouched afterwards.
    fn with_presets<R, F>(&mut self, labels: LabelMap, body: F) -> Result<R>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<R>,
    {
        self.scope().with_presets_inner(labels, body)
    }

    /// Open a child namespace prefixed with `name`, run `body` against it,
    /// then bind it under `name`.
    fn subsystem<R, F>(&mut self, name: &str, opts: SubsystemOptions, body: F) -> Result<R>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<R>,
    {
        self.scope().subsystem_inner(name, opts, body)
    }
}

impl Declare for Namespace {
    fn scope(&mut self) -> Scope<'_> {
        let presets = self.presets.clone();
        Scope::new(self, presets)
    }
}

fn kind_mismatch(want: Kind, got: &Instrument) -> Error {
    Error::Internal(format!(
        "expected {} but engine returned {}",
        want.as_str(),
        got.kind().as_str()
    ))
}
