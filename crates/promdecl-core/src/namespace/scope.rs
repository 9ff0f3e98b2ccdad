use crate::error::{Error, Result};
use crate::instrument::{Instrument, Kind};
use crate::labels::{InstrumentOptions, LabelMap, SubsystemOptions};

use super::naming;
use super::{Binding, Declare, Namespace};

/// Declaration context: a namespace plus the presets active at this point.
pub struct Scope<'a> {
    ns: &'a mut Namespace,
    presets: LabelMap,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(ns: &'a mut Namespace, presets: LabelMap) -> Self {
        Self { ns, presets }
    }

    /// Presets applied to declarations made through this scope.
    pub fn presets(&self) -> &LabelMap {
        &self.presets
    }

    pub fn namespace(&self) -> &Namespace {
        &*self.ns
    }

    pub fn id_for(&self, identifier: &str) -> String {
        self.ns.id_for(identifier)
    }

    pub(crate) fn declare_resolved(
        &mut self,
        kind: Kind,
        identifier: &str,
        docs: &str,
        opts: InstrumentOptions,
    ) -> Result<Instrument> {
        naming::check_identifier(identifier)?;

        let opts = opts.merge_presets(&self.presets);
        let name = self.ns.id_for(identifier);
        let instrument = self.ns.registry.create(kind, &name, docs, &opts)?;

        tracing::debug!(
            kind = kind.as_str(),
            name = %name,
            labels = ?instrument.labels(),
            "instrument declared"
        );
        self.ns
            .bind(identifier, Binding::Instrument(instrument.clone()));
        Ok(instrument)
    }

    pub(crate) fn with_presets_inner<R, F>(&mut self, labels: LabelMap, body: F) -> Result<R>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<R>,
    {
        if labels.is_empty() {
            return Err(Error::InvalidArgument("labels are empty".into()));
        }
        let mut merged = self.presets.clone();
        merged.extend(labels);

        let mut inner = Scope::new(&mut *self.ns, merged);
        body(&mut inner)
    }

    pub(crate) fn subsystem_inner<R, F>(
        &mut self,
        name: &str,
        opts: SubsystemOptions,
        body: F,
    ) -> Result<R>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<R>,
    {
        let segment = naming::segment(name);
        if segment.is_empty() {
            return Err(Error::InvalidArgument("subsystem name is empty".into()));
        }

        let prefix = self.ns.id_for(segment);
        let presets = opts.resolve(&self.presets);
        let mut child = Namespace::with_parts(self.ns.registry.clone(), Some(prefix), presets);

        let out = body(&mut child.scope())?;
        self.ns.bind(name, Binding::Subsystem(child));
        Ok(out)
    }
}

impl Declare for Scope<'_> {
    fn scope(&mut self) -> Scope<'_> {
        Scope::new(&mut *self.ns, self.presets.clone())
    }
}
