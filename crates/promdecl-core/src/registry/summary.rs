//! Summary collector.
//!
//! The engine ships no summary type, so this collector tracks `count` and
//! `sum` per label set (no quantiles) and renders them as a Prometheus
//! summary family. Label sets are flattened into value vectors ordered by
//! the declared variable labels, backed by `DashMap`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use prometheus::core::{Atomic, AtomicF64, Collector, Desc};
use prometheus::proto::{LabelPair, Metric, MetricFamily, MetricType};

use crate::labels::LabelMap;

struct SummaryCell {
    count: AtomicU64,
    sum: AtomicF64,
}

impl SummaryCell {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
        }
    }
}

struct SummaryCore {
    desc: Desc,
    cells: DashMap<Vec<String>, SummaryCell>,
}

#[derive(Clone)]
pub struct SummaryVec {
    core: Arc<SummaryCore>,
}

impl SummaryVec {
    pub fn new(
        name: &str,
        help: &str,
        variable_labels: &[&str],
        const_labels: &LabelMap,
    ) -> prometheus::Result<Self> {
        let desc = Desc::new(
            name.to_string(),
            help.to_string(),
            variable_labels.iter().map(|l| l.to_string()).collect(),
            const_labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )?;
        let cells = DashMap::new();
        // Label-free summaries are exported from the start.
        if variable_labels.is_empty() {
            cells.insert(Vec::new(), SummaryCell::new());
        }
        Ok(Self {
            core: Arc::new(SummaryCore { desc, cells }),
        })
    }

    pub fn observe(&self, labels: &HashMap<&str, &str>, v: f64) -> prometheus::Result<()> {
        let key = self.key_for(labels)?;
        let cell = self.core.cells.entry(key).or_insert_with(SummaryCell::new);
        cell.count.fetch_add(1, Ordering::Relaxed);
        cell.sum.inc_by(v);
        Ok(())
    }

    /// Observation count for a label set (0 when never observed).
    pub fn sample_count(&self, labels: &HashMap<&str, &str>) -> prometheus::Result<u64> {
        let key = self.key_for(labels)?;
        Ok(self
            .core
            .cells
            .get(&key)
            .map(|c| c.count.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    pub fn sample_sum(&self, labels: &HashMap<&str, &str>) -> prometheus::Result<f64> {
        let key = self.key_for(labels)?;
        Ok(self
            .core
            .cells
            .get(&key)
            .map(|c| c.sum.get())
            .unwrap_or(0.0))
    }

    fn key_for(&self, labels: &HashMap<&str, &str>) -> prometheus::Result<Vec<String>> {
        let names = &self.core.desc.variable_labels;
        if labels.len() != names.len() {
            return Err(prometheus::Error::InconsistentCardinality {
                expect: names.len(),
                got: labels.len(),
            });
        }
        names
            .iter()
            .map(|name| {
                labels
                    .get(name.as_str())
                    .map(|v| v.to_string())
                    .ok_or_else(|| {
                        prometheus::Error::Msg(format!("label name {name} missing in label map"))
                    })
            })
            .collect()
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.core.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let desc = &self.core.desc;
        let mut metrics = Vec::with_capacity(self.core.cells.len());

        for r in self.core.cells.iter() {
            let mut pairs: Vec<LabelPair> = desc.const_label_pairs.clone();
            for (name, value) in desc.variable_labels.iter().zip(r.key()) {
                let mut pair = LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value(value.clone());
                pairs.push(pair);
            }
            pairs.sort_by(|a, b| a.get_name().cmp(b.get_name()));

            let mut summary = prometheus::proto::Summary::default();
            summary.set_sample_count(r.value().count.load(Ordering::Relaxed));
            summary.set_sample_sum(r.value().sum.get());

            let mut metric = Metric::default();
            metric.set_label(pairs.into());
            metric.set_summary(summary);
            metrics.push(metric);
        }

        let mut mf = MetricFamily::default();
        mf.set_name(desc.fq_name.clone());
        mf.set_help(desc.help.clone());
        mf.set_field_type(MetricType::SUMMARY);
        mf.set_metric(metrics.into());
        vec![mf]
    }
}
