//! promdecl exporter
//!
//! - Loads `promdecl.yaml` (or the path given as first argument)
//! - Declares the manifest's instruments on a root namespace
//! - Serves them at the configured path until Ctrl-C
//! - Optionally schedules one delayed push to a Pushgateway

use tracing_subscriber::{fmt, EnvFilter};

use promdecl_core::{Namespace, Registry};
use promdecl_exporter::{config, Exposer, HttpCollector};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "promdecl.yaml".to_string());
    let cfg = config::load_from_file(&path).expect("config load failed");

    let registry = Registry::new();
    let mut root = Namespace::new(registry.clone());
    config::apply(&mut root, &cfg.declarations).expect("declarations failed");

    let mut exposer = Exposer::new(registry.clone()).with_path(cfg.exporter.path.clone());
    if cfg.exporter.collect_http {
        let collector = HttpCollector::new(&registry).expect("http collector declaration failed");
        exposer = exposer.with_collector(collector);
    }

    let addr = exposer
        .start(cfg.exporter.port, &cfg.exporter.address)
        .await
        .expect("failed to start metrics exposer");
    tracing::info!(%addr, config = %path, "promdecl-exporter serving");

    if let Some(push) = &cfg.push {
        // One-shot: the thread pushes once after the interval and exits.
        root.push_periodically(&push.job, push.interval(), &push.options())
            .expect("failed to schedule push");
    }

    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    exposer.stop().await.expect("failed to stop metrics exposer");
}
