//! Request counter and duration histogram for axum routers.
//!
//! Metrics live under a subsystem prefix (default `http_server`):
//! - `<prefix>_requests_total{code,method,path}`
//! - `<prefix>_request_duration_seconds{method,path}`
//!
//! `path` is the matched route template. Requests no route matched share the
//! single value [`UNMATCHED_PATH`], so arbitrary URLs cannot grow the series
//! set.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use promdecl_core::error::Result;
use promdecl_core::{
    Counter, Declare, Histogram, InstrumentOptions, Namespace, Registry, SubsystemOptions,
};

pub const DEFAULT_PREFIX: &str = "http_server";

/// `path` label value for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

#[derive(Clone, Debug)]
pub struct HttpCollector {
    requests: Counter,
    durations: Histogram,
}

impl HttpCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        Self::with_prefix(registry, DEFAULT_PREFIX)
    }

    pub fn with_prefix(registry: &Registry, prefix: &str) -> Result<Self> {
        let mut ns = Namespace::new(registry.clone());
        ns.subsystem(prefix, SubsystemOptions::new(), |s| {
            let requests = s.counter(
                "requests_total",
                "The total number of HTTP requests handled by the server.",
                InstrumentOptions::new().labels(["code", "method", "path"]),
            )?;
            let durations = s.histogram(
                "request_duration_seconds",
                "The HTTP response duration of the server.",
                InstrumentOptions::new().labels(["method", "path"]),
            )?;
            Ok(Self {
                requests,
                durations,
            })
        })
    }

    pub fn requests(&self) -> &Counter {
        &self.requests
    }

    pub fn durations(&self) -> &Histogram {
        &self.durations
    }

    pub fn record(&self, method: &str, path: &str, code: u16, elapsed: Duration) -> Result<()> {
        let code = code.to_string();
        self.requests
            .inc(&[("code", code.as_str()), ("method", method), ("path", path)])?;
        self.durations
            .observe(elapsed.as_secs_f64(), &[("method", method), ("path", path)])
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn track(State(collector): State<HttpCollector>, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_ascii_lowercase();
    let path = match req.extensions().get::<MatchedPath>() {
        Some(p) => p.as_str().to_owned(),
        None => UNMATCHED_PATH.to_owned(),
    };

    let started = Instant::now();
    let resp = next.run(req).await;

    if let Err(e) = collector.record(&method, &path, resp.status().as_u16(), started.elapsed()) {
        tracing::warn!(error = %e, %method, %path, "http collector failed to record request");
    }
    resp
}
