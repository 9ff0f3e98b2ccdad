//! Self-hosted exposition server.
//!
//! For applications without an HTTP server of their own. `start` is
//! idempotent while running and `stop` waits for the server task to finish.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use promdecl_core::error::{Error, Result};
use promdecl_core::Registry;

use crate::{app_state::AppState, obs::HttpCollector, router};

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

pub struct Exposer {
    state: AppState,
    path: String,
    collector: Option<HttpCollector>,
    running: Mutex<Option<Running>>,
}

impl Exposer {
    /// Exposer serving `registry` at `/metrics`.
    pub fn new(registry: Registry) -> Self {
        Self {
            state: AppState::new(registry),
            path: "/metrics".into(),
            collector: None,
            running: Mutex::new(None),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_collector(mut self, collector: HttpCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Bind `address:port` and serve in a background task. `address` may be
    /// an IP literal or a host name.
    ///
    /// Returns the bound address. When already running, returns the current
    /// address without binding again.
    pub async fn start(&self, port: u16, address: &str) -> Result<SocketAddr> {
        let mut running = self.running.lock().await;
        if let Some(r) = running.as_ref() {
            tracing::debug!(addr = %r.addr, "metrics exposer already running");
            return Ok(r.addr);
        }

        // Host names are resolved by the bind.
        let listener = TcpListener::bind((address, port))
            .await
            .map_err(|e| Error::Config(format!("bind {address}:{port} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::Internal(format!("local_addr failed: {e}")))?;

        let app = router::build_router(self.state.clone(), &self.path, self.collector.clone());
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
        });

        tracing::info!(%addr, path = %self.path, "metrics exposer started");
        *running = Some(Running {
            addr,
            shutdown: tx,
            task,
        });
        Ok(addr)
    }

    /// Stop the server and wait until it has shut down. No-op when stopped.
    pub async fn stop(&self) -> Result<()> {
        let Some(r) = self.running.lock().await.take() else {
            return Ok(());
        };

        let _ = r.shutdown.send(());
        match r.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::Internal(format!("metrics server failed: {e}"))),
            Err(e) => return Err(Error::Internal(format!("metrics server task failed: {e}"))),
        }

        tracing::info!(addr = %r.addr, "metrics exposer stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.addr)
    }
}
