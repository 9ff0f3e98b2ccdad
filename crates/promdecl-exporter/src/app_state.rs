//! Shared state for the exposition routes.

use std::sync::Arc;

use promdecl_core::Registry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Registry,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(AppStateInner { registry }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}
