//! Axum router wiring for the exposition endpoint.

use axum::{http::StatusCode, middleware, routing::get, Router};

use crate::{app_state::AppState, obs::HttpCollector, ops};

/// Router serving the registry at `path`, optionally recording every
/// request through `collector`.
pub fn build_router(state: AppState, path: &str, collector: Option<HttpCollector>) -> Router {
    let router = Router::new()
        .route(path, get(ops::metrics))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(state);

    match collector {
        Some(c) => router.layer(middleware::from_fn_with_state(c, crate::obs::track)),
        None => router,
    }
}
