//! Triage router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! JSON routes are nested under `/api/` and marked `Cache-Control: no-store`
//! because responses carry patient data.

use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the triage router.
pub fn triage_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patients", get(endpoints::directory::patients))
        .route("/patients/:name", get(endpoints::directory::patient))
        .route("/doctors", get(endpoints::directory::doctors))
        .route("/sessions", post(endpoints::sessions::create))
        .route(
            "/sessions/:id",
            get(endpoints::sessions::show).delete(endpoints::sessions::remove),
        )
        .route("/sessions/:id/select", post(endpoints::sessions::select))
        .route("/sessions/:id/start", post(endpoints::sessions::start))
        .route("/sessions/:id/analyze", post(endpoints::sessions::analyze))
        .route("/sessions/:id/reset", post(endpoints::sessions::reset))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(endpoints::page::index))
        .nest("/api", api)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
}
