//! Router assembly: common routes, OpenAPI document and the beer resource.

mod beer;
mod common;

pub use beer::beer_routes;
pub use common::{common_routes, common_routes_with_ready};

use crate::docs::docs_routes;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Default request body limit for JSON payloads (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Full application: `/health`, `/ready`, `/version`, `/api-docs/openapi.json` and `/api/v1/beer`.
pub fn app(state: AppState) -> Router {
    app_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

pub fn app_with_body_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(docs_routes())
        .nest("/api/v1", beer_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}
