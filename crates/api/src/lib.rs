//! HTTP API layer for clientdesk.
//!
//! - **Endpoints**: registration, login, staff review and administration,
//!   client self-service
//! - **Extractors**: authenticated user and role gates
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Json, Router, middleware as axum_middleware, routing::get};
use serde_json::{Value, json};

pub use endpoints::router;
pub use middleware::AppState;

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the application: `/api` routes behind the auth middleware plus `/health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
