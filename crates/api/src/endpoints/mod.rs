//! API endpoints.

mod account;
mod admin;
mod auth;
mod client;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(account::router())
        .nest("/admin", admin::router())
        .nest("/client", client::router())
}
