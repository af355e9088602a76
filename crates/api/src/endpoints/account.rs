//! Profile endpoint shared by every role.

use axum::{Router, extract::State, routing::get};
use clientdesk_common::AppResult;
use clientdesk_core::Profile;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// The caller's own profile with their company.
async fn profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.account_service.get_profile(&user.id).await?;
    Ok(ApiResponse::ok(profile))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}
