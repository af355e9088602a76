//! Client self-service endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use clientdesk_common::AppResult;
use clientdesk_core::{
    CompanyUpdate, CompleteCompanyData, CompleteUserData, Profile, ProfileUpdate, RequestHistory,
};
use clientdesk_db::entities::{company, user};

use crate::{
    extractors::{ClientUser, Json},
    middleware::AppState,
    response::ApiResponse,
};

async fn get_profile(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.account_service.get_profile(&user.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Only name and phone are editable by the client.
async fn update_profile(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.account_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(user))
}

async fn get_company(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<company::Model>> {
    let company = state.account_service.get_company(&user.id).await?;
    Ok(ApiResponse::ok(company))
}

async fn update_company(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
    Json(req): Json<CompanyUpdate>,
) -> AppResult<ApiResponse<company::Model>> {
    let company = state.account_service.update_company(&user.id, req).await?;
    Ok(ApiResponse::ok(company))
}

async fn request_history(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RequestHistory>> {
    let history = state.account_service.request_history(&user.id).await?;
    Ok(ApiResponse::ok(history))
}

async fn complete_user_data(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
    Json(req): Json<CompleteUserData>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state
        .account_service
        .complete_user_data(&user.id, req)
        .await?;
    Ok(ApiResponse::ok(user))
}

async fn complete_company_data(
    ClientUser(user): ClientUser,
    State(state): State<AppState>,
    Json(req): Json<CompleteCompanyData>,
) -> AppResult<ApiResponse<company::Model>> {
    let company = state
        .account_service
        .complete_company_data(&user.id, req)
        .await?;
    Ok(ApiResponse::ok(company))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/company", get(get_company).put(update_company))
        .route("/requests", get(request_history))
        .route("/complete-user-data", post(complete_user_data))
        .route("/complete-company-data", post(complete_company_data))
}
