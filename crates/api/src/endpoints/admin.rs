//! Staff endpoints: review queue, decisions and client administration.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use clientdesk_common::AppResult;
use clientdesk_core::{CompanyPatch, CreateUserInput, Decision, Profile, UserPatch};
use clientdesk_db::entities::{
    company,
    registration_request::{self, RequestStatus},
    user::{self, UserRole, UserStatus},
};
use serde::Deserialize;

use crate::{
    extractors::{AdminUser, Json, StaffUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

const fn default_limit() -> u64 {
    50
}

// ==================== Types ====================

/// Pagination query.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List requests query.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List users query.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Decision on a registration request.
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub request_id: String,
    pub decision: Decision,
    #[serde(default)]
    pub notes: Option<String>,
}

/// User status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

// ==================== Review Queue ====================

async fn list_pending_requests(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<registration_request::Model>>> {
    let requests = state
        .registration_service
        .list_pending(query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(requests))
}

async fn list_requests(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<ApiResponse<Vec<registration_request::Model>>> {
    let requests = state
        .registration_service
        .list(query.status, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(requests))
}

async fn get_request(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<registration_request::Model>> {
    let request = state.registration_service.get(&id).await?;
    Ok(ApiResponse::ok(request))
}

/// Approve or reject a pending request.
async fn decide_request(
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> AppResult<ApiResponse<registration_request::Model>> {
    let request = state
        .approval_service
        .decide(&req.request_id, req.decision, &staff.id, req.notes.as_deref())
        .await?;
    Ok(ApiResponse::ok(request))
}

// ==================== Users ====================

async fn list_users(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<user::Model>>> {
    let users = state
        .account_service
        .list_users(query.status, query.role, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

async fn get_user(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.account_service.get_user(&id).await?;
    Ok(ApiResponse::ok(profile))
}

async fn create_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserInput>,
) -> AppResult<(StatusCode, ApiResponse<user::Model>)> {
    let user = state.account_service.create_user_direct(req).await?;
    Ok(ApiResponse::created(user))
}

async fn update_user_status(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state
        .account_service
        .update_user_status(&id, req.status)
        .await?;
    Ok(ApiResponse::ok(user))
}

// ==================== Clients ====================

async fn list_clients(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Profile>>> {
    let clients = state
        .account_service
        .list_approved_clients(query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(clients))
}

async fn update_client(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.account_service.update_client(&id, patch).await?;
    Ok(ApiResponse::ok(user))
}

async fn update_client_company(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CompanyPatch>,
) -> AppResult<ApiResponse<company::Model>> {
    let company = state
        .account_service
        .update_client_company(&id, patch)
        .await?;
    Ok(ApiResponse::ok(company))
}

async fn delete_client(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.account_service.delete_client(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Review queue
        .route("/pending-requests", get(list_pending_requests))
        .route("/requests", get(list_requests))
        .route("/requests/{id}", get(get_request))
        .route("/decide-request", post(decide_request))
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/status", put(update_user_status))
        // Clients
        .route("/clients", get(list_clients))
        .route(
            "/clients/{id}",
            put(update_client).delete(delete_client),
        )
        .route("/clients/{id}/company", put(update_client_company))
}
