//! Registration and login endpoints.

use axum::{Router, extract::State, http::StatusCode, routing::post};
use chrono::{DateTime, FixedOffset};
use clientdesk_common::AppResult;
use clientdesk_core::{LoginInput, LoginOutput, RegistrationInput};
use clientdesk_db::entities::registration_request::{self, RequestStatus, RequestType};
use serde::Serialize;

use crate::{extractors::Json, middleware::AppState, response::ApiResponse};

/// Registration response.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub submitted_at: DateTime<FixedOffset>,
    pub message: &'static str,
}

impl From<registration_request::Model> for RegisterResponse {
    fn from(request: registration_request::Model) -> Self {
        Self {
            id: request.id,
            username: request.username,
            request_type: request.request_type,
            status: request.status,
            submitted_at: request.submitted_at,
            message: "registration submitted, awaiting accountant approval",
        }
    }
}

/// Submit a registration request.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationInput>,
) -> AppResult<(StatusCode, ApiResponse<RegisterResponse>)> {
    let request = state.registration_service.submit(req).await?;
    Ok(ApiResponse::created(request.into()))
}

/// Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<LoginOutput>> {
    let output = state.auth_service.login(req).await?;
    Ok(ApiResponse::ok(output))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
