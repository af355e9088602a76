//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clientdesk_common::{AppError, config::AuthConfig};
use clientdesk_core::{
    AccountService, ApprovalService, AuthService, DuplicateChecker, RegistrationService,
    TokenIssuer,
};
use clientdesk_db::repositories::{RegistrationRequestRepository, UserRepository};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub registration_service: RegistrationService,
    pub approval_service: ApprovalService,
    pub account_service: AccountService,
}

impl AppState {
    /// Wire every service onto one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, auth: &AuthConfig) -> Self {
        let user_repo = UserRepository::new(db.clone());
        let request_repo = RegistrationRequestRepository::new(db.clone());
        let checker = DuplicateChecker::new(user_repo.clone(), request_repo.clone());

        Self {
            auth_service: AuthService::new(user_repo, TokenIssuer::new(auth)),
            registration_service: RegistrationService::new(request_repo, checker),
            approval_service: ApprovalService::new(db.clone()),
            account_service: AccountService::new(db),
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token puts its user into the request extensions. Bad or
/// missing tokens pass through so public routes keep working. The account
/// status is checked by the extractors of protected routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.auth_service.resolve(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => {}
            Err(err) => return err.into_response(),
        }
    }

    next.run(req).await
}
