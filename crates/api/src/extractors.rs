//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use clientdesk_common::AppError;
use clientdesk_core::auth::ensure_active;
use clientdesk_db::entities::user::{self, UserRole};

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        let user = parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        ensure_active(&user)?;
        Ok(Self(user))
    }
}

/// Accountant or admin.
#[derive(Debug, Clone)]
pub struct StaffUser(pub user::Model);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role.is_staff() {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden("staff access required".to_string()))
        }
    }
}

/// Admin only.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role == UserRole::Admin {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden("admin access required".to_string()))
        }
    }
}

/// Client only.
#[derive(Debug, Clone)]
pub struct ClientUser(pub user::Model);

impl<S> FromRequestParts<S> for ClientUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role == UserRole::Client {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden("client access required".to_string()))
        }
    }
}
