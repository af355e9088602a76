//! Authentication: password hashing, access tokens and the account status gate.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use clientdesk_common::{AppError, AppResult, config::AuthConfig};
use clientdesk_db::{
    entities::user::{self, UserRole, UserStatus},
    repositories::UserRepository,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub username: String,
    pub nif: Option<String>,
    pub role: UserRole,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_secret(config.jwt_secret.as_bytes(), Duration::days(config.token_ttl_days))
    }

    /// Create an issuer from a raw secret and lifetime.
    #[must_use]
    pub fn with_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user: &user::Model) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            nif: user.nif.clone(),
            role: user.role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token's signature and expiry.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                AppError::Unauthorized
            })
    }
}

/// Login credentials.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub token: String,
    pub user: user::Model,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, tokens: TokenIssuer) -> Self {
        Self { user_repo, tokens }
    }

    /// Exchange credentials for an access token.
    ///
    /// Unknown users and wrong passwords are indistinguishable. The status
    /// gate runs only after the password checks out.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginOutput> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        ensure_active(&user)?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, role = ?user.role, "User logged in");

        Ok(LoginOutput { token, user })
    }

    /// Resolve a bearer token to its user, whatever the account status.
    pub async fn resolve(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;

        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Resolve a bearer token to an active user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let user = self.resolve(token).await?;
        ensure_active(&user)?;
        Ok(user)
    }
}

/// Reject users whose status does not allow access.
pub fn ensure_active(user: &user::Model) -> AppResult<()> {
    match user.status {
        UserStatus::Approved => Ok(()),
        UserStatus::Pending => Err(AppError::AccountPending),
        UserStatus::Rejected => Err(AppError::AccountRejected),
        UserStatus::Blocked => Err(AppError::AccountBlocked),
    }
}

/// Hash a password with Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(status: UserStatus, password_hash: &str) -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "joao.silva".to_string(),
            email: None,
            password_hash: password_hash.to_string(),
            name: None,
            phone: None,
            nif: Some("123456789".to_string()),
            role: UserRole::Client,
            status,
            date_of_birth: None,
            marital_status: None,
            citizen_card_number: None,
            citizen_card_expiry: None,
            tax_residence_country: None,
            fixed_phone: None,
            fiscal_address: None,
            fiscal_postal_code: None,
            fiscal_city: None,
            fiscal_county: None,
            fiscal_district: None,
            official_email: None,
            billing_software: None,
            preferred_format: None,
            report_frequency: None,
            preferred_contact_hours: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::with_secret(b"test-secret", Duration::days(10))
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_token_carries_identity_and_ten_day_expiry() {
        let user = test_user(UserStatus::Approved, "x");
        let token = issuer().issue(&user).unwrap();
        let claims = issuer().verify(&token).unwrap();

        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.username, "joao.silva");
        assert_eq!(claims.nif.as_deref(), Some("123456789"));
        assert_eq!(claims.role, UserRole::Client);
        assert_eq!(claims.exp - claims.iat, Duration::days(10).num_seconds());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let user = test_user(UserStatus::Approved, "x");
        let token = TokenIssuer::with_secret(b"other", Duration::days(1))
            .issue(&user)
            .unwrap();

        assert!(matches!(issuer().verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let user = test_user(UserStatus::Approved, "x");
        let token = TokenIssuer::with_secret(b"test-secret", Duration::days(-1))
            .issue(&user)
            .unwrap();

        assert!(matches!(issuer().verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_status_gate() {
        assert!(ensure_active(&test_user(UserStatus::Approved, "x")).is_ok());
        assert!(matches!(
            ensure_active(&test_user(UserStatus::Pending, "x")),
            Err(AppError::AccountPending)
        ));
        assert!(matches!(
            ensure_active(&test_user(UserStatus::Rejected, "x")),
            Err(AppError::AccountRejected)
        ));
        assert!(matches!(
            ensure_active(&test_user(UserStatus::Blocked, "x")),
            Err(AppError::AccountBlocked)
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let hash = hash_password("password123").unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user(UserStatus::Approved, &hash)]])
                .into_connection(),
        );

        let service = AuthService::new(UserRepository::new(db), issuer());
        let result = service
            .login(LoginInput {
                username: "joao.silva".to_string(),
                password: "not-the-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_blocked_user_gets_status_error() {
        let hash = hash_password("password123").unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user(UserStatus::Blocked, &hash)]])
                .into_connection(),
        );

        let service = AuthService::new(UserRepository::new(db), issuer());
        let result = service
            .login(LoginInput {
                username: "joao.silva".to_string(),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::AccountBlocked)));
    }

    #[tokio::test]
    async fn test_authenticate_pending_user() {
        let user = test_user(UserStatus::Pending, "x");
        let token = issuer().issue(&user).unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = AuthService::new(UserRepository::new(db), issuer());
        let result = service.authenticate(&token).await;

        assert!(matches!(result, Err(AppError::AccountPending)));
    }

    #[tokio::test]
    async fn test_resolve_skips_status_gate() {
        let user = test_user(UserStatus::Blocked, "x");
        let token = issuer().issue(&user).unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = AuthService::new(UserRepository::new(db), issuer());
        let resolved = service.resolve(&token).await.unwrap();

        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.status, UserStatus::Blocked);
    }
}
