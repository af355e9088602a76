//! User repository.

use std::sync::Arc;

use crate::entities::{
    Company, User, company,
    user::{self, UserRole, UserStatus},
};
use crate::map_write_err;
use clientdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by NIF.
    pub async fn find_by_nif(&self, nif: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Nif.eq(nif))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// List users, newest first, optionally filtered by status and role.
    pub async fn find_all(
        &self,
        status: Option<UserStatus>,
        role: Option<UserRole>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find().order_by_desc(user::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(user::Column::Status.eq(s));
        }
        if let Some(r) = role {
            query = query.filter(user::Column::Role.eq(r));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Like [`Self::find_all`], pairing each user with the company they own.
    pub async fn find_all_with_company(
        &self,
        status: Option<UserStatus>,
        role: Option<UserRole>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<(user::Model, Option<company::Model>)>> {
        let mut query = User::find()
            .find_also_related(Company)
            .order_by_desc(user::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(user::Column::Status.eq(s));
        }
        if let Some(r) = role {
            query = query.filter(user::Column::Role.eq(r));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str, status: UserStatus) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: "hash".to_string(),
            name: Some("Test User".to_string()),
            phone: None,
            nif: Some("123456789".to_string()),
            role: UserRole::Client,
            status,
            date_of_birth: None,
            marital_status: None,
            citizen_card_number: None,
            citizen_card_expiry: None,
            tax_residence_country: Some("Portugal".to_string()),
            fixed_phone: None,
            fiscal_address: None,
            fiscal_postal_code: None,
            fiscal_city: None,
            fiscal_county: None,
            fiscal_district: None,
            official_email: None,
            billing_software: None,
            preferred_format: Some("digital".to_string()),
            report_frequency: Some("mensal".to_string()),
            preferred_contact_hours: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "joao", UserStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().username, "joao");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_nif() {
        let user = create_test_user("user1", "joao", UserStatus::Rejected);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.find_by_nif("123456789").await.unwrap().unwrap();

        assert_eq!(found.status, UserStatus::Rejected);
    }

    #[tokio::test]
    async fn test_find_all_filters() {
        let a = create_test_user("user1", "a", UserStatus::Approved);
        let b = create_test_user("user2", "b", UserStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a, b]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let users = repo
            .find_all(Some(UserStatus::Approved), Some(UserRole::Client), 10, 0)
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.status == UserStatus::Approved));
    }
}
