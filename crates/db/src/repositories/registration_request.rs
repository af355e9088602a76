//! Registration request repository.

use std::sync::Arc;

use crate::entities::{
    RegistrationRequest,
    registration_request::{self, RequestStatus},
};
use crate::map_write_err;
use clientdesk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Registration request repository for database operations.
#[derive(Clone)]
pub struct RegistrationRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl RegistrationRequestRepository {
    /// Create a new registration request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persist a new request.
    pub async fn create(
        &self,
        model: registration_request::ActiveModel,
    ) -> AppResult<registration_request::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<registration_request::Model>> {
        RegistrationRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<registration_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(id.to_string()))
    }

    /// Find a pending request by NIF.
    pub async fn find_pending_by_nif(
        &self,
        nif: &str,
    ) -> AppResult<Option<registration_request::Model>> {
        self.find_pending_by(registration_request::Column::Nif, nif)
            .await
    }

    /// Find a pending request by email.
    pub async fn find_pending_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<registration_request::Model>> {
        self.find_pending_by(registration_request::Column::Email, email)
            .await
    }

    /// Find a pending request by username.
    pub async fn find_pending_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<registration_request::Model>> {
        self.find_pending_by(registration_request::Column::Username, username)
            .await
    }

    async fn find_pending_by(
        &self,
        column: registration_request::Column,
        value: &str,
    ) -> AppResult<Option<registration_request::Model>> {
        RegistrationRequest::find()
            .filter(registration_request::Column::Status.eq(RequestStatus::Pending))
            .filter(column.eq(value))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending requests, oldest first.
    pub async fn find_pending(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<registration_request::Model>> {
        RegistrationRequest::find()
            .filter(registration_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_asc(registration_request::Column::SubmittedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get requests, newest first, with optional status filter.
    pub async fn find_all(
        &self,
        status: Option<RequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<registration_request::Model>> {
        let mut query =
            RegistrationRequest::find().order_by_desc(registration_request::Column::SubmittedAt);

        if let Some(s) = status {
            query = query.filter(registration_request::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the request a user was materialized from.
    pub async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<registration_request::Model>> {
        RegistrationRequest::find()
            .filter(registration_request::Column::UserId.eq(user_id))
            .order_by_desc(registration_request::Column::SubmittedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::registration_request::RequestType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_request(id: &str, status: RequestStatus) -> registration_request::Model {
        registration_request::Model {
            id: id.to_string(),
            approval_token: "0123456789abcdef0123456789abcdef".to_string(),
            request_type: RequestType::NewClient,
            status,
            submitted_at: Utc::now().into(),
            reviewed_at: None,
            reviewed_by: None,
            review_notes: None,
            username: "joao.silva".to_string(),
            password_hash: "hash".to_string(),
            name: Some("João Silva".to_string()),
            email: Some("joao@example.com".to_string()),
            phone: None,
            nif: Some("123456789".to_string()),
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
            address: None,
            postal_code: None,
            city: None,
            country: None,
            official_email: None,
            billing_software: None,
            preferred_format: None,
            report_frequency: None,
            preferred_contact_hours: None,
            legal_form: "Sociedade por Quotas".to_string(),
            company_name: None,
            nipc: None,
            cae: None,
            founding_date: None,
            accounting_regime: None,
            vat_regime: None,
            business_activity: None,
            estimated_revenue: None,
            monthly_invoices: None,
            number_employees: None,
            trade_name: None,
            corporate_object: None,
            company_address: None,
            company_postal_code: None,
            company_city: None,
            company_county: None,
            company_district: None,
            company_country: None,
            share_capital: None,
            group_start_date: None,
            bank_name: None,
            iban: None,
            bic: None,
            annual_revenue: None,
            has_stock: None,
            main_clients: None,
            main_suppliers: None,
            user_id: None,
            company_id: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<registration_request::Model>::new()])
                .into_connection(),
        );

        let repo = RegistrationRequestRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::RequestNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_pending_by_nif() {
        let request = create_test_request("req1", RequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request]])
                .into_connection(),
        );

        let repo = RegistrationRequestRepository::new(db);
        let found = repo.find_pending_by_nif("123456789").await.unwrap().unwrap();

        assert_eq!(found.id, "req1");
        assert!(found.linkage_consistent());
    }

    #[tokio::test]
    async fn test_find_pending_returns_only_pending() {
        let a = create_test_request("req1", RequestStatus::Pending);
        let b = create_test_request("req2", RequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a, b]])
                .into_connection(),
        );

        let repo = RegistrationRequestRepository::new(db);
        let pending = repo.find_pending(50, 0).await.unwrap();

        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.status == RequestStatus::Pending));
    }

    #[test]
    fn test_linkage_consistency() {
        let mut request = create_test_request("req1", RequestStatus::Approved);
        assert!(!request.linkage_consistent());

        request.user_id = Some("user1".to_string());
        assert!(!request.linkage_consistent());

        request.company_id = Some("company1".to_string());
        assert!(request.linkage_consistent());

        request.status = RequestStatus::Rejected;
        assert!(!request.linkage_consistent());
    }
}
