//! Company repository.

use std::sync::Arc;

use crate::entities::{Company, company};
use crate::map_write_err;
use clientdesk_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Company repository for database operations.
#[derive(Clone)]
pub struct CompanyRepository {
    db: Arc<DatabaseConnection>,
}

impl CompanyRepository {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a company by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<company::Model>> {
        Company::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the company owned by a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<company::Model>> {
        Company::find()
            .filter(company::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the company owned by a user, returning an error if there is none.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<company::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::CompanyNotFound(format!("no company for user {user_id}")))
    }

    /// Find a company by NIPC.
    pub async fn find_by_nipc(&self, nipc: &str) -> AppResult<Option<company::Model>> {
        Company::find()
            .filter(company::Column::Nipc.eq(nipc))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a company.
    pub async fn update(&self, model: company::ActiveModel) -> AppResult<company::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_company(id: &str, user_id: &str) -> company::Model {
        company::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            company_name: Some("Silva & Associados Lda".to_string()),
            nipc: Some("509876543".to_string()),
            legal_form: "Sociedade por Quotas".to_string(),
            cae: None,
            founding_date: None,
            accounting_regime: None,
            vat_regime: None,
            business_activity: None,
            estimated_revenue: Some(50000.0),
            monthly_invoices: Some(10),
            number_employees: None,
            trade_name: None,
            corporate_object: None,
            address: None,
            postal_code: None,
            city: None,
            county: None,
            district: None,
            country: Some("Portugal".to_string()),
            share_capital: None,
            group_start_date: None,
            bank_name: None,
            iban: None,
            bic: None,
            annual_revenue: None,
            has_stock: None,
            main_clients: None,
            main_suppliers: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id() {
        let company = create_test_company("c1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[company]])
                .into_connection(),
        );

        let repo = CompanyRepository::new(db);
        let found = repo.find_by_user_id("user1").await.unwrap().unwrap();

        assert_eq!(found.id, "c1");
        assert_eq!(found.legal_form, "Sociedade por Quotas");
    }

    #[tokio::test]
    async fn test_get_by_user_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<company::Model>::new()])
                .into_connection(),
        );

        let repo = CompanyRepository::new(db);
        let result = repo.get_by_user_id("user1").await;

        assert!(matches!(result, Err(AppError::CompanyNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_nipc_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<company::Model>::new()])
                .into_connection(),
        );

        let repo = CompanyRepository::new(db);
        assert!(repo.find_by_nipc("509876543").await.unwrap().is_none());
    }
}
