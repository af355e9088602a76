//! Account directory: self-service profile management and staff administration
//! of materialized clients.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clientdesk_common::{AppError, AppResult, IdGenerator, flexible};
use clientdesk_db::{
    entities::{
        Company, User, company,
        registration_request::{RequestStatus, RequestType},
        user::{self, UserRole, UserStatus},
    },
    repositories::{CompanyRepository, RegistrationRequestRepository, UserRepository},
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::auth::hash_password;
use super::materialize::overlay;

/// Upper bound for a single page of users.
const MAX_PAGE_SIZE: u64 = 100;

/// A user together with the company they own.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: user::Model,
    pub company: Option<company::Model>,
}

/// Fields a client may change on their own profile. Blank values are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(length(max = 256))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Fields a client may change on their own company.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompanyUpdate {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(length(max = 256))]
    pub trade_name: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub postal_code: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub city: Option<String>,
}

/// Personal details completed after approval.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteUserData {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub citizen_card_number: Option<String>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub citizen_card_expiry: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fixed_phone: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_county: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_district: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(email)]
    pub official_email: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub billing_software: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_format: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub report_frequency: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_contact_hours: Option<String>,
}

/// Company details completed after approval.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteCompanyData {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub trade_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub corporate_object: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub cae: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub share_capital: Option<f64>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub group_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::i32_opt")]
    pub number_employees: Option<i32>,
    #[serde(default, deserialize_with = "flexible::i32_opt")]
    pub monthly_invoices: Option<i32>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub annual_revenue: Option<f64>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub iban: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub bic: Option<String>,
    #[serde(default)]
    pub has_stock: Option<bool>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub main_clients: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub main_suppliers: Option<String>,
}

/// Staff edit of a client's personal data. Only present keys are applied.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub nif: Option<String>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub citizen_card_number: Option<String>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub citizen_card_expiry: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub tax_residence_country: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fixed_phone: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_address: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_postal_code: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_city: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_county: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub fiscal_district: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(email)]
    pub official_email: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub billing_software: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_format: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub report_frequency: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_contact_hours: Option<String>,
}

/// Staff edit of a client's company. Only present keys are applied.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompanyPatch {
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub nipc: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub legal_form: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub cae: Option<String>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub founding_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub accounting_regime: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub vat_regime: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub business_activity: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub estimated_revenue: Option<f64>,
    #[serde(default, deserialize_with = "flexible::i32_opt")]
    pub monthly_invoices: Option<i32>,
    #[serde(default, deserialize_with = "flexible::i32_opt")]
    pub number_employees: Option<i32>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub trade_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub corporate_object: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub share_capital: Option<f64>,
    #[serde(default, deserialize_with = "flexible::date_opt")]
    pub group_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub iban: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub bic: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub has_stock: Option<bool>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub main_clients: Option<String>,
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub main_suppliers: Option<String>,
}

/// Input for creating a user without a registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub nif: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub status: UserStatus,
}

/// Submission and review facts of the request a user came from.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub id: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub submitted_at: DateTime<FixedOffset>,
    pub reviewed_at: Option<DateTime<FixedOffset>>,
    pub review_notes: Option<String>,
}

/// A client's view of their onboarding history.
#[derive(Debug, Clone, Serialize)]
pub struct RequestHistory {
    pub user_status: UserStatus,
    pub request: Option<RequestSummary>,
}

/// Account directory service.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    request_repo: RegistrationRequestRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            company_repo: CompanyRepository::new(db.clone()),
            request_repo: RegistrationRequestRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Self-service ====================

    /// Get a user's profile with their company.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<Profile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let company = self.company_repo.find_by_user_id(user_id).await?;
        Ok(Profile { user, company })
    }

    /// Update the caller's name and phone.
    pub async fn update_profile(&self, user_id: &str, input: ProfileUpdate) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        overlay(&mut active.name, input.name.as_ref());
        overlay(&mut active.phone, input.phone.as_ref());
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Get the caller's company.
    pub async fn get_company(&self, user_id: &str) -> AppResult<company::Model> {
        self.company_repo.get_by_user_id(user_id).await
    }

    /// Update the restricted subset of company fields a client may edit.
    pub async fn update_company(
        &self,
        user_id: &str,
        input: CompanyUpdate,
    ) -> AppResult<company::Model> {
        input.validate()?;

        let company = self.company_repo.get_by_user_id(user_id).await?;
        let mut active: company::ActiveModel = company.into();

        overlay(&mut active.trade_name, input.trade_name.as_ref());
        overlay(&mut active.address, input.address.as_ref());
        overlay(&mut active.postal_code, input.postal_code.as_ref());
        overlay(&mut active.city, input.city.as_ref());
        active.updated_at = Set(Some(Utc::now().into()));

        self.company_repo.update(active).await
    }

    /// Fill in personal details left out of the registration form.
    pub async fn complete_user_data(
        &self,
        user_id: &str,
        input: CompleteUserData,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        overlay(&mut active.marital_status, input.marital_status.as_ref());
        overlay(&mut active.citizen_card_number, input.citizen_card_number.as_ref());
        overlay(&mut active.citizen_card_expiry, input.citizen_card_expiry.as_ref());
        overlay(&mut active.fixed_phone, input.fixed_phone.as_ref());
        overlay(&mut active.fiscal_county, input.fiscal_county.as_ref());
        overlay(&mut active.fiscal_district, input.fiscal_district.as_ref());
        overlay(&mut active.official_email, input.official_email.as_ref());
        overlay(&mut active.billing_software, input.billing_software.as_ref());
        overlay(&mut active.preferred_format, input.preferred_format.as_ref());
        overlay(&mut active.report_frequency, input.report_frequency.as_ref());
        overlay(
            &mut active.preferred_contact_hours,
            input.preferred_contact_hours.as_ref(),
        );
        active.updated_at = Set(Some(Utc::now().into()));

        let user = self.user_repo.update(active).await?;
        info!(user_id = %user.id, "Completed user data");
        Ok(user)
    }

    /// Fill in company details left out of the registration form.
    pub async fn complete_company_data(
        &self,
        user_id: &str,
        input: CompleteCompanyData,
    ) -> AppResult<company::Model> {
        input.validate()?;

        let company = self.company_repo.get_by_user_id(user_id).await?;
        let mut active: company::ActiveModel = company.into();

        overlay(&mut active.trade_name, input.trade_name.as_ref());
        overlay(&mut active.corporate_object, input.corporate_object.as_ref());
        overlay(&mut active.cae, input.cae.as_ref());
        overlay(&mut active.county, input.county.as_ref());
        overlay(&mut active.district, input.district.as_ref());
        overlay(&mut active.share_capital, input.share_capital.as_ref());
        overlay(&mut active.group_start_date, input.group_start_date.as_ref());
        overlay(&mut active.number_employees, input.number_employees.as_ref());
        overlay(&mut active.monthly_invoices, input.monthly_invoices.as_ref());
        overlay(&mut active.annual_revenue, input.annual_revenue.as_ref());
        overlay(&mut active.bank_name, input.bank_name.as_ref());
        overlay(&mut active.iban, input.iban.as_ref());
        overlay(&mut active.bic, input.bic.as_ref());
        overlay(&mut active.has_stock, input.has_stock.as_ref());
        overlay(&mut active.main_clients, input.main_clients.as_ref());
        overlay(&mut active.main_suppliers, input.main_suppliers.as_ref());
        active.updated_at = Set(Some(Utc::now().into()));

        let company = self.company_repo.update(active).await?;
        info!(user_id, company_id = %company.id, "Completed company data");
        Ok(company)
    }

    /// Current status and the originating request, if any.
    pub async fn request_history(&self, user_id: &str) -> AppResult<RequestHistory> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let request = self
            .request_repo
            .find_by_user_id(user_id)
            .await?
            .map(|r| RequestSummary {
                id: r.id,
                request_type: r.request_type,
                status: r.status,
                submitted_at: r.submitted_at,
                reviewed_at: r.reviewed_at,
                review_notes: r.review_notes,
            });

        Ok(RequestHistory {
            user_status: user.status,
            request,
        })
    }

    // ==================== Administration ====================

    /// List users, optionally filtered by status and role.
    pub async fn list_users(
        &self,
        status: Option<UserStatus>,
        role: Option<UserRole>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo
            .find_all(status, role, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Get any user with their company.
    pub async fn get_user(&self, user_id: &str) -> AppResult<Profile> {
        self.get_profile(user_id).await
    }

    /// Approved clients with their companies.
    pub async fn list_approved_clients(&self, limit: u64, offset: u64) -> AppResult<Vec<Profile>> {
        let rows = self
            .user_repo
            .find_all_with_company(
                Some(UserStatus::Approved),
                Some(UserRole::Client),
                limit.min(MAX_PAGE_SIZE),
                offset,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, company)| Profile { user, company })
            .collect())
    }

    /// Apply a staff patch to a client's personal data.
    pub async fn update_client(&self, client_id: &str, patch: UserPatch) -> AppResult<user::Model> {
        patch.validate()?;

        let client = self.get_client(client_id).await?;
        let mut active: user::ActiveModel = client.into();

        overlay(&mut active.name, patch.name.as_ref());
        overlay(&mut active.email, patch.email.as_ref());
        overlay(&mut active.phone, patch.phone.as_ref());
        overlay(&mut active.nif, patch.nif.as_ref());
        overlay(&mut active.date_of_birth, patch.date_of_birth.as_ref());
        overlay(&mut active.marital_status, patch.marital_status.as_ref());
        overlay(&mut active.citizen_card_number, patch.citizen_card_number.as_ref());
        overlay(&mut active.citizen_card_expiry, patch.citizen_card_expiry.as_ref());
        overlay(&mut active.tax_residence_country, patch.tax_residence_country.as_ref());
        overlay(&mut active.fixed_phone, patch.fixed_phone.as_ref());
        overlay(&mut active.fiscal_address, patch.fiscal_address.as_ref());
        overlay(&mut active.fiscal_postal_code, patch.fiscal_postal_code.as_ref());
        overlay(&mut active.fiscal_city, patch.fiscal_city.as_ref());
        overlay(&mut active.fiscal_county, patch.fiscal_county.as_ref());
        overlay(&mut active.fiscal_district, patch.fiscal_district.as_ref());
        overlay(&mut active.official_email, patch.official_email.as_ref());
        overlay(&mut active.billing_software, patch.billing_software.as_ref());
        overlay(&mut active.preferred_format, patch.preferred_format.as_ref());
        overlay(&mut active.report_frequency, patch.report_frequency.as_ref());
        overlay(
            &mut active.preferred_contact_hours,
            patch.preferred_contact_hours.as_ref(),
        );
        active.updated_at = Set(Some(Utc::now().into()));

        let user = self.user_repo.update(active).await?;
        info!(client_id, "Client updated by staff");
        Ok(user)
    }

    /// Apply a staff patch to a client's company.
    pub async fn update_client_company(
        &self,
        client_id: &str,
        patch: CompanyPatch,
    ) -> AppResult<company::Model> {
        patch.validate()?;

        let client = self.get_client(client_id).await?;
        let company = self.company_repo.get_by_user_id(&client.id).await?;
        let mut active: company::ActiveModel = company.into();

        if let Some(legal_form) = patch.legal_form {
            active.legal_form = Set(legal_form);
        }
        overlay(&mut active.company_name, patch.company_name.as_ref());
        overlay(&mut active.nipc, patch.nipc.as_ref());
        overlay(&mut active.cae, patch.cae.as_ref());
        overlay(&mut active.founding_date, patch.founding_date.as_ref());
        overlay(&mut active.accounting_regime, patch.accounting_regime.as_ref());
        overlay(&mut active.vat_regime, patch.vat_regime.as_ref());
        overlay(&mut active.business_activity, patch.business_activity.as_ref());
        overlay(&mut active.estimated_revenue, patch.estimated_revenue.as_ref());
        overlay(&mut active.monthly_invoices, patch.monthly_invoices.as_ref());
        overlay(&mut active.number_employees, patch.number_employees.as_ref());
        overlay(&mut active.trade_name, patch.trade_name.as_ref());
        overlay(&mut active.corporate_object, patch.corporate_object.as_ref());
        overlay(&mut active.address, patch.address.as_ref());
        overlay(&mut active.postal_code, patch.postal_code.as_ref());
        overlay(&mut active.city, patch.city.as_ref());
        overlay(&mut active.county, patch.county.as_ref());
        overlay(&mut active.district, patch.district.as_ref());
        overlay(&mut active.country, patch.country.as_ref());
        overlay(&mut active.share_capital, patch.share_capital.as_ref());
        overlay(&mut active.group_start_date, patch.group_start_date.as_ref());
        overlay(&mut active.bank_name, patch.bank_name.as_ref());
        overlay(&mut active.iban, patch.iban.as_ref());
        overlay(&mut active.bic, patch.bic.as_ref());
        overlay(&mut active.annual_revenue, patch.annual_revenue.as_ref());
        overlay(&mut active.has_stock, patch.has_stock.as_ref());
        overlay(&mut active.main_clients, patch.main_clients.as_ref());
        overlay(&mut active.main_suppliers, patch.main_suppliers.as_ref());
        active.updated_at = Set(Some(Utc::now().into()));

        let company = self.company_repo.update(active).await?;
        info!(client_id, company_id = %company.id, "Client company updated by staff");
        Ok(company)
    }

    /// Set a user's status. Only terminal review states are accepted.
    pub async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> AppResult<user::Model> {
        if status == UserStatus::Pending {
            return Err(AppError::BadRequest(
                "status must be approved, rejected or blocked".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let previous = user.status;
        let mut active: user::ActiveModel = user.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));

        let user = self.user_repo.update(active).await?;
        info!(user_id, ?previous, ?status, "User status changed");
        Ok(user)
    }

    /// Delete a client and their company.
    ///
    /// Registration requests are kept; their linkage ids become historical.
    pub async fn delete_client(&self, client_id: &str) -> AppResult<()> {
        let client = self.get_client(client_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = async {
            Company::delete_many()
                .filter(company::Column::UserId.eq(client.id.as_str()))
                .exec(&txn)
                .await?;
            User::delete_by_id(client.id.as_str()).exec(&txn).await?;
            Ok::<_, sea_orm::DbErr>(())
        }
        .await;

        match result {
            Ok(()) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!(client_id, "Client deleted");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(client_id, error = %rollback_err, "Rollback failed");
                }
                Err(AppError::Database(e.to_string()))
            }
        }
    }

    /// Create a user directly, bypassing the registration queue.
    pub async fn create_user_direct(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("this username is already in use".to_string()));
        }
        if let Some(email) = &input.email
            && self.user_repo.find_by_email(email).await?.is_some()
        {
            return Err(AppError::Conflict("this email is already in use".to_string()));
        }
        if let Some(nif) = &input.nif
            && self.user_repo.find_by_nif(nif).await?.is_some()
        {
            return Err(AppError::Conflict("this NIF is already in use".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(&input.password)?),
            email: Set(input.email),
            name: Set(input.name),
            phone: Set(input.phone),
            nif: Set(input.nif),
            role: Set(input.role),
            status: Set(input.status),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, role = ?user.role, status = ?user.status, "User created directly");
        Ok(user)
    }

    /// Create a staff account unless the username is taken.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_staff_account(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> AppResult<bool> {
        if !role.is_staff() {
            return Err(AppError::BadRequest(format!("{role:?} is not a staff role")));
        }
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        self.create_user_direct(CreateUserInput {
            username: username.to_string(),
            password: password.to_string(),
            email: email.map(String::from),
            name: None,
            phone: None,
            nif: None,
            role,
            status: UserStatus::Approved,
        })
        .await?;
        Ok(true)
    }

    async fn get_client(&self, client_id: &str) -> AppResult<user::Model> {
        match self.user_repo.find_by_id(client_id).await? {
            Some(user) if user.role == UserRole::Client => Ok(user),
            _ => Err(AppError::NotFound(format!("client {client_id}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn staff_user() -> user::Model {
        user::Model {
            id: "staff1".to_string(),
            username: "contabilista".to_string(),
            email: None,
            password_hash: "hash".to_string(),
            name: None,
            phone: None,
            nif: None,
            role: UserRole::Accountant,
            status: UserStatus::Approved,
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

    #[tokio::test]
    async fn test_patch_on_staff_target_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[staff_user()]])
                .into_connection(),
        );

        let service = AccountService::new(db);
        let result = service.update_client("staff1", UserPatch::default()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_is_not_a_valid_status_change() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AccountService::new(db);

        let result = service.update_user_status("user1", UserStatus::Pending).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_ensure_staff_account_skips_existing_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[staff_user()]])
                .into_connection(),
        );

        let service = AccountService::new(db);
        let created = service
            .ensure_staff_account("contabilista", "password123", None, UserRole::Accountant)
            .await
            .unwrap();

        assert!(!created);
    }

    #[test]
    fn test_profile_update_ignores_blank_values() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"name": "  ", "phone": "912345678", "nif": "999"}"#).unwrap();

        assert!(update.name.is_none());
        assert_eq!(update.phone.as_deref(), Some("912345678"));
    }

    #[test]
    fn test_company_patch_accepts_numeric_strings() {
        let patch: CompanyPatch = serde_json::from_str(
            r#"{"share_capital": "5000.50", "number_employees": "12", "has_stock": true}"#,
        )
        .unwrap();

        assert_eq!(patch.share_capital, Some(5000.5));
        assert_eq!(patch.number_employees, Some(12));
        assert_eq!(patch.has_stock, Some(true));
        assert!(patch.nipc.is_none());
    }
}
