//! Registration submission and the review queue.

use chrono::{NaiveDate, Utc};
use clientdesk_common::{AppError, AppResult, IdGenerator, flexible};
use clientdesk_db::{
    entities::registration_request::{self, RequestStatus, RequestType},
    repositories::RegistrationRequestRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::auth::hash_password;
use super::duplicate_check::{DuplicateChecker, Identity};

/// Upper bound for a single page of requests.
const MAX_PAGE_SIZE: u64 = 100;

/// Everything a prospective client submits.
///
/// Only `username`, `password` and `legal_form` are required; the rest may
/// be completed after approval. Numbers may arrive as strings and blank
/// values count as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegistrationInput {
    #[serde(default)]
    pub request_type: Option<RequestType>,

    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub legal_form: String,

    // === Personal ===
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
    pub address: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub postal_code: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub official_email: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub billing_software: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_format: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub report_frequency: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub preferred_contact_hours: Option<String>,

    // === Company ===
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_name: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub nipc: Option<String>,

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
    pub company_address: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_postal_code: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_city: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_county: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_district: Option<String>,

    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub company_country: Option<String>,

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

impl RegistrationInput {
    fn into_active_model(
        self,
        id: String,
        approval_token: String,
        password_hash: String,
    ) -> registration_request::ActiveModel {
        let now = Utc::now();
        registration_request::ActiveModel {
            id: Set(id),
            approval_token: Set(approval_token),
            request_type: Set(self.request_type.unwrap_or_default()),
            status: Set(RequestStatus::Pending),
            submitted_at: Set(now.into()),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
            review_notes: Set(None),
            username: Set(self.username.trim().to_string()),
            password_hash: Set(password_hash),
            legal_form: Set(self.legal_form.trim().to_string()),
            name: Set(self.name),
            email: Set(self.email),
            phone: Set(self.phone),
            nif: Set(self.nif),
            date_of_birth: Set(self.date_of_birth),
            marital_status: Set(self.marital_status),
            citizen_card_number: Set(self.citizen_card_number),
            citizen_card_expiry: Set(self.citizen_card_expiry),
            tax_residence_country: Set(self.tax_residence_country),
            fixed_phone: Set(self.fixed_phone),
            fiscal_address: Set(self.fiscal_address),
            fiscal_postal_code: Set(self.fiscal_postal_code),
            fiscal_city: Set(self.fiscal_city),
            fiscal_county: Set(self.fiscal_county),
            fiscal_district: Set(self.fiscal_district),
            address: Set(self.address),
            postal_code: Set(self.postal_code),
            city: Set(self.city),
            country: Set(self.country),
            official_email: Set(self.official_email),
            billing_software: Set(self.billing_software),
            preferred_format: Set(self.preferred_format),
            report_frequency: Set(self.report_frequency),
            preferred_contact_hours: Set(self.preferred_contact_hours),
            company_name: Set(self.company_name),
            nipc: Set(self.nipc),
            cae: Set(self.cae),
            founding_date: Set(self.founding_date),
            accounting_regime: Set(self.accounting_regime),
            vat_regime: Set(self.vat_regime),
            business_activity: Set(self.business_activity),
            estimated_revenue: Set(self.estimated_revenue),
            monthly_invoices: Set(self.monthly_invoices),
            number_employees: Set(self.number_employees),
            trade_name: Set(self.trade_name),
            corporate_object: Set(self.corporate_object),
            company_address: Set(self.company_address),
            company_postal_code: Set(self.company_postal_code),
            company_city: Set(self.company_city),
            company_county: Set(self.company_county),
            company_district: Set(self.company_district),
            company_country: Set(self.company_country),
            share_capital: Set(self.share_capital),
            group_start_date: Set(self.group_start_date),
            bank_name: Set(self.bank_name),
            iban: Set(self.iban),
            bic: Set(self.bic),
            annual_revenue: Set(self.annual_revenue),
            has_stock: Set(self.has_stock),
            main_clients: Set(self.main_clients),
            main_suppliers: Set(self.main_suppliers),
            user_id: Set(None),
            company_id: Set(None),
            updated_at: Set(None),
        }
    }
}

/// Registration service: intake and review queue reads.
#[derive(Clone)]
pub struct RegistrationService {
    request_repo: RegistrationRequestRepository,
    checker: DuplicateChecker,
    id_gen: IdGenerator,
}

impl RegistrationService {
    /// Create a new registration service.
    #[must_use]
    pub const fn new(request_repo: RegistrationRequestRepository, checker: DuplicateChecker) -> Self {
        Self {
            request_repo,
            checker,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate, de-duplicate and stage a registration request.
    pub async fn submit(&self, input: RegistrationInput) -> AppResult<registration_request::Model> {
        input.validate()?;
        if input.username.trim().is_empty() || input.legal_form.trim().is_empty() {
            return Err(AppError::Validation(
                "username and legal_form must not be blank".to_string(),
            ));
        }

        let identity = Identity {
            nif: input.nif.as_deref(),
            email: input.email.as_deref(),
            username: Some(input.username.trim()),
        };
        if let Some(conflict) = self.checker.check(identity).await? {
            return Err(AppError::Conflict(conflict.to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let model = input.into_active_model(
            self.id_gen.generate(),
            self.id_gen.generate_token(),
            password_hash,
        );

        let request = self.request_repo.create(model).await?;
        info!(request_id = %request.id, username = %request.username, "Registration request submitted");

        Ok(request)
    }

    /// Get a request by ID.
    pub async fn get(&self, id: &str) -> AppResult<registration_request::Model> {
        self.request_repo.get_by_id(id).await
    }

    /// Requests awaiting review, oldest first.
    pub async fn list_pending(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<registration_request::Model>> {
        self.request_repo
            .find_pending(limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// All requests, newest first, with optional status filter.
    pub async fn list(
        &self,
        status: Option<RequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<registration_request::Model>> {
        self.request_repo
            .find_all(status, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }
}
