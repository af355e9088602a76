//! Registration request entity.
//!
//! A request stages every personal and company field a prospective client
//! submits. Nothing outside this row exists until a reviewer approves it;
//! approval materializes a [`super::user`] and a [`super::company`] and
//! links them back through `user_id` and `company_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a registration request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl RequestStatus {
    /// Approved and rejected requests never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Kind of onboarding a request represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[sea_orm(string_value = "new_client")]
    #[default]
    NewClient,
    #[sea_orm(string_value = "existing_client")]
    ExistingClient,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub approval_token: String,

    pub request_type: RequestType,

    pub status: RequestStatus,

    pub submitted_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    /// Staff user who decided the request
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub review_notes: Option<String>,

    // === Personal data ===
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(nullable)]
    pub name: Option<String>,
    #[sea_orm(nullable)]
    pub email: Option<String>,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    #[sea_orm(nullable)]
    pub nif: Option<String>,
    #[sea_orm(nullable)]
    pub date_of_birth: Option<Date>,
    #[sea_orm(nullable)]
    pub marital_status: Option<String>,
    #[sea_orm(nullable)]
    pub citizen_card_number: Option<String>,
    #[sea_orm(nullable)]
    pub citizen_card_expiry: Option<Date>,
    #[sea_orm(nullable)]
    pub tax_residence_country: Option<String>,
    #[sea_orm(nullable)]
    pub fixed_phone: Option<String>,
    #[sea_orm(nullable)]
    pub fiscal_address: Option<String>,
    #[sea_orm(nullable)]
    pub fiscal_postal_code: Option<String>,
    #[sea_orm(nullable)]
    pub fiscal_city: Option<String>,
    #[sea_orm(nullable)]
    pub fiscal_county: Option<String>,
    #[sea_orm(nullable)]
    pub fiscal_district: Option<String>,

    /// Contact address as entered on the form
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub postal_code: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub official_email: Option<String>,
    #[sea_orm(nullable)]
    pub billing_software: Option<String>,
    #[sea_orm(nullable)]
    pub preferred_format: Option<String>,
    #[sea_orm(nullable)]
    pub report_frequency: Option<String>,
    #[sea_orm(nullable)]
    pub preferred_contact_hours: Option<String>,

    // === Company data ===
    pub legal_form: String,

    #[sea_orm(nullable)]
    pub company_name: Option<String>,
    #[sea_orm(nullable)]
    pub nipc: Option<String>,
    #[sea_orm(nullable)]
    pub cae: Option<String>,
    #[sea_orm(nullable)]
    pub founding_date: Option<Date>,
    #[sea_orm(nullable)]
    pub accounting_regime: Option<String>,
    #[sea_orm(nullable)]
    pub vat_regime: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub business_activity: Option<String>,
    #[sea_orm(nullable)]
    pub estimated_revenue: Option<f64>,
    #[sea_orm(nullable)]
    pub monthly_invoices: Option<i32>,
    #[sea_orm(nullable)]
    pub number_employees: Option<i32>,
    #[sea_orm(nullable)]
    pub trade_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub corporate_object: Option<String>,
    #[sea_orm(nullable)]
    pub company_address: Option<String>,
    #[sea_orm(nullable)]
    pub company_postal_code: Option<String>,
    #[sea_orm(nullable)]
    pub company_city: Option<String>,
    #[sea_orm(nullable)]
    pub company_county: Option<String>,
    #[sea_orm(nullable)]
    pub company_district: Option<String>,
    #[sea_orm(nullable)]
    pub company_country: Option<String>,
    #[sea_orm(nullable)]
    pub share_capital: Option<f64>,
    #[sea_orm(nullable)]
    pub group_start_date: Option<Date>,
    #[sea_orm(nullable)]
    pub bank_name: Option<String>,
    #[sea_orm(nullable)]
    pub iban: Option<String>,
    #[sea_orm(nullable)]
    pub bic: Option<String>,
    #[sea_orm(nullable)]
    pub annual_revenue: Option<f64>,
    #[sea_orm(nullable)]
    pub has_stock: Option<bool>,
    #[sea_orm(column_type = "Text", nullable)]
    pub main_clients: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub main_suppliers: Option<String>,

    // === Linkage, set once on approval ===
    #[sea_orm(nullable)]
    pub user_id: Option<String>,
    #[sea_orm(nullable)]
    pub company_id: Option<String>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Approved requests carry both links; pending and rejected carry neither.
    #[must_use]
    pub const fn linkage_consistent(&self) -> bool {
        let linked = self.user_id.is_some() && self.company_id.is_some();
        let unlinked = self.user_id.is_none() && self.company_id.is_none();
        match self.status {
            RequestStatus::Approved => linked,
            RequestStatus::Pending | RequestStatus::Rejected => unlinked,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }
}
