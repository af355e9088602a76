//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access role of a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "client")]
    #[default]
    Client,
    #[sea_orm(string_value = "accountant")]
    Accountant,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Whether this role may review registration requests and manage clients.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Accountant | Self::Admin)
    }
}

/// Login eligibility of a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    #[default]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique, nullable)]
    pub email: Option<String>,

    /// Argon2 hash, never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(nullable)]
    pub name: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Individual tax number
    #[sea_orm(unique, nullable)]
    pub nif: Option<String>,

    pub role: UserRole,

    pub status: UserStatus,

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

    // Fiscal address
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

    #[sea_orm(nullable)]
    pub official_email: Option<String>,

    #[sea_orm(nullable)]
    pub billing_software: Option<String>,

    // Communication preferences
    #[sea_orm(nullable)]
    pub preferred_format: Option<String>,
    #[sea_orm(nullable)]
    pub report_frequency: Option<String>,
    #[sea_orm(nullable)]
    pub preferred_contact_hours: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::company::Entity")]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
