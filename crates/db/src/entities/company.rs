//! Company entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A client's company, owned one-to-one by a user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner (one company per user)
    #[sea_orm(unique)]
    pub user_id: String,

    #[sea_orm(nullable)]
    pub company_name: Option<String>,

    /// Corporate tax number
    #[sea_orm(unique, nullable)]
    pub nipc: Option<String>,

    pub legal_form: String,

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

    // Registered address
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub postal_code: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(nullable)]
    pub county: Option<String>,
    #[sea_orm(nullable)]
    pub district: Option<String>,
    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub share_capital: Option<f64>,
    #[sea_orm(nullable)]
    pub group_start_date: Option<Date>,

    // Banking
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

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
