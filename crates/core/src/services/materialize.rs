//! Materialization of an approved request into a user and a company.
//!
//! Runs on the caller's connection so that the approval transaction covers
//! both inserts together with the request update; an error anywhere leaves
//! nothing behind once the caller rolls back.

use chrono::Utc;
use clientdesk_common::{AppError, AppResult, IdGenerator};
use clientdesk_db::{
    NIPC_CONFLICT,
    entities::{
        Company, User, company, registration_request,
        user::{self, UserRole, UserStatus},
    },
    map_write_err,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    Value,
};
use tracing::{debug, info};

pub const DEFAULT_COUNTRY: &str = "Portugal";
pub const DEFAULT_PREFERRED_FORMAT: &str = "digital";
pub const DEFAULT_REPORT_FREQUENCY: &str = "mensal";

/// Rows produced by a successful materialization.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub user: user::Model,
    pub company: company::Model,
    /// A previously rejected user was reactivated instead of inserted.
    pub reused_user: bool,
}

/// Create (or reactivate) the user and company described by a request.
pub async fn materialize<C>(
    conn: &C,
    request: &registration_request::Model,
    id_gen: &IdGenerator,
) -> AppResult<Materialized>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let reusable = find_rejected_user(conn, request.nif.as_deref()).await?;
    let reused_user = reusable.is_some();

    if let Some(nipc) = non_blank(request.nipc.as_deref()) {
        let holder = Company::find()
            .filter(company::Column::Nipc.eq(nipc))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let owned_by_reused = matches!(
            (&holder, &reusable),
            (Some(c), Some(u)) if c.user_id == u.id
        );
        if holder.is_some() && !owned_by_reused {
            return Err(AppError::Conflict(NIPC_CONFLICT.to_string()));
        }
    }

    let user = match reusable {
        Some(existing) => {
            let mut active: user::ActiveModel = existing.into();
            apply_user_snapshot(&mut active, request);
            active.updated_at = Set(Some(now.into()));
            active.update(conn).await.map_err(map_write_err)?
        }
        None => {
            let mut active = user::ActiveModel {
                id: Set(id_gen.generate()),
                created_at: Set(now.into()),
                updated_at: Set(None),
                ..Default::default()
            };
            apply_user_snapshot(&mut active, request);
            active.insert(conn).await.map_err(map_write_err)?
        }
    };
    debug!(user_id = %user.id, reused_user, "Materialized user");

    let existing_company = if reused_user {
        Company::find()
            .filter(company::Column::UserId.eq(user.id.as_str()))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
    } else {
        None
    };

    let company = match existing_company {
        Some(existing) => {
            let mut active: company::ActiveModel = existing.into();
            apply_company_snapshot(&mut active, request);
            active.updated_at = Set(Some(now.into()));
            active.update(conn).await.map_err(map_write_err)?
        }
        None => {
            let mut active = company::ActiveModel {
                id: Set(id_gen.generate()),
                user_id: Set(user.id.clone()),
                created_at: Set(now.into()),
                updated_at: Set(None),
                ..Default::default()
            };
            apply_company_snapshot(&mut active, request);
            active.insert(conn).await.map_err(map_write_err)?
        }
    };

    info!(
        request_id = %request.id,
        user_id = %user.id,
        company_id = %company.id,
        reused_user,
        "Materialized registration request"
    );

    Ok(Materialized {
        user,
        company,
        reused_user,
    })
}

async fn find_rejected_user<C>(conn: &C, nif: Option<&str>) -> AppResult<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let Some(nif) = non_blank(nif) else {
        return Ok(None);
    };
    let found = User::find()
        .filter(user::Column::Nif.eq(nif))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(found.filter(|u| u.status == UserStatus::Rejected))
}

fn apply_user_snapshot(active: &mut user::ActiveModel, r: &registration_request::Model) {
    active.username = Set(r.username.clone());
    active.password_hash = Set(r.password_hash.clone());
    active.role = Set(UserRole::Client);
    active.status = Set(UserStatus::Approved);

    overlay(&mut active.email, r.email.as_ref());
    overlay(&mut active.name, r.name.as_ref());
    overlay(&mut active.phone, r.phone.as_ref());
    overlay(&mut active.nif, r.nif.as_ref());
    overlay(&mut active.date_of_birth, r.date_of_birth.as_ref());
    overlay(&mut active.marital_status, r.marital_status.as_ref());
    overlay(&mut active.citizen_card_number, r.citizen_card_number.as_ref());
    overlay(&mut active.citizen_card_expiry, r.citizen_card_expiry.as_ref());
    overlay(&mut active.tax_residence_country, r.tax_residence_country.as_ref());
    overlay(&mut active.fixed_phone, r.fixed_phone.as_ref());
    overlay(&mut active.fiscal_address, r.fiscal_address.as_ref());
    overlay(&mut active.fiscal_postal_code, r.fiscal_postal_code.as_ref());
    overlay(&mut active.fiscal_city, r.fiscal_city.as_ref());
    overlay(&mut active.fiscal_county, r.fiscal_county.as_ref());
    overlay(&mut active.fiscal_district, r.fiscal_district.as_ref());
    overlay(&mut active.official_email, r.official_email.as_ref());
    overlay(&mut active.billing_software, r.billing_software.as_ref());
    overlay(&mut active.preferred_format, r.preferred_format.as_ref());
    overlay(&mut active.report_frequency, r.report_frequency.as_ref());
    overlay(&mut active.preferred_contact_hours, r.preferred_contact_hours.as_ref());

    default_if_empty(&mut active.tax_residence_country, DEFAULT_COUNTRY);
    default_if_empty(&mut active.preferred_format, DEFAULT_PREFERRED_FORMAT);
    default_if_empty(&mut active.report_frequency, DEFAULT_REPORT_FREQUENCY);
}

fn apply_company_snapshot(active: &mut company::ActiveModel, r: &registration_request::Model) {
    active.legal_form = Set(r.legal_form.clone());

    overlay(&mut active.company_name, r.company_name.as_ref());
    overlay(&mut active.nipc, r.nipc.as_ref());
    overlay(&mut active.cae, r.cae.as_ref());
    overlay(&mut active.founding_date, r.founding_date.as_ref());
    overlay(&mut active.accounting_regime, r.accounting_regime.as_ref());
    overlay(&mut active.vat_regime, r.vat_regime.as_ref());
    overlay(&mut active.business_activity, r.business_activity.as_ref());
    overlay(&mut active.estimated_revenue, r.estimated_revenue.as_ref());
    overlay(&mut active.monthly_invoices, r.monthly_invoices.as_ref());
    overlay(&mut active.number_employees, r.number_employees.as_ref());
    overlay(&mut active.trade_name, r.trade_name.as_ref());
    overlay(&mut active.corporate_object, r.corporate_object.as_ref());
    // The form's plain address block is the company address when the
    // dedicated company_* fields are left empty.
    overlay(&mut active.address, r.company_address.as_ref().or(r.address.as_ref()));
    overlay(
        &mut active.postal_code,
        r.company_postal_code.as_ref().or(r.postal_code.as_ref()),
    );
    overlay(&mut active.city, r.company_city.as_ref().or(r.city.as_ref()));
    overlay(&mut active.county, r.company_county.as_ref());
    overlay(&mut active.district, r.company_district.as_ref());
    overlay(&mut active.country, r.company_country.as_ref().or(r.country.as_ref()));
    overlay(&mut active.share_capital, r.share_capital.as_ref());
    overlay(&mut active.group_start_date, r.group_start_date.as_ref());
    overlay(&mut active.bank_name, r.bank_name.as_ref());
    overlay(&mut active.iban, r.iban.as_ref());
    overlay(&mut active.bic, r.bic.as_ref());
    overlay(&mut active.annual_revenue, r.annual_revenue.as_ref());
    overlay(&mut active.has_stock, r.has_stock.as_ref());
    overlay(&mut active.main_clients, r.main_clients.as_ref());
    overlay(&mut active.main_suppliers, r.main_suppliers.as_ref());

    default_if_empty(&mut active.country, DEFAULT_COUNTRY);
}

/// Set a nullable column only when the snapshot carries a value.
pub(crate) fn overlay<T>(target: &mut ActiveValue<Option<T>>, value: Option<&T>)
where
    T: Clone,
    Option<T>: Into<Value>,
{
    if let Some(v) = value {
        *target = Set(Some(v.clone()));
    }
}

fn default_if_empty(target: &mut ActiveValue<Option<String>>, default: &str) {
    let has_value = matches!(
        target,
        ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))
    );
    if !has_value {
        *target = Set(Some(default.to_string()));
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
