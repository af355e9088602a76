//! Database layer for clientdesk.

pub mod entities;
pub mod migrations;
pub mod repositories;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use clientdesk_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Map an error from an insert or update.
///
/// Unique-constraint violations become [`AppError::Conflict`] naming the
/// offending field; everything else is a database error.
#[must_use]
pub fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::Conflict(unique_violation_message(&detail).to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// Whether an error is a unique violation on the company NIPC.
#[must_use]
pub fn is_nipc_conflict(err: &AppError) -> bool {
    matches!(err, AppError::Conflict(msg) if msg == NIPC_CONFLICT)
}

/// Conflict message for a duplicate company NIPC.
pub const NIPC_CONFLICT: &str = "a company with this NIPC already exists";

// Postgres reports the index name, SQLite reports `table.column`.
fn unique_violation_message(detail: &str) -> &'static str {
    let detail = detail.to_lowercase();
    if detail.contains("nipc") {
        NIPC_CONFLICT
    } else if detail.contains("nif") {
        "this NIF is already in use"
    } else if detail.contains("email") {
        "this email is already in use"
    } else if detail.contains("username") {
        "this username is already in use"
    } else if detail.contains("user_id") {
        "this user already has a company"
    } else if detail.contains("approval_token") {
        "approval token collision, retry the submission"
    } else {
        "duplicate value violates a unique constraint"
    }
}
