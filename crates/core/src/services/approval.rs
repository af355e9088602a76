//! Approval engine for registration requests.

use std::sync::Arc;

use chrono::Utc;
use clientdesk_common::{AppError, AppResult, IdGenerator};
use clientdesk_db::entities::{
    RegistrationRequest,
    registration_request::{self, RequestStatus},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::materialize::materialize;

/// Reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[serde(alias = "approve")]
    Approved,
    #[serde(alias = "reject")]
    Rejected,
}

/// Decides pending registration requests.
#[derive(Clone)]
pub struct ApprovalService {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl ApprovalService {
    /// Create a new approval service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Approve a pending request, creating its user and company.
    pub async fn approve(
        &self,
        request_id: &str,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<registration_request::Model> {
        self.decide(request_id, Decision::Approved, reviewer_id, notes)
            .await
    }

    /// Reject a pending request.
    pub async fn reject(
        &self,
        request_id: &str,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<registration_request::Model> {
        self.decide(request_id, Decision::Rejected, reviewer_id, notes)
            .await
    }

    /// Record a decision on a pending request.
    ///
    /// The request is re-read inside the transaction, so of two concurrent
    /// deciders exactly one sees `pending`; the other gets
    /// [`AppError::AlreadyProcessed`]. Nothing is written unless the whole
    /// decision succeeds.
    pub async fn decide(
        &self,
        request_id: &str,
        decision: Decision,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<registration_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match self
            .decide_in(&txn, request_id, decision, reviewer_id, notes)
            .await
        {
            Ok(request) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                info!(
                    request_id = %request.id,
                    reviewer_id,
                    ?decision,
                    user_id = ?request.user_id,
                    company_id = ?request.company_id,
                    "Registration request decided"
                );
                Ok(request)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(request_id, error = %rollback_err, "Rollback failed");
                }
                warn!(request_id, reviewer_id, ?decision, error = %err, "Decision aborted");
                Err(err)
            }
        }
    }

    async fn decide_in(
        &self,
        txn: &DatabaseTransaction,
        request_id: &str,
        decision: Decision,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<registration_request::Model> {
        let mut query = RegistrationRequest::find_by_id(request_id);
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }

        let request = query
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::RequestNotFound(request_id.to_string()))?;

        if request.status.is_terminal() {
            return Err(AppError::AlreadyProcessed(format!(
                "request {request_id} has already been reviewed"
            )));
        }

        let now = Utc::now();
        let mut model: registration_request::ActiveModel = request.clone().into();
        model.reviewed_at = Set(Some(now.into()));
        model.reviewed_by = Set(Some(reviewer_id.to_string()));
        model.review_notes = Set(notes.map(String::from));
        model.updated_at = Set(Some(now.into()));

        match decision {
            Decision::Rejected => {
                model.status = Set(RequestStatus::Rejected);
            }
            Decision::Approved => {
                let created = materialize(txn, &request, &self.id_gen)
                    .await
                    .map_err(|e| match e {
                        AppError::Conflict(_) => e,
                        other => AppError::Materialization(other.to_string()),
                    })?;

                model.status = Set(RequestStatus::Approved);
                model.user_id = Set(Some(created.user.id));
                model.company_id = Set(Some(created.company.id));
            }
        }

        model
            .update(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_accepts_both_spellings() {
        let approved: Decision = serde_json::from_str("\"approved\"").unwrap();
        let approve: Decision = serde_json::from_str("\"approve\"").unwrap();
        let rejected: Decision = serde_json::from_str("\"rejected\"").unwrap();

        assert_eq!(approved, Decision::Approved);
        assert_eq!(approve, Decision::Approved);
        assert_eq!(rejected, Decision::Rejected);
        assert!(serde_json::from_str::<Decision>("\"pending\"").is_err());
    }
}
