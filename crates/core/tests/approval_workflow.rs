//! End-to-end onboarding workflow tests.
//!
//! Each test runs against a fresh in-memory `SQLite` database with the real
//! migrations applied, so unique constraints and transactions are enforced
//! by the store. The `PostgreSQL` test is ignored by default; it needs the
//! database described in `clientdesk_db::test_utils::TestDbConfig`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use clientdesk_common::AppError;
use clientdesk_core::{
    AccountService, ApprovalService, Decision, DuplicateChecker, RegistrationInput,
    RegistrationService, UserPatch,
    auth::{AuthService, LoginInput, TokenIssuer},
};
use clientdesk_db::{
    entities::{
        Company, RegistrationRequest, User,
        registration_request::RequestStatus,
        user::{UserRole, UserStatus},
    },
    repositories::{RegistrationRequestRepository, UserRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

struct Harness {
    db: TestDatabase,
    registration: RegistrationService,
    approval: ApprovalService,
    accounts: AccountService,
    auth: AuthService,
}

impl Harness {
    async fn new() -> Self {
        Self::with_database(TestDatabase::in_memory().await.unwrap())
    }

    fn with_database(db: TestDatabase) -> Self {
        let conn: Arc<DatabaseConnection> = db.shared();

        let user_repo = UserRepository::new(conn.clone());
        let request_repo = RegistrationRequestRepository::new(conn.clone());
        let checker = DuplicateChecker::new(user_repo.clone(), request_repo.clone());

        Self {
            registration: RegistrationService::new(request_repo, checker),
            approval: ApprovalService::new(conn.clone()),
            accounts: AccountService::new(conn),
            auth: AuthService::new(
                user_repo,
                TokenIssuer::with_secret(b"workflow-secret", chrono::Duration::days(10)),
            ),
            db,
        }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.db.connection()
    }

    async fn user_count(&self) -> u64 {
        User::find().count(self.conn()).await.unwrap()
    }

    async fn company_count(&self) -> u64 {
        Company::find().count(self.conn()).await.unwrap()
    }
}

fn joao() -> RegistrationInput {
    RegistrationInput {
        username: "joao.silva".to_string(),
        password: "password123".to_string(),
        legal_form: "Sociedade por Quotas".to_string(),
        nif: Some("123456789".to_string()),
        email: Some("joao@example.com".to_string()),
        name: Some("João Silva".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_submission_stages_pending_request() {
    let h = Harness::new().await;

    let request = h.registration.submit(joao()).await.unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.approval_token.len(), 32);
    assert!(request.approval_token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(request.user_id.is_none());
    assert!(request.company_id.is_none());
    assert_ne!(request.password_hash, "password123");
    assert_eq!(h.user_count().await, 0);
    assert_eq!(h.company_count().await, 0);
}

#[tokio::test]
async fn test_approval_materializes_linked_client() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();

    let decided = h
        .approval
        .decide(&request.id, Decision::Approved, "staff1", Some("ok"))
        .await
        .unwrap();

    assert_eq!(decided.status, RequestStatus::Approved);
    assert_eq!(decided.reviewed_by.as_deref(), Some("staff1"));
    assert_eq!(decided.review_notes.as_deref(), Some("ok"));
    assert!(decided.reviewed_at.is_some());
    assert!(decided.linkage_consistent());

    let user = User::find_by_id(decided.user_id.clone().unwrap())
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "joao.silva");
    assert_eq!(user.role, UserRole::Client);
    assert_eq!(user.status, UserStatus::Approved);
    assert_eq!(user.password_hash, request.password_hash);
    assert_eq!(user.preferred_format.as_deref(), Some("digital"));
    assert_eq!(user.report_frequency.as_deref(), Some("mensal"));
    assert_eq!(user.tax_residence_country.as_deref(), Some("Portugal"));

    let company = Company::find_by_id(decided.company_id.clone().unwrap())
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(company.user_id, user.id);
    assert_eq!(company.legal_form, "Sociedade por Quotas");
    assert_eq!(company.country.as_deref(), Some("Portugal"));
}

#[tokio::test]
async fn test_second_decision_is_already_processed() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();
    h.approval.approve(&request.id, "staff1", None).await.unwrap();

    let again = h.approval.approve(&request.id, "staff2", None).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed(_))));

    let reject = h.approval.reject(&request.id, "staff2", None).await;
    assert!(matches!(reject, Err(AppError::AlreadyProcessed(_))));

    assert_eq!(h.user_count().await, 1);
    assert_eq!(h.company_count().await, 1);
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let h = Harness::new().await;

    let result = h.approval.approve("missing", "staff1", None).await;
    assert!(matches!(result, Err(AppError::RequestNotFound(_))));
}

#[tokio::test]
async fn test_duplicate_pending_nif_is_conflict() {
    let h = Harness::new().await;
    h.registration.submit(joao()).await.unwrap();

    let second = RegistrationInput {
        username: "maria.santos".to_string(),
        email: Some("maria@example.com".to_string()),
        ..joao()
    };
    let err = h.registration.submit(second).await.unwrap_err();

    match err {
        AppError::Conflict(msg) => {
            assert!(msg.contains("pending"));
            assert!(msg.contains("NIF"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_username_of_active_account_is_conflict() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();
    h.approval.approve(&request.id, "staff1", None).await.unwrap();

    let second = RegistrationInput {
        nif: Some("987654321".to_string()),
        email: Some("other@example.com".to_string()),
        ..joao()
    };
    let err = h.registration.submit(second).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(msg) if msg.contains("username")));
}

#[tokio::test]
async fn test_rejection_creates_nothing_and_allows_resubmission() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();

    let rejected = h
        .approval
        .reject(&request.id, "staff1", Some("documentos em falta"))
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert!(rejected.linkage_consistent());
    assert_eq!(h.user_count().await, 0);

    let resubmitted = h.registration.submit(joao()).await.unwrap();
    assert_eq!(resubmitted.status, RequestStatus::Pending);
    assert_ne!(resubmitted.id, request.id);
}

#[tokio::test]
async fn test_rejected_user_is_reused_on_reapproval() {
    let h = Harness::new().await;
    let first = h.registration.submit(joao()).await.unwrap();
    let first = h.approval.approve(&first.id, "staff1", None).await.unwrap();
    let user_id = first.user_id.clone().unwrap();

    h.accounts
        .update_user_status(&user_id, UserStatus::Rejected)
        .await
        .unwrap();

    let second = h.registration.submit(joao()).await.unwrap();
    let second = h.approval.approve(&second.id, "staff1", None).await.unwrap();

    assert_eq!(second.user_id.as_deref(), Some(user_id.as_str()));
    assert_eq!(second.company_id, first.company_id);
    assert_eq!(h.user_count().await, 1);
    assert_eq!(h.company_count().await, 1);

    let user = User::find_by_id(user_id).one(h.conn()).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Approved);
}

#[tokio::test]
async fn test_duplicate_nipc_blocks_approval_and_keeps_request_pending() {
    let h = Harness::new().await;
    let first = h
        .registration
        .submit(RegistrationInput {
            nipc: Some("509876543".to_string()),
            ..joao()
        })
        .await
        .unwrap();
    h.approval.approve(&first.id, "staff1", None).await.unwrap();

    let second = h
        .registration
        .submit(RegistrationInput {
            username: "maria.santos".to_string(),
            nif: Some("987654321".to_string()),
            email: Some("maria@example.com".to_string()),
            nipc: Some("509876543".to_string()),
            ..joao()
        })
        .await
        .unwrap();

    let err = h.approval.approve(&second.id, "staff1", None).await.unwrap_err();
    assert!(clientdesk_db::is_nipc_conflict(&err));

    let still = RegistrationRequest::find_by_id(second.id)
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, RequestStatus::Pending);
    assert!(still.linkage_consistent());
    assert_eq!(h.user_count().await, 1);
}

#[tokio::test]
async fn test_failed_company_insert_rolls_back_user() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();
    h.db.fail_company_inserts().await.unwrap();

    let err = h.approval.approve(&request.id, "staff1", None).await.unwrap_err();
    assert!(matches!(err, AppError::Materialization(_)));

    assert_eq!(h.user_count().await, 0);
    assert_eq!(h.company_count().await, 0);

    let still = RegistrationRequest::find_by_id(request.id)
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, RequestStatus::Pending);
    assert!(still.reviewed_at.is_none());
    assert!(still.reviewed_by.is_none());
}

#[tokio::test]
async fn test_concurrent_approvals_create_one_client() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();

    let (a, b) = tokio::join!(
        h.approval.approve(&request.id, "staff1", None),
        h.approval.approve(&request.id, "staff2", None),
    );

    let outcomes = [a, b];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::AlreadyProcessed(_))))
    );
    assert_eq!(h.user_count().await, 1);
    assert_eq!(h.company_count().await, 1);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_approvals_on_postgres_lock_request_row() {
    let db = TestDatabase::postgres(&TestDbConfig::default())
        .await
        .unwrap();
    db.cleanup().await.unwrap();
    let h = Harness::with_database(db);
    let request = h.registration.submit(joao()).await.unwrap();

    // Separate pooled connections, so both transactions are open at once
    // and the row lock decides the winner.
    let (a, b) = tokio::join!(
        h.approval.approve(&request.id, "staff1", None),
        h.approval.approve(&request.id, "staff2", None),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::AlreadyProcessed(_))))
    );
    assert_eq!(h.user_count().await, 1);
    assert_eq!(h.company_count().await, 1);

    let stored = RegistrationRequest::find_by_id(request.id.as_str())
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.linkage_consistent());

    h.db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_gate_follows_user_status() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();

    let login = || LoginInput {
        username: "joao.silva".to_string(),
        password: "password123".to_string(),
    };

    // Nothing to log into before approval.
    assert!(matches!(
        h.auth.login(login()).await,
        Err(AppError::Unauthorized)
    ));

    let request = h.approval.approve(&request.id, "staff1", None).await.unwrap();
    let output = h.auth.login(login()).await.unwrap();
    let user = h.auth.authenticate(&output.token).await.unwrap();
    assert_eq!(user.username, "joao.silva");

    let user_id = request.user_id.unwrap();
    h.accounts
        .update_user_status(&user_id, UserStatus::Blocked)
        .await
        .unwrap();
    assert!(matches!(
        h.auth.login(login()).await,
        Err(AppError::AccountBlocked)
    ));
    assert!(matches!(
        h.auth.authenticate(&output.token).await,
        Err(AppError::AccountBlocked)
    ));
}

#[tokio::test]
async fn test_delete_client_keeps_request_history() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();
    let request = h.approval.approve(&request.id, "staff1", None).await.unwrap();
    let user_id = request.user_id.clone().unwrap();

    h.accounts.delete_client(&user_id).await.unwrap();

    assert_eq!(h.user_count().await, 0);
    assert_eq!(h.company_count().await, 0);
    let kept = RegistrationRequest::find_by_id(request.id)
        .one(h.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.user_id.as_deref(), Some(user_id.as_str()));

    let again = h.accounts.delete_client(&user_id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_staff_patch_and_history() {
    let h = Harness::new().await;
    let request = h.registration.submit(joao()).await.unwrap();
    let request = h
        .approval
        .approve(&request.id, "staff1", Some("bem-vindo"))
        .await
        .unwrap();
    let user_id = request.user_id.clone().unwrap();

    let updated = h
        .accounts
        .update_client(
            &user_id,
            UserPatch {
                phone: Some("912345678".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("912345678"));
    assert_eq!(updated.name.as_deref(), Some("João Silva"));

    let history = h.accounts.request_history(&user_id).await.unwrap();
    assert_eq!(history.user_status, UserStatus::Approved);
    let summary = history.request.unwrap();
    assert_eq!(summary.id, request.id);
    assert_eq!(summary.review_notes.as_deref(), Some("bem-vindo"));

    let clients = h.accounts.list_approved_clients(50, 0).await.unwrap();
    assert_eq!(clients.len(), 1);
    assert!(clients[0].company.is_some());
}

#[tokio::test]
async fn test_staff_accounts_are_seeded_once() {
    let h = Harness::new().await;

    let created = h
        .accounts
        .ensure_staff_account("admin", "admin-password", None, UserRole::Admin)
        .await
        .unwrap();
    let again = h
        .accounts
        .ensure_staff_account("admin", "admin-password", None, UserRole::Admin)
        .await
        .unwrap();

    assert!(created);
    assert!(!again);
    assert_eq!(h.user_count().await, 1);

    let output = h
        .auth
        .login(LoginInput {
            username: "admin".to_string(),
            password: "admin-password".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(output.user.role, UserRole::Admin);
}
