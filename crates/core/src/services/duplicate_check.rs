//! Duplicate detection for registration submissions.

use std::fmt;

use clientdesk_common::AppResult;
use clientdesk_db::{
    entities::user::UserStatus,
    repositories::{RegistrationRequestRepository, UserRepository},
};
use tracing::warn;

/// Identity field that collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Nif,
    Email,
    Username,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nif => "NIF",
            Self::Email => "email",
            Self::Username => "username",
        })
    }
}

/// Why a submission cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Another request awaiting review uses the same identity.
    DuplicatePendingRequest { field: DuplicateField },
    /// An account with the same identity already exists.
    DuplicateAccount {
        field: DuplicateField,
        status: UserStatus,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DuplicatePendingRequest { field } => write!(
                f,
                "a pending registration request already uses this {field}, wait for its review"
            ),
            Self::DuplicateAccount { field, status } => match status {
                UserStatus::Approved => write!(
                    f,
                    "this {field} is already in use by an active account, please log in"
                ),
                UserStatus::Pending => write!(
                    f,
                    "an account with this {field} is pending approval, please wait"
                ),
                UserStatus::Rejected => write!(
                    f,
                    "an account with this {field} was rejected, contact support"
                ),
                UserStatus::Blocked => write!(
                    f,
                    "the account with this {field} is blocked, contact support"
                ),
            },
        }
    }
}

/// Candidate identity of a submission. Blank values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity<'a> {
    pub nif: Option<&'a str>,
    pub email: Option<&'a str>,
    pub username: Option<&'a str>,
}

impl<'a> Identity<'a> {
    fn fields(&self) -> [(DuplicateField, Option<&'a str>); 3] {
        let present = |v: Option<&'a str>| v.map(str::trim).filter(|s| !s.is_empty());
        [
            (DuplicateField::Nif, present(self.nif)),
            (DuplicateField::Email, present(self.email)),
            (DuplicateField::Username, present(self.username)),
        ]
    }
}

/// Checks candidate identities against pending requests and existing users.
#[derive(Clone)]
pub struct DuplicateChecker {
    user_repo: UserRepository,
    request_repo: RegistrationRequestRepository,
}

impl DuplicateChecker {
    /// Create a new duplicate checker.
    #[must_use]
    pub const fn new(user_repo: UserRepository, request_repo: RegistrationRequestRepository) -> Self {
        Self {
            user_repo,
            request_repo,
        }
    }

    /// Find the first conflict for a submission, if any.
    ///
    /// Pending requests are checked before users, and within each NIF
    /// before email before username. A user rejected under the same NIF does
    /// not block resubmission; that user row is reused on approval.
    pub async fn check(&self, identity: Identity<'_>) -> AppResult<Option<ConflictKind>> {
        let fields = identity.fields();

        for (field, value) in fields {
            let Some(value) = value else { continue };
            let pending = match field {
                DuplicateField::Nif => self.request_repo.find_pending_by_nif(value).await?,
                DuplicateField::Email => self.request_repo.find_pending_by_email(value).await?,
                DuplicateField::Username => {
                    self.request_repo.find_pending_by_username(value).await?
                }
            };
            if let Some(request) = pending {
                warn!(request_id = %request.id, %field, "Submission collides with a pending request");
                return Ok(Some(ConflictKind::DuplicatePendingRequest { field }));
            }
        }

        let mut reusable: Option<String> = None;
        for (field, value) in fields {
            let Some(value) = value else { continue };
            let existing = match field {
                DuplicateField::Nif => self.user_repo.find_by_nif(value).await?,
                DuplicateField::Email => self.user_repo.find_by_email(value).await?,
                DuplicateField::Username => self.user_repo.find_by_username(value).await?,
            };
            let Some(existing) = existing else { continue };

            if field == DuplicateField::Nif && existing.status == UserStatus::Rejected {
                reusable = Some(existing.id);
                continue;
            }
            if reusable.as_deref() == Some(existing.id.as_str()) {
                continue;
            }

            warn!(user_id = %existing.id, %field, status = ?existing.status, "Submission collides with an existing account");
            return Ok(Some(ConflictKind::DuplicateAccount {
                field,
                status: existing.status,
            }));
        }

        Ok(None)
    }
}
