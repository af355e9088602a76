//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod approval;
pub mod auth;
pub mod duplicate_check;
pub mod materialize;
pub mod registration;

pub use account::{
    AccountService, CompanyPatch, CompanyUpdate, CompleteCompanyData, CompleteUserData,
    CreateUserInput, Profile, ProfileUpdate, RequestHistory, RequestSummary, UserPatch,
};
pub use approval::{ApprovalService, Decision};
pub use auth::{AuthService, Claims, LoginInput, LoginOutput, TokenIssuer};
pub use duplicate_check::{ConflictKind, DuplicateChecker, DuplicateField, Identity};
pub use materialize::{Materialized, materialize};
pub use registration::{RegistrationInput, RegistrationService};
