//! Core business logic for clientdesk.
//!
//! Services for the onboarding workflow: submitting registration requests,
//! deciding them, materializing approved clients and managing accounts.

pub mod services;

pub use services::*;
