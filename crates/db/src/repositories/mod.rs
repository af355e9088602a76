//! Database repositories.

pub mod company;
pub mod registration_request;
pub mod user;

pub use company::CompanyRepository;
pub use registration_request::RegistrationRequestRepository;
pub use user::UserRepository;
