//! Database entities.

pub mod company;
pub mod registration_request;
pub mod user;

pub use company::Entity as Company;
pub use registration_request::Entity as RegistrationRequest;
pub use user::Entity as User;
