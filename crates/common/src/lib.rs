//! Common utilities and shared types for clientdesk.
//!
//! This crate provides foundational components used across all clientdesk crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID identifiers and approval tokens via [`IdGenerator`]
//! - **Flexible input**: Lenient serde helpers for form payloads in [`flexible`]
//!
//! # Example
//!
//! ```no_run
//! use clientdesk_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod flexible;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
