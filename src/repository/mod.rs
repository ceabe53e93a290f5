//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite with compile-time query
//! checking.

pub mod context;
pub mod credential;
pub mod models;
pub mod pool;
pub mod submission;
pub mod util;
pub mod website;

pub use context::DbContext;
pub use credential::CredentialRepository;
pub use pool::{AsyncSqlitePool, DieselError};
pub use submission::SubmissionRepository;
pub use website::WebsiteRepository;
