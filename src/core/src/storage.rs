//! Storage subsystem
//!
//! This module owns the persistent user store: a single SQLite file holding
//! one `users` table, opened once at startup and shared for the process
//! lifetime.
//!
//! Components:
//! - `storage_trait`: the `UserStorage` trait consumed by the web interface.
//! - `types`: the `User` record handed out to callers.
//! - `database_storage`: SeaORM-based SQLite implementation.
//! - `sample_data`: the fixed users inserted into an empty store.
//! - `db_entities`: SeaORM entity model for the `users` table.

pub mod database_storage;
pub mod db_entities;
pub mod sample_data;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::UserStorage;
pub use types::User;
