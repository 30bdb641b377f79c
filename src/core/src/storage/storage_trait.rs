//! Storage Trait
//!
//! This module defines the `UserStorage` trait, the boundary between the web
//! interface and whatever backend persists users.
//!
//! Implementors are responsible for:
//! - Listing every user, newest first
//! - Looking a user up by id
//! - Creating users while enforcing email uniqueness
//!
//! Each method runs a single statement against the store. Nothing is retried;
//! failures are returned to the caller as they happen.

use async_trait::async_trait;

use crate::error_handling::types::StorageError;
use crate::storage::types::User;

/// The `UserStorage` trait defines the interface for user storage backends.
///
/// There are no update or delete operations: once created, a user is
/// immutable.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Returns every user ordered by `created_at` descending, ties broken by
    /// `id` descending. An empty store yields an empty vector.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Looks a user up by id. `Ok(None)` when no row matches.
    async fn get_user(&self, id: i32) -> Result<Option<User>, StorageError>;

    /// Inserts a user and returns the stored row, re-read by id.
    ///
    /// Fails with `StorageError::ConstraintViolation` when `email` is already
    /// taken. Input is stored as given; emptiness checks belong to the caller.
    async fn create_user(&self, name: &str, email: &str) -> Result<User, StorageError>;
}
