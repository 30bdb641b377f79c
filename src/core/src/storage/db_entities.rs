//! SeaORM entity model used by the database storage backend.
//!
//! Maps the `users` table created by `database_storage`. `id` and
//! `created_at` are filled in by SQLite on insert.

use sea_orm::entity::prelude::*;

/// Users table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Auto-increment surrogate key
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Unique across all rows
    #[sea_orm(unique)]
    pub email: String,
    /// `CURRENT_TIMESTAMP` at insertion, UTC, second granularity
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
