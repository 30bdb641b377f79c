//! Deterministic users inserted into a fresh store.

use log::info;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};

use crate::storage::db_entities::{ActiveModel, Column, Entity};

/// `(name, email)` pairs, in insertion order.
pub const SAMPLE_USERS: [(&str, &str); 5] = [
    ("Alice Johnson", "alice@example.com"),
    ("Bob Smith", "bob@example.com"),
    ("Charlie Brown", "charlie@example.com"),
    ("Diana Prince", "diana@example.com"),
    ("Eve Wilson", "eve@example.com"),
];

/// Inserts `SAMPLE_USERS` when the table is empty and returns how many rows
/// were written.
///
/// A non-empty table is left untouched. Each row is inserted with
/// `ON CONFLICT(email) DO NOTHING`, so an email left over from a partial
/// earlier run is skipped rather than failing the whole seed.
pub async fn seed(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let existing = Entity::find().count(db).await?;
    if existing > 0 {
        info!("Sample data already exists ({} users)", existing);
        return Ok(0);
    }

    let mut inserted = 0;
    for (name, email) in SAMPLE_USERS {
        let row = ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            ..Default::default()
        };
        inserted += Entity::insert(row)
            .on_conflict(OnConflict::column(Column::Email).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    info!("Database initialized with sample data ({} users)", inserted);
    Ok(inserted)
}
