use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::storage::db_entities;

/// A stored user as handed out to callers.
///
/// Always an owned copy; mutating it never touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl From<db_entities::Model> for User {
    fn from(model: db_entities::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}
