use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error, info};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryOrder, SqlErr, SqlxSqliteConnector,
};

use crate::error_handling::types::StorageError;
use crate::storage::db_entities::{ActiveModel, Column, Entity};
use crate::storage::sample_data;
use crate::storage::storage_trait::UserStorage;
use crate::storage::types::User;

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

/// SQLite-backed user store.
///
/// Holds the one store handle of the process. The handle is never closed
/// explicitly; it lives as long as the `DatabaseStorage` does.
pub struct DatabaseStorage {
    db: DatabaseConnection,
    path: PathBuf,
}

impl DatabaseStorage {
    /// Default database file, relative to the working directory
    pub const DEFAULT_DB_FILE: &'static str = "data/app.db";

    /// Opens (or creates) the database at `path`, ensures the schema exists
    /// and seeds the sample users into an empty table.
    ///
    /// Safe to call repeatedly on the same file: the schema statement is
    /// create-if-absent and seeding skips a populated table.
    pub async fn initialize<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let storage = Self::open(path).await?;
        sample_data::seed(&storage.db).await.map_err(|e| {
            error!("Error inserting sample data: {}", e);
            StorageError::InitializationFailed(e.to_string())
        })?;
        Ok(storage)
    }

    /// Directory, connection and schema, without seeding.
    async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create data dir {}: {}", parent.display(), e);
                StorageError::InitializationFailed(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        // The path goes in as a filename, never through a URL, so `%` and `?`
        // stay literal.
        let opts = SqliteConnectOptions::new()
            .filename(path_ref)
            .create_if_missing(true);
        // one handle for the whole process
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| {
                error!("Error opening database {}: {}", path_ref.display(), e);
                StorageError::InitializationFailed(e.to_string())
            })?;
        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        info!("Database connected at {}", path_ref.display());

        db.execute_unprepared(CREATE_USERS_TABLE)
            .await
            .map_err(|e| {
                error!("Error creating table: {}", e);
                StorageError::InitializationFailed(e.to_string())
            })?;

        Ok(Self {
            db,
            path: path_ref.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn count_users(&self) -> Result<u64, StorageError> {
        Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))
    }
}

fn map_write_error(err: DbErr) -> StorageError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => StorageError::ConstraintViolation(msg),
        _ => StorageError::WriteFailed(err.to_string()),
    }
}

#[async_trait]
impl UserStorage for DatabaseStorage {
    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, StorageError> {
        let row = Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, name: &str, email: &str) -> Result<User, StorageError> {
        let row = ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            ..Default::default()
        };
        let result = Entity::insert(row)
            .exec(&self.db)
            .await
            .map_err(map_write_error)?;
        debug!("Inserted user row {}", result.last_insert_id);

        self.get_user(result.last_insert_id).await?.ok_or_else(|| {
            StorageError::ReadFailed(format!(
                "user {} missing after insert",
                result.last_insert_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sample_data::SAMPLE_USERS;
    use tempfile::TempDir;

    fn temp_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data").join("test.db")
    }

    #[tokio::test]
    async fn test_initialize_creates_directory_and_seeds() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        assert!(!path.parent().unwrap().exists());

        let storage = DatabaseStorage::initialize(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());

        let users = storage.list_users().await.unwrap();
        assert_eq!(users.len(), 5);
        let mut names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "Alice Johnson",
                "Bob Smith",
                "Charlie Brown",
                "Diana Prince",
                "Eve Wilson"
            ]
        );
        for (name, email) in SAMPLE_USERS {
            let user = users.iter().find(|u| u.name == name).unwrap();
            assert_eq!(user.email, email);
        }
    }

    #[tokio::test]
    async fn test_initialize_twice_does_not_duplicate() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);

        let first = DatabaseStorage::initialize(&path).await.unwrap();
        assert_eq!(first.count_users().await.unwrap(), 5);
        drop(first);

        let second = DatabaseStorage::initialize(&path).await.unwrap();
        assert_eq!(second.count_users().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_table() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::open(temp_path(&dir)).await.unwrap();
        storage
            .create_user("Existing", "existing@example.com")
            .await
            .unwrap();

        let inserted = sample_data::seed(&storage.db).await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::open(temp_path(&dir)).await.unwrap();
        assert!(storage.list_users().await.unwrap().is_empty());

        let inserted = sample_data::seed(&storage.db).await.unwrap();
        assert_eq!(inserted, 5);
        assert_eq!(storage.list_users().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_user() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();

        let created = storage
            .create_user("Frank", "frank@example.com")
            .await
            .unwrap();
        assert_eq!(created.name, "Frank");
        assert_eq!(created.email, "frank@example.com");
        assert!(created.id > 5);

        let fetched = storage.get_user(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();
        assert_eq!(storage.get_user(9999).await.unwrap(), None);
        assert_eq!(storage.get_user(-1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();

        let err = storage
            .create_user("Dup", "alice@example.com")
            .await
            .unwrap_err();
        assert!(
            matches!(err, StorageError::ConstraintViolation(_)),
            "unexpected error: {:?}",
            err
        );
        assert_eq!(storage.count_users().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();

        let a = storage.create_user("A", "a@example.com").await.unwrap();
        let _ = storage.create_user("A again", "a@example.com").await;
        let b = storage.create_user("B", "b@example.com").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_full_scenario_newest_first() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();
        assert_eq!(storage.list_users().await.unwrap().len(), 5);

        let frank = storage
            .create_user("Frank", "frank@example.com")
            .await
            .unwrap();
        let users = storage.list_users().await.unwrap();
        assert_eq!(users.len(), 6);
        assert_eq!(users[0], frank);

        assert!(storage
            .create_user("Dup", "alice@example.com")
            .await
            .is_err());
        assert_eq!(storage.list_users().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_list_order_is_descending() {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::initialize(temp_path(&dir)).await.unwrap();
        let users = storage.list_users().await.unwrap();
        for pair in users.windows(2) {
            assert!(
                (pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id),
                "{:?} should come before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[tokio::test]
    async fn test_path_with_url_characters_is_used_verbatim() {
        let dir = TempDir::new().unwrap();
        for name in ["a%41b.db", "q?x.db", "hash#1.db"] {
            let path = dir.path().join(name);
            let storage = DatabaseStorage::initialize(&path).await.unwrap();
            assert!(path.exists(), "{} was not created", name);
            assert_eq!(storage.count_users().await.unwrap(), 5);
        }

        let mut created: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".db"))
            .collect();
        created.sort();
        assert_eq!(created, vec!["a%41b.db", "hash#1.db", "q?x.db"]);
    }

    #[tokio::test]
    async fn test_initialize_fails_when_directory_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = DatabaseStorage::initialize(blocker.join("app.db")).await;
        assert!(matches!(
            result,
            Err(StorageError::InitializationFailed(_))
        ));
    }
}
