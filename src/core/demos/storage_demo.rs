use apm_demo::storage::database_storage::DatabaseStorage;
use apm_demo::storage::storage_trait::UserStorage;
use env_logger::Env;
use log::{info, warn};
use std::env;
use std::fs;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    // Initialize logger (RUST_LOG can override; default to info)
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    // Fresh database per run unless a path is given
    let db_path: PathBuf = env::var("STORAGE_DEMO_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("apm-demo-storage").join("demo.db"));
    if env::var("STORAGE_DEMO_DB").is_err() && db_path.exists() {
        fs::remove_file(&db_path).expect("remove previous demo db");
    }
    info!("Using database at {}", db_path.display());

    let storage = DatabaseStorage::initialize(&db_path)
        .await
        .expect("initialize storage");

    let users = storage.list_users().await.expect("list users");
    info!("{} users after initialization", users.len());
    for user in &users {
        info!("  #{} {} <{}> ({})", user.id, user.name, user.email, user.created_at);
    }

    let frank = storage
        .create_user("Frank", "frank@example.com")
        .await
        .expect("create user");
    info!("Created user #{} at {}", frank.id, frank.created_at);

    let fetched = storage
        .get_user(frank.id)
        .await
        .expect("get user")
        .expect("user exists");
    assert_eq!(fetched, frank);
    info!("Fetched user #{} back: {}", fetched.id, fetched.name);

    match storage.create_user("Someone", "frank@example.com").await {
        Ok(user) => warn!("Duplicate email unexpectedly accepted as #{}", user.id),
        Err(e) => info!("Duplicate email rejected: {}", e),
    }

    let missing = storage.get_user(9999).await.expect("get user");
    info!("Lookup of #9999 returned {:?}", missing);

    let users = storage.list_users().await.expect("list users");
    info!(
        "{} users now, newest first: {}",
        users.len(),
        users
            .iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}
