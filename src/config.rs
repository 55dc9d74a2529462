use std::path::PathBuf;
use std::sync::Arc;

use accounts::{Argon2Hasher, UserManager};
use anyhow::Result;
use sea_orm::Database;
use tracing::info;

use crate::schemas::AppState;

/// Load `.env` overrides for `DATABASE_URL`, `BIND_ADDRESS` and `RUST_LOG`.
/// Returns the path of the file that was read, if any.
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Initialize application state for the given database
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let users = UserManager::new(Arc::new(Argon2Hasher::new()));

    Ok(AppState { db, users })
}
