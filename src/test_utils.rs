use std::sync::Arc;

use crate::router::create_router;
use crate::schemas::AppState;
use accounts::password::Params;
use accounts::{Argon2Hasher, UserManager};
use axum::Router;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Argon2 with minimum cost parameters so tests stay fast
pub fn test_user_manager() -> UserManager {
    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .expect("valid argon2 params");
    UserManager::new(Arc::new(Argon2Hasher::with_params(params)))
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    AppState {
        db: setup_test_db().await,
        users: test_user_manager(),
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from the RUST_LOG environment variable,
/// defaulting to WARN if not set. The returned guard removes the subscriber
/// when dropped.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let state = setup_test_app_state().await;
    create_router(state)
}
