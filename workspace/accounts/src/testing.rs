use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

/// In-memory SQLite database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// File-backed SQLite database inside `dir`, so several pooled
/// connections see the same data.
pub async fn setup_file_db(dir: &tempfile::TempDir) -> DatabaseConnection {
    let path = dir.path().join("accounts.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}
