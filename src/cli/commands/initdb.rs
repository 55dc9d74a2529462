use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{debug, info, instrument};

/// Apply every pending migration to the database at `database_url`.
#[instrument]
pub async fn init_database(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to {}", database_url))?;

    let pending = Migrator::get_pending_migrations(&db).await?;
    if pending.is_empty() {
        info!("Database schema is up to date");
        return Ok(());
    }
    for migration in &pending {
        debug!("Pending migration {}", migration.name());
    }

    Migrator::up(&db, None)
        .await
        .context("failed to run database migrations")?;
    info!("Applied {} migrations", pending.len());
    Ok(())
}
