use std::sync::Arc;

use accounts::{Argon2Hasher, ExtraFields, UserManager};
use anyhow::Result;
use sea_orm::Database;
use tracing::{debug, error, info, trace};

pub async fn create_superuser(email: &str, password: Option<&str>, database_url: &str) -> Result<()> {
    trace!("Entering create_superuser function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url).await?;
    let manager = UserManager::new(Arc::new(Argon2Hasher::new()));

    if password.is_none() {
        info!("No password given; the superuser will not be able to log in until one is set");
    }

    match manager
        .create_superuser(&db, email, password, ExtraFields::default())
        .await
    {
        Ok(user) => {
            info!("Superuser created with ID: {}, email: {}", user.id, user.email);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create superuser '{}': {}", email, e);
            Err(e.into())
        }
    }
}
