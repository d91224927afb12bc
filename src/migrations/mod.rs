// Embedded schema migrations, applied at startup when the Postgres store is
// selected

pub mod diesel;

use crate::app_config::{AppConfig, StorageBackend};
use std::error::Error;
use tracing::{error, info};

/// Whether startup should apply migrations for this configuration
pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.storage == StorageBackend::Postgres && !config.disable_embedded_migrations
}

pub async fn run_all_migrations(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!(
        "[MIGRATIONS] Running Diesel migrations for environment: {}",
        config.server.environment
    );

    match diesel::run_migrations(config.database.url.clone()).await {
        Ok(0) => info!("[MIGRATIONS] ✓ Diesel migrations up to date"),
        Ok(applied) => info!("[MIGRATIONS] ✓ Applied {} Diesel migrations", applied),
        Err(e) => {
            error!("[MIGRATIONS] ✗ Diesel migration failed: {}", e);
            return Err(format!("Diesel migration failed: {}", e).into());
        },
    }

    Ok(())
}
