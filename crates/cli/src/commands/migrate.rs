use customers_core::config::{AppConfig, LoadOptions};
use customers_db::{connect_with_config, migrations, MigrationStatus};

use crate::commands::{block_on, CommandFailure, CommandResult, FailureClass};

pub fn run() -> CommandResult {
    CommandResult::from_outcome("migrate", apply())
}

fn apply() -> Result<String, CommandFailure> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandFailure::new(FailureClass::ConfigValidation, format!("configuration issue: {error}"))
    })?;

    let status = block_on(migrate(&config))??;
    Ok(format!("applied pending migrations ({}/{} applied)", status.applied, status.known))
}

async fn migrate(config: &AppConfig) -> Result<MigrationStatus, CommandFailure> {
    let pool = connect_with_config(&config.database)
        .await
        .map_err(|error| CommandFailure::new(FailureClass::DbConnectivity, error))?;

    let outcome = match migrations::run_pending(&pool).await {
        Ok(()) => migrations::status(&pool)
            .await
            .map_err(|error| CommandFailure::new(FailureClass::DbConnectivity, error)),
        Err(error) => Err(CommandFailure::new(FailureClass::Migration, error)),
    };
    pool.close().await;
    outcome
}
