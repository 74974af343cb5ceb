use std::sync::Arc;

use customers_core::config::{AppConfig, ConfigError, LoadOptions};
use customers_core::customers::CustomerService;
use customers_db::{connect_with_config, migrations, DbPool, SqlCustomerRepository};
use thiserror::Error;
use tracing::info;

pub type SharedCustomerService = Arc<CustomerService<SqlCustomerRepository>>;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub customers: SharedCustomerService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Connects the pool, applies pending migrations and wires the customer
/// service over the SQL store.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        max_connections = config.database.max_connections,
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let customers = Arc::new(CustomerService::new(SqlCustomerRepository::new(db_pool.clone())));

    Ok(Application { config, db_pool, customers })
}

#[cfg(test)]
mod tests {
    use customers_core::config::{ConfigOverrides, LoadOptions};
    use customers_core::domain::customer::{CustomerRegistrationRequest, Gender};

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_rejects_non_sqlite_database_url() {
        let result = bootstrap(overrides("postgres://localhost/customers")).await;

        let error = result.err().expect("error");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("database.url"));
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_serves_customers() {
        let app = bootstrap(overrides("sqlite::memory:")).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'customer'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("customer table should exist after bootstrap");
        assert_eq!(table_count, 1);

        let created = app
            .customers
            .add_customer(CustomerRegistrationRequest {
                name: "Ada".to_string(),
                email: "ada@mailservice.com".to_string(),
                age: 36,
                gender: Gender::Female,
            })
            .await
            .expect("add customer");
        let listed = app.customers.list_customers().await.expect("list customers");
        assert_eq!(listed, vec![created]);

        app.db_pool.close().await;
    }
}
