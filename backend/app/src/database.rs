use std::cmp::max;

use crate::config::{self, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

pub async fn init() -> anyhow::Result<DatabaseConnection> {
    connect(config::get().database()).await
}

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url());
    options
        .min_connections(
            config
                .min_connections()
                .unwrap_or(max(num_cpus::get() as u32 * 4, 10)),
        )
        .max_connections(
            config
                .max_connections()
                .unwrap_or(max(num_cpus::get() as u32 * 8, 20)),
        )
        .connect_timeout(std::time::Duration::from_secs(8))
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(3600))
        .sqlx_logging(true);

    if config.is_postgres() {
        options.set_schema_search_path(config.schema());
    }

    let db = Database::connect(options).await?;
    db.ping().await?;

    tracing::info!("Database connected successfully");

    log_db_version(&db).await?;

    Ok(db)
}

async fn log_db_version(db: &DatabaseConnection) -> anyhow::Result<()> {
    let backend = db.get_database_backend();
    let sql = match backend {
        sea_orm::DatabaseBackend::Sqlite => "SELECT sqlite_version()",
        _ => "SELECT version()",
    };

    let version = db
        .query_one(Statement::from_string(backend, sql.to_owned()))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Could not retrieve database version"))?;

    let version_str: String = version.try_get_by_index::<String>(0)?;
    tracing::info!("Database version: {}", version_str);

    Ok(())
}
