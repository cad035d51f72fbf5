use anyhow::{Context, Result};
use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::entities::{tag, task, task_tag};

/// Keeps in-memory databases from being recycled by the pool.
const IN_MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Local storage backed by SQLite through SeaORM
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open the configured database and make sure the schema exists
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut options = ConnectOptions::new(config.url.clone());
        options.sqlx_logging(false);

        if config.is_in_memory() {
            // Every pooled connection to `:memory:` is its own database
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(IN_MEMORY_CONNECTION_LIFETIME)
                .max_lifetime(IN_MEMORY_CONNECTION_LIFETIME);
        } else {
            ensure_parent_dir(&config.url)?;
            options.max_connections(config.max_connections).min_connections(1);
        }

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", config.url))?;

        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        info!("Opened task database at {}", config.url);

        Ok(storage)
    }

    /// Private in-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self> {
        Self::new(&DatabaseConfig::in_memory()).await
    }

    /// Initialize database schema from the entity definitions
    async fn init_schema(&self) -> Result<()> {
        self.create_table(task::Entity).await?;
        self.create_table(tag::Entity).await?;
        self.create_table(task_tag::Entity).await?;
        Ok(())
    }

    async fn create_table<E>(&self, entity: E) -> Result<()>
    where
        E: EntityTrait,
    {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut table = schema.create_table_from_entity(entity);
        table.if_not_exists();
        self.conn.execute(backend.build(&table)).await?;

        for mut index in schema.create_index_from_entity(entity) {
            index.if_not_exists();
            self.conn.execute(backend.build(&index)).await?;
        }

        debug!("Ensured table {}", entity.table_name());
        Ok(())
    }

    /// Clear all data from the database
    pub async fn clear_all_data(&self) -> Result<()> {
        task_tag::Entity::delete_many().exec(&self.conn).await?;
        task::Entity::delete_many().exec(&self.conn).await?;
        tag::Entity::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}

/// Create the directory holding a file-backed SQLite database
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }
    }
    Ok(())
}
