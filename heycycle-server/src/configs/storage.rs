use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    clean_start: bool,
}

impl Storage {
    /// Opens nothing yet; the single connection is established on first use so an
    /// unreachable database only fails the operations that need it.
    pub fn new(database: &Database) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None) // in memory db is lost with its connection
            .max_lifetime(None)
            .connect_lazy(&database.url)?;

        Ok(Self {
            pool,
            clean_start: database.clean_start,
        })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_schema(&self, schema: &SchemaManager) -> Result<(), Error> {
        if self.clean_start {
            for statement in schema.dispose_schema() {
                sqlx::query(&statement).execute(&self.pool).await?;
            }

            tracing::warn!("perform a clean boot: clean and recreate schema");
        }

        for statement in schema.create_schema() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }

        tracing::info!("database initialized successfully");

        Ok(())
    }
}
