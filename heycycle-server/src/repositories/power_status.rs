use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite};

use crate::configs::Storage;
use crate::models::PowerStatus;

#[derive(Clone)]
pub struct PowerStatusRepository {
    storage: Arc<Storage>,
}

impl PowerStatusRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl PowerStatusRepository {
    pub async fn create(&self, item: &PowerStatus) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO power_status (cycle_id, timestamp, device_id, fog, plasma, pump, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.cycle_id)
        .bind(item.timestamp)
        .bind(&item.device_id)
        .bind(item.fog)
        .bind(item.plasma)
        .bind(item.pump)
        .bind(&item.description)
        .execute(self.get_pool())
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<PowerStatus>, Error> {
        let record: Option<PowerStatus> =
            sqlx::query_as("SELECT * FROM power_status WHERE id = $1")
                .bind(id)
                .fetch_optional(self.get_pool())
                .await?;

        Ok(record)
    }

    pub async fn find_by_cycle_id(&self, cycle_id: i64) -> Result<Vec<PowerStatus>, Error> {
        let records: Vec<PowerStatus> =
            sqlx::query_as("SELECT * FROM power_status WHERE cycle_id = $1 ORDER BY id")
                .bind(cycle_id)
                .fetch_all(self.get_pool())
                .await?;

        Ok(records)
    }

    /// Newest first.
    pub async fn find_recent(&self, device_id: &str, limit: i64) -> Result<Vec<PowerStatus>, Error> {
        let records: Vec<PowerStatus> = sqlx::query_as(
            r#"
            SELECT * FROM power_status
            WHERE device_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.get_pool())
        .await?;

        Ok(records)
    }
}
