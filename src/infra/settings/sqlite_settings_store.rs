// SQLite-backed escalation settings store.
//
// Tables:
// - escalation_settings: one row per victim identity; thresholds are
//   derived from sensitivity at write time

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use crate::core::escalation::{EscalationSettings, Sensitivity};
use crate::core::identity::Identity;
use crate::core::relay::{SettingsStore, StoreError};

#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

impl SqliteSettingsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS escalation_settings (
                username TEXT PRIMARY KEY,
                sensitivity TEXT NOT NULL,
                warn_threshold INTEGER NOT NULL,
                block_threshold INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, victim: &Identity) -> Result<Option<EscalationSettings>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sensitivity, warn_threshold, block_threshold
            FROM escalation_settings WHERE username = ?
            "#,
        )
        .bind(victim.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(row.map(|row| {
            let sensitivity: String = row.get("sensitivity");
            EscalationSettings {
                sensitivity: Sensitivity::parse_or_default(&sensitivity),
                warn_threshold: row.get::<i64, _>("warn_threshold") as u32,
                block_threshold: row.get::<i64, _>("block_threshold") as u32,
            }
        }))
    }

    async fn upsert(
        &self,
        victim: &Identity,
        sensitivity: Sensitivity,
    ) -> Result<EscalationSettings, StoreError> {
        let settings = EscalationSettings::for_sensitivity(sensitivity);

        sqlx::query(
            r#"
            INSERT INTO escalation_settings (username, sensitivity, warn_threshold, block_threshold, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                sensitivity = excluded.sensitivity,
                warn_threshold = excluded.warn_threshold,
                block_threshold = excluded.block_threshold
            "#,
        )
        .bind(victim.as_str())
        .bind(settings.sensitivity.as_str())
        .bind(settings.warn_threshold as i64)
        .bind(settings.block_threshold as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteSettingsStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteSettingsStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn missing_row_reads_as_none() {
        let store = store().await;
        let bob = Identity::normalize("bob");
        assert_eq!(store.get(&bob).await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = store().await;
        let bob = Identity::normalize("bob");

        let saved = store.upsert(&bob, Sensitivity::High).await.unwrap();
        assert_eq!(saved, EscalationSettings::for_sensitivity(Sensitivity::High));

        let loaded = store.get(&bob).await.unwrap().unwrap();
        assert_eq!(loaded.sensitivity, Sensitivity::High);
        assert_eq!((loaded.warn_threshold, loaded.block_threshold), (1, 2));
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_settings() {
        let store = store().await;
        let bob = Identity::normalize("bob");

        store.upsert(&bob, Sensitivity::Low).await.unwrap();
        store.upsert(&bob, Sensitivity::Medium).await.unwrap();

        let loaded = store.get(&bob).await.unwrap().unwrap();
        assert_eq!(loaded.sensitivity, Sensitivity::Medium);
        assert_eq!((loaded.warn_threshold, loaded.block_threshold), (1, 3));
    }
}
