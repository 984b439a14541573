// SQLite-backed block relationship store.
//
// Tables:
// - block_relationships: unique per (victim, offender); presence of a
//   blocked row is the sole authority for delivery suppression

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::core::identity::Identity;
use crate::core::relay::{BlockStore, BlockedEntry, StoreError};

#[derive(Clone)]
pub struct SqliteBlockStore {
    pool: Pool<Sqlite>,
}

impl SqliteBlockStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS block_relationships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                victim TEXT NOT NULL,
                offender TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'blocked',
                created_at TEXT NOT NULL,
                UNIQUE (victim, offender)
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
impl BlockStore for SqliteBlockStore {
    async fn block(&self, victim: &Identity, offender: &Identity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO block_relationships (victim, offender, status, created_at)
            VALUES (?, ?, 'blocked', ?)
            ON CONFLICT(victim, offender) DO UPDATE SET
                status = 'blocked'
            "#,
        )
        .bind(victim.as_str())
        .bind(offender.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn unblock(&self, victim: &Identity, offender: &Identity) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM block_relationships WHERE victim = ? AND offender = ?")
            .bind(victim.as_str())
            .bind(offender.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn is_blocked(
        &self,
        victim: &Identity,
        offender: &Identity,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM block_relationships
            WHERE victim = ? AND offender = ? AND status = 'blocked'
            "#,
        )
        .bind(victim.as_str())
        .bind(offender.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn list_blocked(&self, victim: &Identity) -> Result<Vec<BlockedEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT offender, status, created_at FROM block_relationships
            WHERE victim = ?
            ORDER BY id
            "#,
        )
        .bind(victim.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| {
                let created_at: String = row.get("created_at");
                BlockedEntry {
                    offender: row.get("offender"),
                    status: row.get("status"),
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteBlockStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteBlockStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn block_is_idempotent() {
        let store = store().await;
        let bob = Identity::normalize("bob");
        let alice = Identity::normalize("alice");

        store.block(&bob, &alice).await.unwrap();
        store.block(&bob, &alice).await.unwrap();

        assert!(store.is_blocked(&bob, &alice).await.unwrap());
        assert_eq!(store.list_blocked(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unblock_is_idempotent() {
        let store = store().await;
        let bob = Identity::normalize("bob");
        let alice = Identity::normalize("alice");

        store.block(&bob, &alice).await.unwrap();
        store.unblock(&bob, &alice).await.unwrap();
        store.unblock(&bob, &alice).await.unwrap();

        assert!(!store.is_blocked(&bob, &alice).await.unwrap());
        assert!(store.list_blocked(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blocking_is_directional() {
        let store = store().await;
        let bob = Identity::normalize("bob");
        let alice = Identity::normalize("alice");

        store.block(&bob, &alice).await.unwrap();

        assert!(store.is_blocked(&bob, &alice).await.unwrap());
        assert!(!store.is_blocked(&alice, &bob).await.unwrap());
    }

    #[tokio::test]
    async fn list_blocked_preserves_insertion_order() {
        let store = store().await;
        let bob = Identity::normalize("bob");

        store.block(&bob, &Identity::normalize("zoe")).await.unwrap();
        store.block(&bob, &Identity::normalize("adam")).await.unwrap();

        let entries = store.list_blocked(&bob).await.unwrap();
        let offenders: Vec<&str> = entries.iter().map(|e| e.offender.as_str()).collect();
        assert_eq!(offenders, vec!["zoe", "adam"]);
        assert!(entries.iter().all(|e| e.status == "blocked"));
    }
}
