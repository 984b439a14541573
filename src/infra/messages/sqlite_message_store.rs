// SQLite-backed message log.
//
// Tables:
// - messages: one row per inbound send, the audit trail root

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::core::identity::Identity;
use crate::core::relay::{MessageStore, StoreError};

#[derive(Clone)]
pub struct SqliteMessageStore {
    pool: Pool<Sqlite>,
}

impl SqliteMessageStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender TEXT NOT NULL,
                receiver TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_sender_receiver
                ON messages(sender, receiver)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn insert(
        &self,
        sender: &Identity,
        receiver: &Identity,
        content: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender, receiver, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(sender.as_str())
        .bind(receiver.as_str())
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    async fn store() -> SqliteMessageStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteMessageStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_returns_sequential_ids() {
        let store = store().await;
        let alice = Identity::normalize("alice");
        let bob = Identity::normalize("bob");

        let first = store.insert(&alice, &bob, "hello").await.unwrap();
        let second = store.insert(&alice, &bob, "again").await.unwrap();
        assert!(second > first);

        let row = sqlx::query("SELECT sender, receiver, content FROM messages WHERE id = ?")
            .bind(first)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("sender"), "alice");
        assert_eq!(row.get::<String, _>("receiver"), "bob");
        assert_eq!(row.get::<String, _>("content"), "hello");
    }
}
