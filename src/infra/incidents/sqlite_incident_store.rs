// SQLite-backed incident log for detected offenses.
//
// Tables:
// - incidents: append-only; screenshot_path is filled in later by the
//   evidence upload path

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::core::escalation::Severity;
use crate::core::identity::Identity;
use crate::core::relay::{Incident, IncidentStore, StoreError};

#[derive(Clone)]
pub struct SqliteIncidentStore {
    pool: Pool<Sqlite>,
}

impl SqliteIncidentStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS incidents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id INTEGER NOT NULL,
                sender TEXT NOT NULL,
                victim TEXT NOT NULL,
                detected_words TEXT NOT NULL,
                severity TEXT NOT NULL,
                screenshot_path TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_incidents_sender_victim
                ON incidents(sender, victim)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_incidents_message_id
                ON incidents(message_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    fn incident_from_row(row: &sqlx::sqlite::SqliteRow) -> Incident {
        let detected_words: String = row.get("detected_words");
        let detected_words: Vec<String> = detected_words
            .split(", ")
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect();

        let severity: String = row.get("severity");
        let severity = Severity::parse(&severity).unwrap_or(Severity::Warning);

        let created_at: String = row.get("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Incident {
            id: row.get("id"),
            message_id: row.get("message_id"),
            sender: row.get("sender"),
            victim: row.get("victim"),
            detected_words,
            severity,
            screenshot_path: row.get("screenshot_path"),
            created_at,
        }
    }
}

#[async_trait]
impl IncidentStore for SqliteIncidentStore {
    async fn record(
        &self,
        message_id: i64,
        sender: &Identity,
        victim: &Identity,
        detected_words: &[String],
        severity: Severity,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO incidents (message_id, sender, victim, detected_words, severity, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message_id)
        .bind(sender.as_str())
        .bind(victim.as_str())
        .bind(detected_words.join(", "))
        .bind(severity.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn count_for_pair(
        &self,
        sender: &Identity,
        victim: &Identity,
    ) -> Result<u32, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM incidents WHERE sender = ? AND victim = ?")
            .bind(sender.as_str())
            .bind(victim.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let count: i64 = row.get("n");
        Ok(count as u32)
    }

    async fn attach_screenshot(&self, message_id: i64, path: &str) -> Result<(), StoreError> {
        // Latest incident for the message wins; nothing to attach to is fine.
        sqlx::query(
            r#"
            UPDATE incidents SET screenshot_path = ?
            WHERE id = (
                SELECT id FROM incidents WHERE message_id = ? ORDER BY id DESC LIMIT 1
            )
            "#,
        )
        .bind(path)
        .bind(message_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Incident>, StoreError> {
        let rows = sqlx::query("SELECT * FROM incidents ORDER BY id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(rows.iter().map(Self::incident_from_row).collect())
    }
}
