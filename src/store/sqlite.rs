//! SQLite-backed seal store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{decode_rows, RawSealRow, SealStore};
use crate::errors::AppError;
use crate::models::{NewSeal, SealRecord, SealStatus};

/// Initialize the database connection pool and create the seals table.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seals (
            id TEXT PRIMARY KEY,
            seal_id TEXT NOT NULL,
            department TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'In Stock',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_seals_created_at ON seals(created_at);")
        .execute(pool)
        .await?;

    Ok(())
}

/// Seal store over a local SQLite file.
#[derive(Clone)]
pub struct SqliteSealStore {
    pool: SqlitePool,
}

impl SqliteSealStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SealStore for SqliteSealStore {
    async fn list_newest_first(&self) -> Result<Vec<SealRecord>, AppError> {
        // rowid breaks ties between inserts sharing a timestamp
        let rows = sqlx::query(
            "SELECT id, seal_id, department, status, created_at FROM seals ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_rows(rows.iter().map(raw_from_row).collect()))
    }

    async fn insert(&self, seal: &NewSeal) -> Result<(), AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        // Fixed-width UTC text sorts chronologically
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            "INSERT INTO seals (id, seal_id, department, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&seal.seal_id)
        .bind(seal.department.as_str())
        .bind(seal.status.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(&self, id: &str, status: SealStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE seals SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Seal {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM seals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Seal {} not found", id)));
        }
        Ok(())
    }
}

fn raw_from_row(row: &SqliteRow) -> RawSealRow {
    RawSealRow {
        id: row.get("id"),
        seal_id: row.get("seal_id"),
        department: row.get("department"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}
