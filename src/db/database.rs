use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::{GenerationInsert, GenerationRow};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS app_state (\
                key TEXT PRIMARY KEY,\
                value TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS generations (\
                id INTEGER PRIMARY KEY AUTOINCREMENT,\
                input_path TEXT NOT NULL,\
                output_path TEXT NOT NULL,\
                style TEXT NOT NULL,\
                outfit TEXT NOT NULL,\
                model TEXT NOT NULL,\
                created_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_generations_created_at ON generations(created_at);",
        )
        .execute(&pool)
        .await?;

        info!("Database tables created successfully");

        Ok(Database { pool })
    }

    pub async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM app_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.map(|(value,)| value))
    }

    pub async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO app_state (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_generation(&self, insert: &GenerationInsert) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO generations (input_path, output_path, style, outfit, model, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&insert.input_path)
        .bind(&insert.output_path)
        .bind(&insert.style)
        .bind(&insert.outfit)
        .bind(&insert.model)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn recent_generations(&self, limit: i64) -> Result<Vec<GenerationRow>> {
        let rows = sqlx::query_as::<_, GenerationRow>(
            "SELECT id, input_path, output_path, style, outfit, model, created_at \
             FROM generations ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
