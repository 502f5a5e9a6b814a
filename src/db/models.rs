use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GenerationRow {
    pub id: i64,
    pub input_path: String,
    pub output_path: String,
    pub style: String,
    pub outfit: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GenerationInsert {
    pub input_path: String,
    pub output_path: String,
    pub style: String,
    pub outfit: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}
