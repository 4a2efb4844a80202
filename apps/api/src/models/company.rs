use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub tax_id: String,
    pub industry: String,
    pub size: String,
    pub description: Option<String>,
    pub city: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
