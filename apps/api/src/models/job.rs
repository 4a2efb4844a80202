use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_DRAFT: &str = "draft";
pub const JOB_PUBLISHED: &str = "published";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub position: String,
    pub contract_type: String,
    pub modality: String,
    pub required_skills: Vec<String>,
    pub min_experience: i32,
    pub max_experience: Option<i32>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub city: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl JobRow {
    pub fn is_published(&self) -> bool {
        self.status == JOB_PUBLISHED
    }

    /// Stored minimum experience as the evaluator expects it.
    pub fn min_experience_years(&self) -> u32 {
        u32::try_from(self.min_experience).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobQuestionRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub ordinal: i32,
    pub question: String,
    pub kind: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Published job joined with its company name, as listed to candidates.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobListingRow {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub city: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub modality: String,
    pub required_skills: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
}
