use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::evaluation::compatibility::AnswerPair;

pub const APPLICATION_APPLIED: &str = "applied";
pub const APPLICATION_IN_REVIEW: &str = "in_review";

pub const DOCUMENT_RESUME: &str = "resume";
pub const DECISION_PENDING_REVIEW: &str = "pending_review";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub years_experience: i32,
    pub skills: Vec<String>,
    pub education: Option<String>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    pub ai_score: Option<i16>,
    pub compatibility: Option<i16>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub score: i16,
    pub compatibility: i16,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub answers: Json<Vec<AnswerPair>>,
    pub evaluator: String,
    pub decision: String,
    pub created_at: DateTime<Utc>,
}

/// One row of a company's application dashboard.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationSummaryRow {
    pub application_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub ai_score: Option<i16>,
    pub compatibility: Option<i16>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}
