//! Axum route handlers for the public job board.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::models::job::{JobListingRow, JobRow};
use crate::records::{self, JobFilters};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub city: Option<String>,
    pub title: Option<String>,
    pub modality: Option<String>,
}

impl From<JobQuery> for JobFilters {
    fn from(query: JobQuery) -> Self {
        JobFilters {
            city: query.city,
            title: query.title,
            modality: query.modality,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobListingRow>,
}

#[derive(Debug, Serialize)]
pub struct CompanySummary {
    pub name: String,
    pub city: String,
    pub industry: String,
    pub description: Option<String>,
}

impl From<CompanyRow> for CompanySummary {
    fn from(company: CompanyRow) -> Self {
        CompanySummary {
            name: company.name,
            city: company.city,
            industry: company.industry,
            description: company.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: JobRow,
    pub company: Option<CompanySummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs?city=&title=&modality=
///
/// Published jobs, newest first. Filters are case-insensitive substring matches.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = records::list_published_jobs(&state.db, &query.into()).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = records::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let company = records::get_company(&state.db, job.company_id)
        .await?
        .map(CompanySummary::from);

    Ok(Json(JobDetailResponse { job, company }))
}
