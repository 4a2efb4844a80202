//! Axum route handlers for the Companies API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::companies::{
    approve_and_publish, create_job, register_company, ApproveQuestionsRequest,
    ApproveQuestionsResponse, CreateJobRequest, CreateJobResponse, RegisterCompanyRequest,
    RegisterCompanyResponse,
};
use crate::errors::AppError;
use crate::models::application::ApplicationSummaryRow;
use crate::records;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompanyApplicationsResponse {
    pub company_id: Uuid,
    pub applications: Vec<ApplicationSummaryRow>,
}

/// POST /api/v1/companies
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterCompanyRequest>,
) -> Result<(StatusCode, Json<RegisterCompanyResponse>), AppError> {
    let response = register_company(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/companies/:id/jobs
///
/// Saves the job as a draft and returns model-suggested screening questions for review.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let response = create_job(&state.db, &state.evaluator, company_id, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/companies/jobs/:job_id/approve
pub async fn handle_approve_questions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<ApproveQuestionsRequest>,
) -> Result<Json<ApproveQuestionsResponse>, AppError> {
    let response = approve_and_publish(&state.db, job_id, &request).await?;
    Ok(Json(response))
}

/// GET /api/v1/companies/:id/applications
///
/// Every application to the company's jobs, newest first.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CompanyApplicationsResponse>, AppError> {
    if records::get_company(&state.db, company_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Company {company_id} not found")));
    }

    let applications = records::list_company_applications(&state.db, company_id).await?;
    Ok(Json(CompanyApplicationsResponse {
        company_id,
        applications,
    }))
}
