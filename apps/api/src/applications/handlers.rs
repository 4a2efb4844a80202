//! Axum route handlers for candidate applications.

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::applications::{
    application_detail, apply, submit_answers, ApplicationDetailResponse, ApplyForm,
    ApplyResponse, SubmitAnswersRequest, SubmitAnswersResponse, UploadedFile, RESUME_FIELD,
};
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_RESUME_NAME: &str = "resume.pdf";
const DEFAULT_RESUME_TYPE: &str = "application/pdf";

fn invalid_multipart(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}

/// POST /api/v1/applications
///
/// Multipart form: `job_id`, `name`, `email`, `phone`, `city`, `years_experience`,
/// plus the PDF résumé as `resume`. Returns the job's approved questions to answer next.
pub async fn handle_apply(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let mut fields = HashMap::new();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let file_name = field
                .file_name()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(DEFAULT_RESUME_NAME)
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_RESUME_TYPE)
                .to_string();
            let bytes = field.bytes().await.map_err(invalid_multipart)?;
            resume = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(invalid_multipart)?;
            fields.insert(name, value);
        }
    }

    let form = ApplyForm::from_parts(fields, resume)?;
    let response = apply(&state, form).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/applications/:id/answers
///
/// Scores the candidate against the job and emails a confirmation.
/// A model or mail outage degrades the result but never fails the request.
pub async fn handle_submit_answers(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(request): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmitAnswersResponse>, AppError> {
    let response = submit_answers(&state, application_id, &request).await?;
    Ok(Json(response))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    let response = application_detail(&state.db, application_id).await?;
    Ok(Json(response))
}
