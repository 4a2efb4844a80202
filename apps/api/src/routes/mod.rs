pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::applications::{self, MAX_RESUME_BYTES};
use crate::companies;
use crate::interview;
use crate::jobs;
use crate::state::AppState;

/// Room for the text fields of the application form on top of the résumé itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Companies
        .route("/api/v1/companies", post(companies::handlers::handle_register))
        .route(
            "/api/v1/companies/:id/jobs",
            post(companies::handlers::handle_create_job),
        )
        .route(
            "/api/v1/companies/:id/applications",
            get(companies::handlers::handle_list_applications),
        )
        .route(
            "/api/v1/companies/jobs/:job_id/approve",
            post(companies::handlers::handle_approve_questions),
        )
        // Public job board
        .route("/api/v1/jobs", get(jobs::handlers::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handlers::handle_get_job))
        // Applications
        .route(
            "/api/v1/applications",
            post(applications::handlers::handle_apply)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + FORM_OVERHEAD_BYTES)),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handlers::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/answers",
            post(applications::handlers::handle_submit_answers),
        )
        // Interview chat
        .route(
            "/api/v1/interviews/start",
            post(interview::handlers::handle_start),
        )
        .route(
            "/api/v1/interviews/next",
            post(interview::handlers::handle_next),
        )
        .route(
            "/api/v1/interviews/finalize",
            post(interview::handlers::handle_finalize),
        )
        .route(
            "/api/v1/interviews/:application_id",
            delete(interview::handlers::handle_clear),
        )
        .with_state(state)
}
