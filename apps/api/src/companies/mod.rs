// Company workflows: registration, job creation with suggested screening questions,
// question approval (which publishes the job) and the application dashboard.

pub mod handlers;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::questions::{JobBrief, QuestionKind};
use crate::evaluation::EvaluationEngine;
use crate::records::{self, NewCompany, NewJob};
use crate::validation::{check_email, check_length, check_range};

pub const MAX_MIN_EXPERIENCE: i32 = 30;
pub const MAX_MAX_EXPERIENCE: i32 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Registration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub tax_id: String,
    pub industry: String,
    pub size: String,
    #[serde(default)]
    pub description: Option<String>,
    pub city: String,
    pub email: String,
}

impl RegisterCompanyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_length("name", &self.name, 2, 200)?;
        check_length("tax_id", &self.tax_id, 5, 50)?;
        check_length("industry", &self.industry, 1, 100)?;
        check_length("size", &self.size, 1, 50)?;
        check_length("city", &self.city, 1, 100)?;
        check_email("email", &self.email)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterCompanyResponse {
    pub company_id: Uuid,
    pub message: String,
}

pub async fn register_company(
    pool: &PgPool,
    request: &RegisterCompanyRequest,
) -> Result<RegisterCompanyResponse, AppError> {
    request.validate()?;

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let company_id = records::insert_company(
        pool,
        &NewCompany {
            name: request.name.trim(),
            tax_id: request.tax_id.trim(),
            industry: request.industry.trim(),
            size: request.size.trim(),
            description,
            city: request.city.trim(),
            email: request.email.trim(),
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation("A company with this tax_id is already registered".to_string())
        }
        other => AppError::Database(other),
    })?;

    info!("Registered company {company_id}");
    Ok(RegisterCompanyResponse {
        company_id,
        message: "Company registered".to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Job creation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub position: String,
    pub contract_type: String,
    pub modality: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub min_experience: i32,
    #[serde(default)]
    pub max_experience: Option<i32>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    pub city: String,
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_length("title", &self.title, 5, 200)?;
        check_length("description", &self.description, 20, usize::MAX)?;
        check_length("position", &self.position, 1, 100)?;
        check_length("contract_type", &self.contract_type, 1, 50)?;
        check_length("modality", &self.modality, 1, 50)?;
        check_length("city", &self.city, 1, 100)?;
        check_range("min_experience", self.min_experience, 0, MAX_MIN_EXPERIENCE)?;

        if let Some(max) = self.max_experience {
            check_range("max_experience", max, 0, MAX_MAX_EXPERIENCE)?;
            if max < self.min_experience {
                return Err(AppError::Validation(
                    "max_experience cannot be less than min_experience".to_string(),
                ));
            }
        }

        for (field, value) in [("salary_min", self.salary_min), ("salary_max", self.salary_max)] {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(AppError::Validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if max < min {
                return Err(AppError::Validation(
                    "salary_max cannot be less than salary_min".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Trimmed, de-duplicated skills with blanks removed, in the order given.
    pub fn normalized_skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for skill in self.required_skills.iter().map(|s| s.trim()) {
            if !skill.is_empty() && !skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                skills.push(skill.to_string());
            }
        }
        skills
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestedQuestion {
    pub question_id: Uuid,
    pub question: String,
    pub kind: QuestionKind,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
    pub status: &'static str,
    pub suggested_questions: Vec<SuggestedQuestion>,
    /// True when the model was unavailable and the standard questions were used.
    pub fallback_questions: bool,
}

/// Creates the job as a draft together with its suggested questions, all unapproved.
pub async fn create_job(
    pool: &PgPool,
    evaluator: &EvaluationEngine,
    company_id: Uuid,
    request: &CreateJobRequest,
) -> Result<CreateJobResponse, AppError> {
    request.validate()?;

    if records::get_company(pool, company_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Company {company_id} not found")));
    }

    let skills = request.normalized_skills();
    let outcome = evaluator
        .generate_questions(&JobBrief {
            title: request.title.trim(),
            description: request.description.trim(),
            required_skills: &skills,
            min_experience: u32::try_from(request.min_experience).unwrap_or(0),
        })
        .await;
    let fallback_questions = outcome.is_fallback();
    let questions = outcome.into_value();

    let mut tx = pool.begin().await?;
    let job_id = records::insert_job(
        &mut *tx,
        &NewJob {
            company_id,
            title: request.title.trim(),
            description: request.description.trim(),
            position: request.position.trim(),
            contract_type: request.contract_type.trim(),
            modality: request.modality.trim(),
            required_skills: &skills,
            min_experience: request.min_experience,
            max_experience: request.max_experience,
            salary_min: request.salary_min,
            salary_max: request.salary_max,
            city: request.city.trim(),
        },
    )
    .await?;

    let mut suggested_questions = Vec::with_capacity(questions.len());
    for (ordinal, spec) in (1..).zip(questions) {
        let question_id = records::insert_job_question(&mut *tx, job_id, ordinal, &spec).await?;
        suggested_questions.push(SuggestedQuestion {
            question_id,
            question: spec.question,
            kind: spec.kind,
        });
    }
    tx.commit().await?;

    info!(
        "Created draft job {job_id} for company {company_id} with {} suggested questions",
        suggested_questions.len()
    );

    Ok(CreateJobResponse {
        job_id,
        status: crate::models::job::JOB_DRAFT,
        suggested_questions,
        fallback_questions,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Approval / publishing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QuestionApproval {
    pub question_id: Uuid,
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApproveQuestionsRequest {
    #[serde(default)]
    pub questions: Vec<QuestionApproval>,
}

#[derive(Debug, Serialize)]
pub struct ApproveQuestionsResponse {
    pub job_id: Uuid,
    pub status: &'static str,
    pub approved_count: usize,
    pub message: String,
}

/// Applies the approval decisions and publishes the job, atomically.
pub async fn approve_and_publish(
    pool: &PgPool,
    job_id: Uuid,
    request: &ApproveQuestionsRequest,
) -> Result<ApproveQuestionsResponse, AppError> {
    let mut tx = pool.begin().await?;

    if records::publish_job(&mut *tx, job_id).await? == 0 {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    for decision in &request.questions {
        let updated =
            records::set_question_approval(&mut *tx, job_id, decision.question_id, decision.approved)
                .await?;
        if updated == 0 {
            return Err(AppError::Validation(format!(
                "Question {} does not belong to job {job_id}",
                decision.question_id
            )));
        }
    }
    tx.commit().await?;

    let approved_count = request.questions.iter().filter(|q| q.approved).count();
    info!("Published job {job_id} with {approved_count} approved questions");

    Ok(ApproveQuestionsResponse {
        job_id,
        status: crate::models::job::JOB_PUBLISHED,
        approved_count,
        message: "Job published".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> RegisterCompanyRequest {
        RegisterCompanyRequest {
            name: "Acme".to_string(),
            tax_id: "900123456".to_string(),
            industry: "Software".to_string(),
            size: "51-200".to_string(),
            description: None,
            city: "Bogotá".to_string(),
            email: "hr@acme.test".to_string(),
        }
    }

    fn job() -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".to_string(),
            description: "Build and operate our payments platform in Rust.".to_string(),
            position: "Engineer".to_string(),
            contract_type: "Full-time".to_string(),
            modality: "Remote".to_string(),
            required_skills: vec![" Rust ".to_string(), "".to_string(), "rust".to_string(), "SQL".to_string()],
            min_experience: 3,
            max_experience: Some(8),
            salary_min: Some(1000.0),
            salary_max: Some(2000.0),
            city: "Medellín".to_string(),
        }
    }

    #[test]
    fn test_valid_company_passes() {
        assert!(company().validate().is_ok());
    }

    #[test]
    fn test_company_field_limits() {
        let mut short_name = company();
        short_name.name = "A".to_string();
        assert!(short_name.validate().is_err());

        let mut short_tax_id = company();
        short_tax_id.tax_id = "123".to_string();
        assert!(short_tax_id.validate().is_err());

        let mut bad_email = company();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_valid_job_passes() {
        assert!(job().validate().is_ok());
    }

    #[test]
    fn test_job_field_limits() {
        let mut short_title = job();
        short_title.title = "Dev".to_string();
        assert!(short_title.validate().is_err());

        let mut short_description = job();
        short_description.description = "Too short".to_string();
        assert!(short_description.validate().is_err());

        let mut too_senior = job();
        too_senior.min_experience = 31;
        assert!(too_senior.validate().is_err());

        let mut inverted = job();
        inverted.max_experience = Some(1);
        assert!(inverted.validate().is_err());

        let mut negative_salary = job();
        negative_salary.salary_min = Some(-1.0);
        assert!(negative_salary.validate().is_err());

        let mut inverted_salary = job();
        inverted_salary.salary_max = Some(500.0);
        assert!(inverted_salary.validate().is_err());
    }

    #[test]
    fn test_normalized_skills_dedupes_case_insensitively() {
        assert_eq!(job().normalized_skills(), vec!["Rust", "SQL"]);
    }
}
