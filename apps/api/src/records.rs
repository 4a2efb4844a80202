//! Record Store: typed PostgreSQL queries for companies, jobs, candidates and applications.
//!
//! Writes take any `PgExecutor` so workflows can group them in a transaction;
//! reads take the pool.

use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::evaluation::compatibility::{AnswerPair, CompatibilityEvaluation};
use crate::evaluation::questions::QuestionSpec;
use crate::models::application::{
    ApplicationRow, ApplicationSummaryRow, CandidateRow, EvaluationRow, APPLICATION_APPLIED,
    APPLICATION_IN_REVIEW, DECISION_PENDING_REVIEW, DOCUMENT_RESUME,
};
use crate::models::company::CompanyRow;
use crate::models::job::{JobListingRow, JobQuestionRow, JobRow, JOB_DRAFT, JOB_PUBLISHED};

// ────────────────────────────────────────────────────────────────────────────
// Insert parameters
// ────────────────────────────────────────────────────────────────────────────

pub struct NewCompany<'a> {
    pub name: &'a str,
    pub tax_id: &'a str,
    pub industry: &'a str,
    pub size: &'a str,
    pub description: Option<&'a str>,
    pub city: &'a str,
    pub email: &'a str,
}

pub struct NewJob<'a> {
    pub company_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub position: &'a str,
    pub contract_type: &'a str,
    pub modality: &'a str,
    pub required_skills: &'a [String],
    pub min_experience: i32,
    pub max_experience: Option<i32>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub city: &'a str,
}

pub struct NewCandidate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub years_experience: i32,
    pub skills: &'a [String],
    pub education: Option<&'a str>,
    pub summary: &'a str,
}

pub struct NewDocument<'a> {
    pub candidate_id: Uuid,
    pub file_name: &'a str,
    pub url: &'a str,
    pub size_kb: i32,
    pub mime_type: &'a str,
    pub extracted_text: &'a str,
}

/// Optional case-insensitive substring filters for the public job board.
#[derive(Debug, Default, Clone)]
pub struct JobFilters {
    pub city: Option<String>,
    pub title: Option<String>,
    pub modality: Option<String>,
}

/// Escapes LIKE wildcards in user input and wraps it for a substring match.
/// Blank filters are treated as absent.
pub fn like_pattern(filter: Option<&str>) -> Option<String> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty())?;
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

// ────────────────────────────────────────────────────────────────────────────
// Companies
// ────────────────────────────────────────────────────────────────────────────

pub async fn insert_company<'e>(
    executor: impl PgExecutor<'e>,
    company: &NewCompany<'_>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO companies (id, name, tax_id, industry, size, description, city, email)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(company.name)
    .bind(company.tax_id)
    .bind(company.industry)
    .bind(company.size)
    .bind(company.description)
    .bind(company.city)
    .bind(company.email)
    .execute(executor)
    .await?;
    Ok(id)
}

pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Applications across every job of a company, newest first.
pub async fn list_company_applications(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<ApplicationSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationSummaryRow>(
        r#"
        SELECT a.id AS application_id,
               c.name AS candidate_name,
               j.title AS job_title,
               a.ai_score,
               a.compatibility,
               a.status,
               a.applied_at
        FROM applications a
        JOIN candidates c ON c.id = a.candidate_id
        JOIN jobs j ON j.id = a.job_id
        WHERE j.company_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs and questions
// ────────────────────────────────────────────────────────────────────────────

pub async fn insert_job<'e>(
    executor: impl PgExecutor<'e>,
    job: &NewJob<'_>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO jobs
            (id, company_id, title, description, position, contract_type, modality,
             required_skills, min_experience, max_experience, salary_min, salary_max,
             city, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(id)
    .bind(job.company_id)
    .bind(job.title)
    .bind(job.description)
    .bind(job.position)
    .bind(job.contract_type)
    .bind(job.modality)
    .bind(job.required_skills)
    .bind(job.min_experience)
    .bind(job.max_experience)
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.city)
    .bind(JOB_DRAFT)
    .execute(executor)
    .await?;
    Ok(id)
}

/// Stores a suggested question, unapproved.
pub async fn insert_job_question<'e>(
    executor: impl PgExecutor<'e>,
    job_id: Uuid,
    ordinal: i32,
    question: &QuestionSpec,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO job_questions (id, job_id, ordinal, question, kind, approved) \
         VALUES ($1, $2, $3, $4, $5, FALSE)",
    )
    .bind(id)
    .bind(job_id)
    .bind(ordinal)
    .bind(&question.question)
    .bind(question.kind.as_str())
    .execute(executor)
    .await?;
    Ok(id)
}

/// Returns the number of rows updated; 0 when the question is not part of the job.
pub async fn set_question_approval<'e>(
    executor: impl PgExecutor<'e>,
    job_id: Uuid,
    question_id: Uuid,
    approved: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE job_questions SET approved = $3 WHERE id = $2 AND job_id = $1")
        .bind(job_id)
        .bind(question_id)
        .bind(approved)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn publish_job<'e>(executor: impl PgExecutor<'e>, job_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE jobs SET status = $2, published_at = now() WHERE id = $1")
        .bind(job_id)
        .bind(JOB_PUBLISHED)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_published_jobs(
    pool: &PgPool,
    filters: &JobFilters,
) -> Result<Vec<JobListingRow>, sqlx::Error> {
    sqlx::query_as::<_, JobListingRow>(
        r#"
        SELECT j.id, j.title, c.name AS company_name, j.city, j.salary_min, j.salary_max,
               j.modality, j.required_skills, j.published_at
        FROM jobs j
        JOIN companies c ON c.id = j.company_id
        WHERE j.status = $1
          AND ($2::text IS NULL OR j.city ILIKE $2)
          AND ($3::text IS NULL OR j.title ILIKE $3)
          AND ($4::text IS NULL OR j.modality ILIKE $4)
        ORDER BY j.published_at DESC NULLS LAST
        "#,
    )
    .bind(JOB_PUBLISHED)
    .bind(like_pattern(filters.city.as_deref()))
    .bind(like_pattern(filters.title.as_deref()))
    .bind(like_pattern(filters.modality.as_deref()))
    .fetch_all(pool)
    .await
}

pub async fn approved_questions(
    pool: &PgPool,
    job_id: Uuid,
) -> Result<Vec<JobQuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobQuestionRow>(
        "SELECT * FROM job_questions WHERE job_id = $1 AND approved ORDER BY ordinal",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await
}

/// Questions of `job_id` among `ids`. Ids from other jobs are not returned.
pub async fn job_questions_by_id(
    pool: &PgPool,
    job_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<JobQuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobQuestionRow>(
        "SELECT * FROM job_questions WHERE job_id = $1 AND id = ANY($2)",
    )
    .bind(job_id)
    .bind(ids)
    .fetch_all(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates, documents, applications
// ────────────────────────────────────────────────────────────────────────────

/// The caller picks the id so the résumé can be stored under it first.
pub async fn insert_candidate<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    candidate: &NewCandidate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO candidates
            (id, name, email, phone, city, years_experience, skills, education, summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(candidate.name)
    .bind(candidate.email)
    .bind(candidate.phone)
    .bind(candidate.city)
    .bind(candidate.years_experience)
    .bind(candidate.skills)
    .bind(candidate.education)
    .bind(candidate.summary)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_candidate(pool: &PgPool, id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_document<'e>(
    executor: impl PgExecutor<'e>,
    document: &NewDocument<'_>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO documents
            (id, candidate_id, kind, file_name, url, size_kb, mime_type, extracted_text)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(document.candidate_id)
    .bind(DOCUMENT_RESUME)
    .bind(document.file_name)
    .bind(document.url)
    .bind(document.size_kb)
    .bind(document.mime_type)
    .bind(document.extracted_text)
    .execute(executor)
    .await?;
    Ok(id)
}

/// Extracted text of the candidate's most recent résumé, if any.
pub async fn latest_resume_text(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT extracted_text FROM documents WHERE candidate_id = $1 AND kind = $2 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(candidate_id)
    .bind(DOCUMENT_RESUME)
    .fetch_optional(pool)
    .await
}

pub async fn insert_application<'e>(
    executor: impl PgExecutor<'e>,
    job_id: Uuid,
    candidate_id: Uuid,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO applications (id, job_id, candidate_id, status) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(job_id)
        .bind(candidate_id)
        .bind(APPLICATION_APPLIED)
        .execute(executor)
        .await?;
    Ok(id)
}

pub async fn get_application(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Stores the scores and moves the application to review.
pub async fn record_scores<'e>(
    executor: impl PgExecutor<'e>,
    application_id: Uuid,
    evaluation: &CompatibilityEvaluation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE applications SET ai_score = $2, compatibility = $3, status = $4, updated_at = now() \
         WHERE id = $1",
    )
    .bind(application_id)
    .bind(i16::from(evaluation.score))
    .bind(i16::from(evaluation.compatibility))
    .bind(APPLICATION_IN_REVIEW)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_evaluation<'e>(
    executor: impl PgExecutor<'e>,
    application_id: Uuid,
    evaluation: &CompatibilityEvaluation,
    answers: &[AnswerPair],
    evaluator: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO evaluations
            (id, application_id, score, compatibility, strengths, weaknesses, answers,
             evaluator, decision)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(application_id)
    .bind(i16::from(evaluation.score))
    .bind(i16::from(evaluation.compatibility))
    .bind(&evaluation.strengths)
    .bind(&evaluation.weaknesses)
    .bind(Json(answers))
    .bind(evaluator)
    .bind(DECISION_PENDING_REVIEW)
    .execute(executor)
    .await?;
    Ok(id)
}

pub async fn latest_evaluation(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Option<EvaluationRow>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationRow>(
        "SELECT * FROM evaluations WHERE application_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await
}
