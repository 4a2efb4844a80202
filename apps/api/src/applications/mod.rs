// Candidate workflows.
//
// Applying: extract résumé text → analyze_resume → upload résumé → candidate, document
// and application rows in one transaction, then hand back the job's approved questions.
// Answering: evaluate_compatibility → scores + evaluation rows → confirmation email.
// Model and mail failures never fail either request.

pub mod handlers;

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{resume_key, DocumentStore, StorageError};
use crate::errors::AppError;
use crate::evaluation::compatibility::{AnswerPair, CompatibilityRequest};
use crate::evaluation::truncate_chars;
use crate::llm_client::MODEL;
use crate::models::application::{ApplicationRow, CandidateRow, EvaluationRow};
use crate::notify::{ConfirmationEmail, Delivery};
use crate::records::{self, NewCandidate, NewDocument};
use crate::state::AppState;
use crate::validation::{check_email, check_length, check_range};

/// Uploads larger than this are rejected.
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;
/// Characters of extracted résumé text kept on the document row.
pub const STORED_TEXT_CHAR_LIMIT: usize = 5000;
pub const RESUME_FIELD: &str = "resume";
pub const FALLBACK_EVALUATOR: &str = "fallback";
const DEFAULT_COMPANY_NAME: &str = "The company";

// ────────────────────────────────────────────────────────────────────────────
// Applying
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ApplyForm {
    pub job_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub years_experience: i32,
    pub resume: UploadedFile,
}

impl ApplyForm {
    /// Builds and validates the form from multipart text fields plus the résumé part.
    pub fn from_parts(
        mut fields: HashMap<String, String>,
        resume: Option<UploadedFile>,
    ) -> Result<Self, AppError> {
        let mut take = |key: &str| {
            fields
                .remove(key)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| AppError::Validation(format!("{key} is required")))
        };

        let job_id = take("job_id")?
            .parse::<Uuid>()
            .map_err(|_| AppError::Validation("job_id must be a UUID".to_string()))?;
        let name = take("name")?;
        let email = take("email")?;
        let phone = take("phone")?;
        let city = take("city")?;
        let years_experience = take("years_experience")?
            .parse::<i32>()
            .map_err(|_| AppError::Validation("years_experience must be an integer".to_string()))?;
        let resume = resume
            .ok_or_else(|| AppError::Validation(format!("{RESUME_FIELD} file is required")))?;

        let form = ApplyForm {
            job_id,
            name,
            email,
            phone,
            city,
            years_experience,
            resume,
        };
        form.validate()?;
        Ok(form)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        check_length("name", &self.name, 2, 100)?;
        check_email("email", &self.email)?;
        check_length("phone", &self.phone, 1, 20)?;
        check_length("city", &self.city, 1, 100)?;
        check_range("years_experience", self.years_experience, 0, 50)?;

        let bytes = &self.resume.bytes;
        if bytes.is_empty() {
            return Err(AppError::Validation("resume file is empty".to_string()));
        }
        if bytes.len() > MAX_RESUME_BYTES {
            return Err(AppError::Validation(format!(
                "resume must be at most {} MB",
                MAX_RESUME_BYTES / (1024 * 1024)
            )));
        }
        if !bytes.starts_with(b"%PDF-") {
            return Err(AppError::UnprocessableEntity(
                "resume must be a PDF document".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub question_id: Uuid,
    pub question: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub candidate_id: Uuid,
    pub application_id: Uuid,
    pub questions: Vec<QuestionView>,
}

/// Uploads the résumé under the candidate's key and returns its URL.
async fn store_resume(
    documents: &dyn DocumentStore,
    candidate_id: Uuid,
    resume: &UploadedFile,
) -> Result<String, StorageError> {
    let key = resume_key(candidate_id, &resume.file_name);
    documents
        .upload(&key, resume.bytes.clone(), &resume.content_type)
        .await
}

pub async fn apply(state: &AppState, form: ApplyForm) -> Result<ApplyResponse, AppError> {
    let job = records::get_job(&state.db, form.job_id)
        .await?
        .filter(|job| job.is_published())
        .ok_or_else(|| {
            AppError::NotFound(format!("Job {} not found or not published", form.job_id))
        })?;

    // Unreadable résumés still produce an application; analysis falls back to its sentinel.
    let resume_text = match state.extractor.extract(form.resume.bytes.clone()).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Résumé text extraction failed for job {}: {e}", job.id);
            String::new()
        }
    };
    let analysis = state.evaluator.analyze_resume(&resume_text).await;
    if let Some(reason) = analysis.fallback_reason() {
        warn!("Résumé analysis for job {} used the sentinel: {reason}", job.id);
    }
    let analysis = analysis.into_value();

    // The upload happens before the transaction so no pooled connection waits on S3.
    let candidate_id = Uuid::new_v4();
    let url = store_resume(state.documents.as_ref(), candidate_id, &form.resume).await?;

    let mut tx = state.db.begin().await?;
    records::insert_candidate(
        &mut *tx,
        candidate_id,
        &NewCandidate {
            name: &form.name,
            email: &form.email,
            phone: &form.phone,
            city: &form.city,
            years_experience: form.years_experience,
            skills: &analysis.skills,
            education: analysis.education.as_deref(),
            summary: &analysis.summary,
        },
    )
    .await?;

    records::insert_document(
        &mut *tx,
        &NewDocument {
            candidate_id,
            file_name: &form.resume.file_name,
            url: &url,
            size_kb: i32::try_from(form.resume.bytes.len() / 1024).unwrap_or(i32::MAX),
            mime_type: &form.resume.content_type,
            extracted_text: truncate_chars(&resume_text, STORED_TEXT_CHAR_LIMIT),
        },
    )
    .await?;

    let application_id = records::insert_application(&mut *tx, job.id, candidate_id).await?;
    tx.commit().await?;

    info!("Application {application_id} created for job {}", job.id);

    let questions = records::approved_questions(&state.db, job.id)
        .await?
        .into_iter()
        .map(|q| QuestionView {
            question_id: q.id,
            question: q.question,
            kind: q.kind,
        })
        .collect();

    Ok(ApplyResponse {
        candidate_id,
        application_id,
        questions,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Answering
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswersResponse {
    pub message: String,
    pub score: u8,
    pub compatibility: u8,
    pub email_sent: bool,
}

/// Pairs each answer with its question text, in the order submitted.
/// Every answered question must belong to the job.
fn pair_answers(
    answers: &[AnswerInput],
    question_texts: &HashMap<Uuid, String>,
) -> Result<Vec<AnswerPair>, AppError> {
    answers
        .iter()
        .map(|input| {
            let question = question_texts.get(&input.question_id).ok_or_else(|| {
                AppError::Validation(format!(
                    "Question {} does not belong to this job",
                    input.question_id
                ))
            })?;
            Ok(AnswerPair {
                question: question.clone(),
                answer: input.answer.trim().to_string(),
            })
        })
        .collect()
}

pub async fn submit_answers(
    state: &AppState,
    application_id: Uuid,
    request: &SubmitAnswersRequest,
) -> Result<SubmitAnswersResponse, AppError> {
    let application = records::get_application(&state.db, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    let candidate = records::get_candidate(&state.db, application.candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Candidate {} not found", application.candidate_id))
        })?;
    let job = records::get_job(&state.db, application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;

    let question_ids: Vec<Uuid> = request.answers.iter().map(|a| a.question_id).collect();
    let question_texts: HashMap<Uuid, String> =
        records::job_questions_by_id(&state.db, job.id, &question_ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q.question))
            .collect();
    let answers = pair_answers(&request.answers, &question_texts)?;

    let resume_text = records::latest_resume_text(&state.db, candidate.id)
        .await?
        .unwrap_or_default();

    let outcome = state
        .evaluator
        .evaluate_compatibility(&CompatibilityRequest {
            resume_text: &resume_text,
            answers: &answers,
            title: &job.title,
            required_skills: &job.required_skills,
            min_experience: job.min_experience_years(),
        })
        .await;
    let evaluator = match outcome.fallback_reason() {
        Some(reason) => {
            warn!("Application {application_id} received the neutral evaluation: {reason}");
            FALLBACK_EVALUATOR
        }
        None => MODEL,
    };
    let evaluation = outcome.into_value();

    let mut tx = state.db.begin().await?;
    records::record_scores(&mut *tx, application_id, &evaluation).await?;
    records::insert_evaluation(&mut *tx, application_id, &evaluation, &answers, evaluator).await?;
    tx.commit().await?;

    info!(
        "Application {application_id} scored {} (compatibility {})",
        evaluation.score, evaluation.compatibility
    );

    let company_name = records::get_company(&state.db, job.company_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string());

    let email = ConfirmationEmail {
        to: candidate.email.clone(),
        candidate_name: candidate.name.clone(),
        job_title: job.title.clone(),
        company_name,
        score: evaluation.score,
    };
    let email_sent = match state.notifier.send_application_confirmation(&email).await {
        Ok(Delivery::Sent) => true,
        Ok(Delivery::Skipped) => false,
        Err(e) => {
            warn!("Confirmation email for application {application_id} failed: {e}");
            false
        }
    };

    Ok(SubmitAnswersResponse {
        message: "Application submitted".to_string(),
        score: evaluation.score,
        compatibility: evaluation.compatibility,
        email_sent,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Detail
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
    pub job_title: String,
    pub evaluation: Option<EvaluationRow>,
}

pub async fn application_detail(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<ApplicationDetailResponse, AppError> {
    let application = records::get_application(pool, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
    let candidate = records::get_candidate(pool, application.candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Candidate {} not found", application.candidate_id))
        })?;
    let job = records::get_job(pool, application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;
    let evaluation = records::latest_evaluation(pool, application_id).await?;

    Ok(ApplicationDetailResponse {
        application,
        candidate,
        job_title: job.title,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_fields() -> HashMap<String, String> {
        [
            ("job_id", Uuid::nil().to_string()),
            ("name", " Ana ".to_string()),
            ("email", "ana@example.com".to_string()),
            ("phone", "+57 300 000 0000".to_string()),
            ("city", "Cali".to_string()),
            ("years_experience", "5".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn pdf() -> UploadedFile {
        UploadedFile {
            file_name: "cv.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7\n..."),
        }
    }

    #[test]
    fn test_form_from_parts() {
        let form = ApplyForm::from_parts(form_fields(), Some(pdf())).unwrap();
        assert_eq!(form.job_id, Uuid::nil());
        assert_eq!(form.name, "Ana");
        assert_eq!(form.years_experience, 5);
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut fields = form_fields();
        fields.remove("phone");
        let err = ApplyForm::from_parts(fields, Some(pdf())).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: phone is required");
    }

    #[test]
    fn test_missing_resume_is_rejected() {
        assert!(matches!(
            ApplyForm::from_parts(form_fields(), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let mut fields = form_fields();
        fields.insert("years_experience".to_string(), "five".to_string());
        assert!(ApplyForm::from_parts(fields, Some(pdf())).is_err());

        let mut fields = form_fields();
        fields.insert("years_experience".to_string(), "51".to_string());
        assert!(ApplyForm::from_parts(fields, Some(pdf())).is_err());

        let mut fields = form_fields();
        fields.insert("job_id".to_string(), "42".to_string());
        assert!(ApplyForm::from_parts(fields, Some(pdf())).is_err());
    }

    #[test]
    fn test_non_pdf_resume_is_unprocessable() {
        let mut resume = pdf();
        resume.bytes = Bytes::from_static(b"PK\x03\x04 docx");
        assert!(matches!(
            ApplyForm::from_parts(form_fields(), Some(resume)),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    /// Records every upload; fails them all when `fail` is set.
    #[derive(Default)]
    struct RecordingStore {
        fail: bool,
        keys: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl DocumentStore for RecordingStore {
        async fn upload(
            &self,
            key: &str,
            _body: Bytes,
            content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail {
                return Err(StorageError::Upload {
                    key: key.to_string(),
                    message: "bucket unreachable".to_string(),
                });
            }
            self.keys
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string()));
            Ok(format!("http://files.test/{key}"))
        }
    }

    #[tokio::test]
    async fn test_store_resume_uses_candidate_key() {
        let store = RecordingStore::default();
        let candidate_id = Uuid::new_v4();

        let url = store_resume(&store, candidate_id, &pdf()).await.unwrap();

        let keys = store.keys.lock().unwrap();
        assert_eq!(keys.len(), 1);
        let (key, content_type) = &keys[0];
        assert!(key.starts_with(&format!("cvs/{candidate_id}_")));
        assert!(key.ends_with(".pdf"));
        assert_eq!(content_type, "application/pdf");
        assert_eq!(url, format!("http://files.test/{key}"));
    }

    #[tokio::test]
    async fn test_store_resume_failure_is_a_storage_error() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let err = store_resume(&store, Uuid::new_v4(), &pdf()).await.unwrap_err();
        assert!(matches!(
            AppError::from(err),
            AppError::Storage(StorageError::Upload { .. })
        ));
    }

    #[test]
    fn test_pair_answers_keeps_order_and_trims() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let texts = HashMap::from([
            (q1, "Years with Rust?".to_string()),
            (q2, "Remote OK?".to_string()),
        ]);
        let answers = vec![
            AnswerInput {
                question_id: q2,
                answer: " yes ".to_string(),
            },
            AnswerInput {
                question_id: q1,
                answer: "4".to_string(),
            },
        ];

        let pairs = pair_answers(&answers, &texts).unwrap();
        assert_eq!(pairs[0].question, "Remote OK?");
        assert_eq!(pairs[0].answer, "yes");
        assert_eq!(pairs[1].question, "Years with Rust?");
    }

    #[test]
    fn test_pair_answers_rejects_foreign_question() {
        let answers = vec![AnswerInput {
            question_id: Uuid::new_v4(),
            answer: "yes".to_string(),
        }];
        assert!(pair_answers(&answers, &HashMap::new()).is_err());
    }
}
