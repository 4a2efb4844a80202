use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::interview::prompts::{
    next_instruction, CLOSING_FALLBACK, FAREWELL_FALLBACK, FINALIZE_INSTRUCTION, FINALIZE_SYSTEM,
    GENERIC_OPENING_QUESTION, NEXT_SYSTEM_TEMPLATE, NO_REMAINING_QUESTIONS, START_INSTRUCTION,
    START_SYSTEM_TEMPLATE,
};
use crate::interview::registry::{SessionLease, SessionRegistry};
use crate::llm_client::outcome::{ModelFailure, Outcome};
use crate::llm_client::prompts::{bullet_list, render};
use crate::llm_client::{invoke_with_timeout, ChatModel, CONVERSATION_PARAMS};

/// Drives the start → next* → finalize interview protocol for each application id.
/// Every phase returns usable text; model failures fall back to fixed wording.
#[derive(Clone)]
pub struct ConversationManager {
    model: Arc<dyn ChatModel>,
    registry: Arc<SessionRegistry>,
    timeout: Duration,
}

impl ConversationManager {
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<SessionRegistry>, timeout: Duration) -> Self {
        Self {
            model,
            registry,
            timeout,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Greets the candidate and asks the first question. Creates the session if absent,
    /// including on the fallback path.
    pub async fn start(
        &self,
        application_id: &str,
        candidate_name: &str,
        job_title: &str,
        questions: &[String],
    ) -> Outcome<String> {
        let mut session = self.registry.acquire(application_id).await;

        let question_list = if questions.is_empty() {
            "(no prepared questions)".to_string()
        } else {
            bullet_list(questions)
        };
        let system = render(
            START_SYSTEM_TEMPLATE,
            &[
                ("candidate_name", candidate_name),
                ("job_title", job_title),
                ("questions", question_list.as_str()),
            ],
        );

        let attempt = self.exchange(&session, &system, START_INSTRUCTION).await;
        let outcome = Outcome::resolve(attempt, "interview start", || {
            fallback_greeting(candidate_name, job_title, questions)
        });
        session.record_exchange(START_INSTRUCTION, outcome.value());

        info!(
            "Interview started for application {application_id} ({} questions)",
            questions.len()
        );
        outcome
    }

    /// Acknowledges `previous_answer` and asks the next remaining question,
    /// or closes the interview when none remain.
    pub async fn next(
        &self,
        application_id: &str,
        previous_answer: &str,
        remaining_questions: &[String],
    ) -> Outcome<String> {
        let mut session = self.registry.acquire(application_id).await;

        let remaining = if remaining_questions.is_empty() {
            NO_REMAINING_QUESTIONS.to_string()
        } else {
            bullet_list(remaining_questions)
        };
        let system = render(NEXT_SYSTEM_TEMPLATE, &[("remaining", remaining.as_str())]);
        let instruction = next_instruction(previous_answer, !remaining_questions.is_empty());

        let attempt = self.exchange(&session, &system, &instruction).await;
        let outcome = Outcome::resolve(attempt, "interview next", || {
            fallback_next(remaining_questions)
        });
        session.record_exchange(&instruction, outcome.value());
        outcome
    }

    /// Produces a farewell and retires the session, whether or not the model answered.
    pub async fn finalize(&self, application_id: &str) -> Outcome<String> {
        let session = self.registry.acquire(application_id).await;

        let attempt = self
            .exchange(&session, FINALIZE_SYSTEM, FINALIZE_INSTRUCTION)
            .await;
        self.registry.retire(session);

        info!("Interview finalized for application {application_id}");
        Outcome::resolve(attempt, "interview finalize", || {
            FAREWELL_FALLBACK.to_string()
        })
    }

    /// Drops a session without a farewell. Unknown ids are ignored.
    pub async fn clear(&self, application_id: &str) {
        if self.registry.clear(application_id).await {
            info!("Interview session cleared for application {application_id}");
        }
    }

    /// One bounded model call with the session history as context.
    async fn exchange(
        &self,
        session: &SessionLease,
        system: &str,
        instruction: &str,
    ) -> Result<String, ModelFailure> {
        debug!(
            "Model exchange for application {} ({} turns of history)",
            session.id(),
            session.turns().len()
        );
        let reply = invoke_with_timeout(
            self.model.as_ref(),
            self.timeout,
            system,
            session.turns(),
            instruction,
            CONVERSATION_PARAMS,
        )
        .await?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ModelFailure::Rejected("empty reply".to_string()));
        }
        Ok(reply.to_string())
    }
}

fn fallback_greeting(candidate_name: &str, job_title: &str, questions: &[String]) -> String {
    let first = questions
        .first()
        .map(String::as_str)
        .unwrap_or(GENERIC_OPENING_QUESTION);
    format!(
        "Hi {candidate_name}! Thanks for your interest in {job_title}. \
         Let's start with a few questions. {first}"
    )
}

fn fallback_next(remaining_questions: &[String]) -> String {
    match remaining_questions.first() {
        Some(question) => format!("Thanks for your answer. {question}"),
        None => CLOSING_FALLBACK.to_string(),
    }
}
