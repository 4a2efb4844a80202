//! In-memory `ChatModel` used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatModel, GenerationParams, LlmError, Turn};

enum Script {
    Reply(String),
    Fail(u16),
}

/// A request as the model saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub history: Vec<Turn>,
    pub input: String,
    pub params: GenerationParams,
}

/// Replays queued replies in order. Once the queue is empty every call fails,
/// unless the model was built with `hanging()`, in which case calls never return.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<RecordedCall>>,
    hang: bool,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    /// A model whose every invocation stalls forever.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    /// A model that fails every call.
    pub fn failing() -> Self {
        Self::new()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Script::Reply(text.into()));
        self
    }

    pub fn fail(self, status: u16) -> Self {
        self.script.lock().unwrap().push_back(Script::Fail(status));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(
        &self,
        system: &str,
        history: &[Turn],
        input: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            history: history.to_vec(),
            input: input.to_string(),
            params,
        });

        if self.hang {
            std::future::pending::<()>().await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Fail(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::Api {
                status: 503,
                message: "model unavailable".to_string(),
            }),
        }
    }
}
