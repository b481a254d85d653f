//! Session state machine: `Idle -> AwaitingAnswer -> Idle` per question.

use std::sync::Arc;

use tracing::{info, warn};

use crate::FALLBACK_ANSWER;
use crate::error::SessionError;
use crate::pipeline::Answerer;
use crate::turn::{Turn, format_history};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingAnswer,
}

/// One user's conversation. Turns are append-only and alternate
/// Human, AI; after every completed `submit` their count is even.
pub struct ChatSession {
    pipeline: Arc<dyn Answerer>,
    turns: Vec<Turn>,
    state: SessionState,
}

impl ChatSession {
    pub fn new(pipeline: Arc<dyn Answerer>) -> Self {
        Self {
            pipeline,
            turns: Vec::new(),
            state: SessionState::Idle,
        }
    }

    /// Asks a question and waits for the answer.
    ///
    /// Pipeline failures never escape: they are logged and answered with
    /// [`FALLBACK_ANSWER`]. Returns the AI turn that was appended.
    ///
    /// # Errors
    /// - [`SessionError::EmptyQuestion`] for blank input; nothing is recorded.
    /// - [`SessionError::AnswerPending`] if an earlier `submit` was dropped
    ///   before it finished, leaving its question unanswered.
    pub async fn submit(&mut self, question: &str) -> Result<&Turn, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AnswerPending);
        }
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let history = format_history(&self.turns);
        self.turns.push(Turn::human(question));
        self.state = SessionState::AwaitingAnswer;

        let answer = match self.pipeline.answer(question, &history).await {
            Ok(answer) => {
                info!(turn = self.turns.len(), sources = ?answer.sources, "question answered");
                answer.text
            }
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "answer pipeline failed");
                FALLBACK_ANSWER.to_string()
            }
        };

        self.turns.push(Turn::ai(answer));
        self.state = SessionState::Idle;
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Full ordered turn history.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}
