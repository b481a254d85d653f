//! Conversation layer of the assistant.
//!
//! A [`ChatSession`] owns the ordered turn history. Each submitted question
//! goes through an [`Answerer`] (normally [`RagPipeline`]): retrieve the
//! closest passages, fill the [`PromptTemplate`], ask the chat model. Any
//! upstream failure becomes the fixed [`FALLBACK_ANSWER`]; the session
//! never ends because a backend misbehaved.

mod cfg;
mod error;
mod llm;
mod pipeline;
mod prompt;
mod render;
mod session;
mod turn;

pub use cfg::PipelineConfig;
pub use error::{PipelineError, SessionError, TemplateError};
pub use llm::{ChatFuture, ChatModel};
pub use pipeline::{Answer, AnswerFuture, Answerer, RagPipeline};
pub use prompt::{CONDENSE_TEMPLATE, PromptTemplate, join_context, serialize_history};
pub use render::{render_transcript, render_turn, role_label};
pub use session::{ChatSession, SessionState};
pub use turn::{HistoryPair, Role, Turn, format_history};

/// Text shown when no answer could be produced.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not find an answer.";
