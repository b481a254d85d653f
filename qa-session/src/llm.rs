//! Chat model seam.

use std::{future::Future, pin::Pin};

use ai_llm_service::{AiLlmError, service_profiles::LlmServiceProfiles};

/// Boxed future returned by [`ChatModel::complete`].
pub type ChatFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, AiLlmError>> + Send + 'a>>;

/// A hosted model that turns one prompt into one completion.
///
/// `Ok(None)` means the call succeeded but produced no content.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a>;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a> {
        Box::pin(self.generate(prompt))
    }
}
