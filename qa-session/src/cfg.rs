use std::time::Duration;

/// Knobs of the answer pipeline that are not part of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Extra attempts after a retryable failure (0 = fail on the first error).
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each further one.
    pub retry_backoff: Duration,
    /// Rephrase follow-ups into standalone questions before retrieval.
    pub condense_question: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
            condense_question: false,
        }
    }
}

impl PipelineConfig {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}
