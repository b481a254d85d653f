//! Retrieval-augmented answer pipeline.
//!
//! One run: optionally condense a follow-up into a standalone question,
//! retrieve the closest passages, render the prompt, ask the chat model.
//! Backend failures are retried per [`PipelineConfig`]; what still fails is
//! returned to the caller, which decides how to present it.

use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use rag_index::Retriever;
use tracing::{debug, info, warn};

use crate::FALLBACK_ANSWER;
use crate::cfg::PipelineConfig;
use crate::error::PipelineError;
use crate::llm::ChatModel;
use crate::prompt::{CONDENSE_TEMPLATE, PromptTemplate, fill, join_context, serialize_history};
use crate::turn::HistoryPair;

/// A produced answer and the pages it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Distinct source pages of the retrieved passages, best match first.
    pub sources: Vec<String>,
}

/// Boxed future returned by [`Answerer::answer`].
pub type AnswerFuture<'a> = Pin<Box<dyn Future<Output = Result<Answer, PipelineError>> + Send + 'a>>;

/// Anything that can answer a question given the previous exchanges.
pub trait Answerer: Send + Sync {
    fn answer<'a>(&'a self, question: &'a str, history: &'a [HistoryPair]) -> AnswerFuture<'a>;
}

/// The standard [`Answerer`]: retriever + prompt template + chat model.
pub struct RagPipeline {
    retriever: Retriever,
    model: Arc<dyn ChatModel>,
    template: PromptTemplate,
    cfg: PipelineConfig,
}

impl RagPipeline {
    pub fn new(
        retriever: Retriever,
        model: Arc<dyn ChatModel>,
        template: PromptTemplate,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            retriever,
            model,
            template,
            cfg,
        }
    }

    /// Runs the pipeline once.
    ///
    /// # Errors
    /// The last [`PipelineError`] after retries are exhausted.
    pub async fn run(&self, question: &str, history: &[HistoryPair]) -> Result<Answer, PipelineError> {
        let started = Instant::now();
        let chat_history = serialize_history(history);

        let question = if self.cfg.condense_question && !history.is_empty() {
            self.condense(question, &chat_history).await?
        } else {
            question.to_string()
        };

        let query = question.as_str();
        let hits = with_retry(&self.cfg, "retrieve", || async move {
            self.retriever
                .retrieve(query)
                .await
                .map_err(PipelineError::from)
        })
        .await?;

        let prompt = self
            .template
            .render(&join_context(&hits), &chat_history, &question);
        debug!(prompt_len = prompt.len(), hits = hits.len(), "prompt rendered");

        let prompt = prompt.as_str();
        let completion = with_retry(&self.cfg, "complete", || async move {
            self.model.complete(prompt).await.map_err(PipelineError::from)
        })
        .await?;

        let text = match completion {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!("chat model returned no content");
                FALLBACK_ANSWER.to_string()
            }
        };

        let mut sources: Vec<String> = Vec::with_capacity(hits.len());
        for hit in &hits {
            if !sources.contains(&hit.passage.page) {
                sources.push(hit.passage.page.clone());
            }
        }

        info!(
            history_pairs = history.len(),
            hits = hits.len(),
            answer_len = text.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "answer produced"
        );
        Ok(Answer { text, sources })
    }

    /// Rewrites a follow-up into a standalone question.
    ///
    /// An empty rephrasing keeps the question as asked.
    async fn condense(&self, question: &str, chat_history: &str) -> Result<String, PipelineError> {
        let prompt = fill(
            CONDENSE_TEMPLATE,
            &[("chat_history", chat_history), ("question", question)],
        );
        let prompt = prompt.as_str();
        let rephrased = with_retry(&self.cfg, "condense", || async move {
            self.model.complete(prompt).await.map_err(PipelineError::from)
        })
        .await?;

        Ok(match rephrased {
            Some(text) if !text.trim().is_empty() => {
                let standalone = text.trim().to_string();
                debug!(standalone_len = standalone.len(), "question condensed");
                standalone
            }
            _ => question.to_string(),
        })
    }
}

impl Answerer for RagPipeline {
    fn answer<'a>(&'a self, question: &'a str, history: &'a [HistoryPair]) -> AnswerFuture<'a> {
        Box::pin(self.run(question, history))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent.
async fn with_retry<T, F, Fut>(cfg: &PipelineConfig, stage: &'static str, mut op: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt < cfg.max_retries => {
                attempt += 1;
                let delay = cfg.backoff_for(attempt);
                warn!(
                    stage,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{HttpError, Provider, ProviderError, ProviderErrorKind};
    use rag_index::{EmbedFuture, Embedder, Embedding, MemoryIndex, Passage, RagError};
    use reqwest::StatusCode;

    use super::*;
    use crate::llm::ChatFuture;

    /// Two-dimensional "topic" embedding: services vs. contact.
    struct TopicEmbedder {
        fail_first: AtomicU32,
        calls: AtomicU32,
        queries: Mutex<Vec<String>>,
    }

    impl TopicEmbedder {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first: AtomicU32::new(fail_first),
                calls: AtomicU32::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn vector(text: &str) -> Embedding {
            let t = text.to_lowercase();
            vec![
                if t.contains("service") { 1.0 } else { 0.1 },
                if t.contains("contact") { 1.0 } else { 0.1 },
            ]
        }
    }

    impl Embedder for TopicEmbedder {
        fn embed_documents<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Embedding>> {
            Box::pin(async move { Ok(texts.iter().map(|t| Self::vector(t)).collect()) })
        }

        fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Embedding> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.queries.lock().unwrap().push(text.to_string());
                if self
                    .fail_first
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return Err(RagError::Embedding(AiLlmError::Timeout(Duration::from_secs(1))));
                }
                Ok(Self::vector(text))
            })
        }
    }

    /// Records prompts; replies with a fixed completion after `fail_first` timeouts.
    struct ScriptedModel {
        reply: Option<String>,
        fail_first: AtomicU32,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn replying(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                fail_first: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(prompt.to_string());
                if self
                    .fail_first
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return Err(AiLlmError::Timeout(Duration::from_secs(1)));
                }
                if prompt.ends_with("Standalone question:") {
                    return Ok(Some("What services does the company offer?".to_string()));
                }
                Ok(self.reply.clone())
            })
        }
    }

    fn passage(page: &str, i: usize, text: &str) -> Passage {
        Passage {
            id: format!("{page}#{i}"),
            page: page.into(),
            url: format!("https://example.com/{page}"),
            offset: 0,
            text: text.into(),
        }
    }

    fn pipeline(
        embedder: Arc<TopicEmbedder>,
        model: Arc<ScriptedModel>,
        cfg: PipelineConfig,
    ) -> RagPipeline {
        let passages = vec![
            passage("services", 0, "We build web and mobile services."),
            passage("services", 1, "Our services include cloud consulting."),
            passage("contact", 0, "Contact us at the office."),
        ];
        let vectors = passages.iter().map(|p| TopicEmbedder::vector(&p.text)).collect();
        let mut index = MemoryIndex::new();
        index.insert(passages, vectors).unwrap();
        let retriever = Retriever::new(embedder, Arc::new(index), 2).unwrap();
        RagPipeline::new(
            retriever,
            model,
            PromptTemplate::standard("AT Digital", true),
            cfg,
        )
    }

    fn no_wait(max_retries: u32) -> PipelineConfig {
        PipelineConfig {
            max_retries,
            retry_backoff: Duration::ZERO,
            condense_question: false,
        }
    }

    #[tokio::test]
    async fn answer_is_grounded_in_retrieved_passages() {
        let model = Arc::new(ScriptedModel::replying(Some("We offer web services.")));
        let p = pipeline(Arc::new(TopicEmbedder::new(0)), model.clone(), no_wait(0));
        let history = vec![HistoryPair {
            question: "Hi".into(),
            answer: "Hello!".into(),
        }];

        let answer = p.run("What services do you offer?", &history).await.unwrap();
        assert_eq!(answer.text, "We offer web services.");
        assert_eq!(answer.sources, vec!["services".to_string()]);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("AT Digital's website"));
        assert!(prompt.contains("We build web and mobile services.\n\nOur services include cloud consulting."));
        assert!(prompt.contains("Chat History:\n\nHuman: Hi\nAssistant: Hello!"));
        assert!(prompt.contains("Question: What services do you offer?"));
    }

    #[tokio::test]
    async fn empty_completion_becomes_fallback() {
        for reply in [None, Some("   ")] {
            let model = Arc::new(ScriptedModel::replying(reply));
            let p = pipeline(Arc::new(TopicEmbedder::new(0)), model, no_wait(0));
            let answer = p.run("contact?", &[]).await.unwrap();
            assert_eq!(answer.text, FALLBACK_ANSWER);
        }
    }

    #[tokio::test]
    async fn upstream_failures_are_retried() {
        let embedder = Arc::new(TopicEmbedder::new(1));
        let model = Arc::new(ScriptedModel::replying(Some("ok")));
        model.fail_first.store(2, Ordering::SeqCst);
        let p = pipeline(embedder.clone(), model.clone(), no_wait(2));

        let answer = p.run("services", &[]).await.unwrap();
        assert_eq!(answer.text, "ok");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn without_retries_the_first_failure_is_returned() {
        let model = Arc::new(ScriptedModel::replying(Some("ok")));
        model.fail_first.store(1, Ordering::SeqCst);
        let p = pipeline(Arc::new(TopicEmbedder::new(0)), model.clone(), no_wait(0));

        let err = p.run("services", &[]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(AiLlmError::Timeout(_))));
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_back_off_exponentially() {
        let model = Arc::new(ScriptedModel::replying(Some("ok")));
        model.fail_first.store(2, Ordering::SeqCst);
        let cfg = PipelineConfig {
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            condense_question: false,
        };
        let p = pipeline(Arc::new(TopicEmbedder::new(0)), model, cfg);

        let start = tokio::time::Instant::now();
        p.run("services", &[]).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn local_errors_are_not_retried() {
        let err = PipelineError::Retrieval(RagError::VectorSizeMismatch { got: 3, want: 2 });
        assert!(!err.is_retryable());

        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res: Result<(), _> = with_retry(&no_wait(5), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PipelineError::Retrieval(RagError::InvalidConfig("bad".into())))
        })
        .await;
        assert!(res.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    fn rejected(code: u16) -> PipelineError {
        PipelineError::Llm(
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::HttpStatus(HttpError {
                    status: StatusCode::from_u16(code).unwrap(),
                    url: "https://api.openai.com/v1/chat/completions".into(),
                    snippet: "{\"error\":\"...\"}".into(),
                }),
            )
            .into(),
        )
    }

    #[tokio::test]
    async fn client_errors_are_tried_once() {
        for code in [400, 401, 403, 404] {
            let counter = AtomicU32::new(0);
            let calls = &counter;
            let res: Result<(), _> = with_retry(&no_wait(3), "complete", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rejected(code))
            })
            .await;
            assert!(!res.unwrap_err().is_retryable(), "{code}");
            assert_eq!(counter.load(Ordering::SeqCst), 1, "{code}");
        }
    }

    #[tokio::test]
    async fn rate_limits_and_server_errors_are_retried() {
        for code in [429, 503] {
            let counter = AtomicU32::new(0);
            let calls = &counter;
            let res = with_retry(&no_wait(2), "complete", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(rejected(code))
                } else {
                    Ok("answer")
                }
            })
            .await;
            assert_eq!(res.unwrap(), "answer", "{code}");
            assert_eq!(counter.load(Ordering::SeqCst), 2, "{code}");
        }
    }

    #[tokio::test]
    async fn follow_ups_are_condensed_before_retrieval() {
        let embedder = Arc::new(TopicEmbedder::new(0));
        let model = Arc::new(ScriptedModel::replying(Some("Web and cloud.")));
        let cfg = PipelineConfig {
            condense_question: true,
            ..no_wait(0)
        };
        let p = pipeline(embedder.clone(), model.clone(), cfg);
        let history = vec![HistoryPair {
            question: "Tell me about the company".into(),
            answer: "It is a digital agency.".into(),
        }];

        let answer = p.run("And what do they offer?", &history).await.unwrap();
        assert_eq!(answer.text, "Web and cloud.");
        assert_eq!(
            embedder.queries.lock().unwrap().as_slice(),
            ["What services does the company offer?"]
        );
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Follow Up Input: And what do they offer?"));
        assert!(prompts[1].contains("Question: What services does the company offer?"));
    }

    #[tokio::test]
    async fn condense_failure_is_an_upstream_error() {
        let model = Arc::new(ScriptedModel::replying(Some("ok")));
        model.fail_first.store(1, Ordering::SeqCst);
        let cfg = PipelineConfig {
            condense_question: true,
            ..no_wait(0)
        };
        let p = pipeline(Arc::new(TopicEmbedder::new(0)), model, cfg);
        let history = vec![HistoryPair {
            question: "q".into(),
            answer: "a".into(),
        }];
        let err = p.run("and then?", &history).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn first_question_is_never_condensed() {
        let model = Arc::new(ScriptedModel::replying(Some("ok")));
        let cfg = PipelineConfig {
            condense_question: true,
            ..no_wait(0)
        };
        let p = pipeline(Arc::new(TopicEmbedder::new(0)), model.clone(), cfg);
        p.run("services?", &[]).await.unwrap();
        assert_eq!(model.prompts().len(), 1);
    }
}
