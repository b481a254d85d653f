//! Builds the process-scoped state: dataset, index, pipeline, session.
//!
//! Everything is created once here and handed down explicitly; nothing is
//! cached in globals.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use ai_llm_service::config::env_source::EnvSource;
use ai_llm_service::service_profiles::LlmServiceProfiles;
use colored::Colorize;
use qa_session::{ChatModel, ChatSession, PromptTemplate, RagPipeline};
use rag_index::{Document, Embedder, LlmEmbedder, Retriever, build_index, load_dataset};
use tokio::io::AsyncBufRead;
use tracing::info;

use crate::config::{self, AppConfig};
use crate::error_handler::StartupError;
use crate::shell;

/// Checks the credential, reads configuration, builds the session and runs
/// the shell over `input`.
///
/// The credential check comes first: without it nothing is written to `out`
/// and no file, client or index is touched.
///
/// # Errors
/// Any configuration or startup failure, or terminal I/O errors.
pub async fn run_with<R, W>(env: &dyn EnvSource, input: R, out: &mut W) -> Result<(), StartupError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    config::check_credential(env)?;
    let cfg = AppConfig::from_env(env)?;

    shell::print_banner(out, &cfg.site_name)?;
    writeln!(out, "Loading website data and embeddings...")?;

    let mut session = build_session(&cfg).await?;
    writeln!(out, "{}", "Ready to chat!".green())?;

    shell::run(&mut session, input, out).await
}

/// Loads the dataset, connects the model clients and builds a ready session.
///
/// # Errors
/// Any dataset, client, index or template problem.
pub async fn build_session(cfg: &AppConfig) -> Result<ChatSession, StartupError> {
    let docs = load_dataset(&cfg.dataset_path)?;

    let svc = Arc::new(LlmServiceProfiles::new(
        cfg.chat.clone(),
        cfg.embedding.clone(),
    )?);
    info!(
        chat_model = %cfg.chat.model,
        embedding_model = %cfg.embedding.model,
        "model clients ready"
    );

    let embedder: Arc<dyn Embedder> = Arc::new(LlmEmbedder::new(svc.clone()));
    assemble(cfg, &docs, embedder, svc).await
}

/// Indexes `docs` and wires the pipeline around the given backends.
pub(crate) async fn assemble(
    cfg: &AppConfig,
    docs: &[Document],
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
) -> Result<ChatSession, StartupError> {
    let template = load_template(cfg)?;
    let index = build_index(
        docs,
        &cfg.chunking,
        embedder.as_ref(),
        cfg.embedding_batch_size,
    )
    .await?;
    let retriever = Retriever::new(embedder, Arc::new(index), cfg.top_k)?;
    let pipeline = RagPipeline::new(retriever, model, template, cfg.pipeline.clone());
    Ok(ChatSession::new(Arc::new(pipeline)))
}

/// The built-in template, or the one from `PROMPT_TEMPLATE_FILE`.
fn load_template(cfg: &AppConfig) -> Result<PromptTemplate, StartupError> {
    match &cfg.template_file {
        None => Ok(PromptTemplate::standard(&cfg.site_name, cfg.always_answer)),
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| StartupError::TemplateFile {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "using custom prompt template");
            Ok(PromptTemplate::new(raw, &cfg.site_name)?)
        }
    }
}
