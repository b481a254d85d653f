/// Represents the provider (backend) used for chat or embedding calls.
///
/// Chat always goes to an OpenAI-compatible API; embeddings may also be
/// produced locally by an Ollama server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI (or any server exposing the same REST surface).
    OpenAI,
}

impl LlmProvider {
    /// Parses the value of `EMBEDDING_KIND` (case-insensitive).
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Some(LlmProvider::OpenAI),
            "ollama" => Some(LlmProvider::Ollama),
            _ => None,
        }
    }
}
