//! Prompt building: instruction template, context block, history block.

use rag_index::ScoredPassage;

use crate::error::TemplateError;
use crate::turn::HistoryPair;

/// Placeholders every answer template must contain.
const REQUIRED: [&str; 3] = ["context", "chat_history", "question"];

/// Rephrasing prompt used when follow-up condensing is enabled.
pub const CONDENSE_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

const ALWAYS_ANSWER_POLICY: &str = "If the context does not contain enough information,
still give the best possible answer using your own knowledge.
Never say \"I don't know\". Always try to help.";

const GROUNDED_POLICY: &str = "If the context does not contain enough information,
say that the website does not cover it instead of guessing.";

/// The answer prompt.
///
/// Placeholders: `{context}`, `{chat_history}`, `{question}` (required) and
/// `{site_name}` (optional). `{{` and `}}` stand for literal braces. Filling
/// happens in a single pass, so text coming from passages or the user is
/// never re-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    site_name: String,
}

impl PromptTemplate {
    /// Wraps a custom template.
    ///
    /// An escaped `{{context}}` is literal text and does not count as the
    /// `{context}` placeholder.
    ///
    /// # Errors
    /// [`TemplateError::MissingPlaceholder`] if a required placeholder is absent.
    pub fn new(
        template: impl Into<String>,
        site_name: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let template = template.into();
        let slots: Vec<&str> = pieces(&template)
            .into_iter()
            .filter_map(|p| match p {
                Piece::Slot(name) => Some(name),
                Piece::Text(_) => None,
            })
            .collect();
        if let Some(missing) = REQUIRED.into_iter().find(|name| !slots.contains(name)) {
            return Err(TemplateError::MissingPlaceholder(missing));
        }
        Ok(Self {
            template,
            site_name: site_name.into(),
        })
    }

    /// Built-in template for a site assistant.
    ///
    /// With `always_answer` the model is told never to decline and to fall
    /// back on its own knowledge; without it, it is told to stay within
    /// the website's content.
    pub fn standard(site_name: impl Into<String>, always_answer: bool) -> Self {
        let policy = if always_answer {
            ALWAYS_ANSWER_POLICY
        } else {
            GROUNDED_POLICY
        };
        let template = format!(
            "You are a helpful assistant for {{site_name}}'s website.
Use the provided context to answer the question.
{policy}

Context:
{{context}}

Chat History:
{{chat_history}}

Question: {{question}}

Answer:"
        );
        Self {
            template,
            site_name: site_name.into(),
        }
    }

    /// Produces the final prompt.
    pub fn render(&self, context: &str, chat_history: &str, question: &str) -> String {
        fill(
            &self.template,
            &[
                ("context", context),
                ("chat_history", chat_history),
                ("question", question),
                ("site_name", &self.site_name),
            ],
        )
    }
}

/// Serialises past exchanges as `"\nHuman: q\nAssistant: a"` per pair.
pub fn serialize_history(pairs: &[HistoryPair]) -> String {
    pairs
        .iter()
        .map(|p| format!("\nHuman: {}\nAssistant: {}", p.question, p.answer))
        .collect()
}

/// Joins retrieved passages with a blank line, best first.
pub fn join_context(hits: &[ScoredPassage]) -> String {
    hits.iter()
        .map(|h| h.passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'t> {
    Text(&'t str),
    Slot(&'t str),
}

/// Splits a template into literal text and `{name}` slots.
///
/// `{{` and `}}` become single literal braces. A `{` with no `}` before the
/// next `{` is literal, as is an unpaired `}`.
fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(at) = rest.find(['{', '}']) {
        if at > 0 {
            out.push(Piece::Text(&rest[..at]));
        }
        let tail = &rest[at..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push(Piece::Text(&tail[..1]));
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push(Piece::Text("}"));
            rest = &tail[1..];
            continue;
        }
        let after = &tail[1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                out.push(Piece::Slot(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push(Piece::Text("{"));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}

/// Single-pass `{name}` substitution. Unknown names stay as written.
pub(crate) fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Slot(key) => match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            },
        }
    }
    out
}
