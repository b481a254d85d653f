//! Turns and the (question, answer) view the pipeline consumes.

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Human,
    Ai,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// One past exchange, recomputed from the turns on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPair {
    pub question: String,
    pub answer: String,
}

/// Pairs turns two at a time from index 0: `(turn[i], turn[i + 1])`.
///
/// An unanswered trailing turn is padded with an empty answer rather than
/// rejected.
pub fn format_history(turns: &[Turn]) -> Vec<HistoryPair> {
    turns
        .chunks(2)
        .map(|pair| HistoryPair {
            question: pair[0].content.clone(),
            answer: pair.get(1).map(|t| t.content.clone()).unwrap_or_default(),
        })
        .collect()
}
