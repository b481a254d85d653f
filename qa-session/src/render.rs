//! Terminal rendering of turns. Pure: styling is chosen from the role tag only.

use colored::{ColoredString, Colorize};

use crate::turn::{Role, Turn};

const INDENT: &str = "       ";

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Human => "Human",
        Role::Ai => "AI",
    }
}

fn styled_label(role: Role) -> ColoredString {
    let label = format!("{:>5}:", role_label(role));
    match role {
        Role::Human => label.cyan().bold(),
        Role::Ai => label.green().bold(),
    }
}

/// One turn as `"Human: text"`, continuation lines aligned under the text.
pub fn render_turn(turn: &Turn) -> String {
    let mut lines = turn.content.lines();
    let first = lines.next().unwrap_or_default();
    let mut out = format!("{} {}", styled_label(turn.role), first);
    for line in lines {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(line);
    }
    out
}

/// The whole conversation, one rendered turn per block.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(render_turn)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn labels_follow_role() {
        plain();
        assert_eq!(render_turn(&Turn::human("hi")), "Human: hi");
        assert_eq!(render_turn(&Turn::ai("hello")), "   AI: hello");
    }

    #[test]
    fn multiline_answers_are_indented() {
        plain();
        let out = render_turn(&Turn::ai("We offer:\n- web\n- mobile"));
        assert_eq!(out, "   AI: We offer:\n       - web\n       - mobile");
    }

    #[test]
    fn empty_content_renders_label_only() {
        plain();
        assert_eq!(render_turn(&Turn::ai("")), "   AI: ");
    }

    #[test]
    fn transcript_keeps_order() {
        plain();
        let turns = vec![Turn::human("q"), Turn::ai("a")];
        assert_eq!(render_transcript(&turns), "Human: q\n   AI: a");
        assert_eq!(render_transcript(&[]), "");
    }
}
