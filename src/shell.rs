//! Terminal chat loop.

use std::io::Write;

use colored::Colorize;
use qa_session::{ChatSession, SessionError, render_transcript, render_turn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::error_handler::StartupError;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    History,
    Quit,
    Skip,
}

fn parse_line(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Skip,
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        _ => Command::Ask(line.trim_end_matches(['\r', '\n'])),
    }
}

pub fn print_banner(out: &mut impl Write, site_name: &str) -> std::io::Result<()> {
    writeln!(out, "{}", format!("Ask {site_name} Chatbot").bold())?;
    writeln!(
        out,
        "{}",
        format!(
            "About: answers questions about {site_name} using the content of its website."
        )
        .dimmed()
    )?;
    writeln!(
        out,
        "{}",
        "Type a question and press Enter. /history shows the conversation, /quit exits."
            .dimmed()
    )
}

/// Reads questions line by line until `/quit` or end of input.
///
/// # Errors
/// Only terminal I/O failures; answering problems are handled by the session.
pub async fn run<R, W>(session: &mut ChatSession, input: R, out: &mut W) -> Result<(), StartupError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{} ", ">".cyan().bold())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match parse_line(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::History => {
                if session.history().is_empty() {
                    writeln!(out, "{}", "(no messages yet)".dimmed())?;
                } else {
                    writeln!(out, "{}", render_transcript(session.history()))?;
                }
            }
            Command::Ask(question) => match session.submit(question).await {
                Ok(turn) => writeln!(out, "{}", render_turn(turn))?,
                Err(e @ SessionError::EmptyQuestion) => debug!(error = %e, "ignored input"),
                Err(e) => writeln!(out, "{} {e}", "Error:".red().bold())?,
            },
        }
    }
    debug!(turns = session.history().len(), "chat ended");
    Ok(())
}
