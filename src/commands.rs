//! Non-interactive command logic.
//!
//! Each command writes to a caller-supplied writer and takes its transport as a
//! parameter, so it can be exercised with a mock backend.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::backend::{BackendClient, QueryTransport};
use crate::session::Session;
use crate::view::render_model;

/// How a command ended, mapped to the process exit code by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every request succeeded
    Answered,
    /// At least one request failed
    Failed,
}

/// Totals for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub answered: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Returns the overall outcome of the batch.
    pub fn outcome(&self) -> Outcome {
        if self.failed == 0 {
            Outcome::Answered
        } else {
            Outcome::Failed
        }
    }
}

/// Asks one question and prints the rendered view.
///
/// # Errors
///
/// Returns an error if the question is empty or writing the output fails.
/// Backend failures are not errors: they print the failure message and return
/// `Outcome::Failed`.
pub fn execute_ask(
    transport: &dyn QueryTransport,
    question: &str,
    out: &mut impl Write,
) -> Result<Outcome> {
    if question.is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let mut session = Session::new();
    session.set_question(question);
    session.submit_with(transport);

    let model = render_model(&session);
    writeln!(out, "{model}").context("Failed to write answer")?;

    Ok(if model.error.is_some() {
        Outcome::Failed
    } else {
        Outcome::Answered
    })
}

/// Parses a question file: one question per line, skipping blank lines and
/// lines starting with `#`.
///
/// # Examples
///
/// ```
/// use knowrn::commands::parse_questions;
///
/// let questions = parse_questions("# only in TXT\nHackRonyX 2025\n\n  ukulele  \n");
/// assert_eq!(questions, vec!["HackRonyX 2025", "ukulele"]);
/// ```
pub fn parse_questions(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Reads and parses a question file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_questions(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question file: {}", path.display()))?;
    Ok(parse_questions(&contents))
}

/// Asks each question in turn and prints a numbered report.
///
/// Questions share one session, as if typed one after another into the same view.
///
/// # Errors
///
/// Returns an error if `questions` is empty or writing the output fails.
pub fn execute_batch(
    transport: &dyn QueryTransport,
    questions: &[String],
    out: &mut impl Write,
) -> Result<BatchSummary> {
    if questions.is_empty() {
        anyhow::bail!("Question file cannot be empty");
    }

    let mut session = Session::new();
    let mut summary = BatchSummary {
        total: questions.len(),
        ..BatchSummary::default()
    };

    for (idx, question) in questions.iter().enumerate() {
        session.set_question(question.as_str());
        session.submit_with(transport);

        let model = render_model(&session);
        if model.error.is_some() {
            summary.failed += 1;
        } else {
            summary.answered += 1;
        }

        writeln!(out, "=== QUERY {}/{} ===", idx + 1, summary.total)?;
        writeln!(out, "{question}")?;
        writeln!(out, "{model}")?;
        writeln!(out, "Retrieved: {} sources", model.sources.len())?;
        writeln!(out)?;
    }

    info!(
        total = summary.total,
        answered = summary.answered,
        failed = summary.failed,
        "batch finished"
    );
    writeln!(
        out,
        "Answered {} of {} questions ({} failed)",
        summary.answered, summary.total, summary.failed
    )?;

    Ok(summary)
}

/// Calls the backend's root route and prints its status message.
///
/// # Errors
///
/// Returns an error only if writing the output fails.
pub fn execute_ping(client: &BackendClient, out: &mut impl Write) -> Result<Outcome> {
    match client.health() {
        Ok(message) if message.is_empty() => {
            writeln!(out, "Backend at {} is up", client.base_url())?;
            Ok(Outcome::Answered)
        }
        Ok(message) => {
            writeln!(out, "Backend at {} is up: {}", client.base_url(), message)?;
            Ok(Outcome::Answered)
        }
        Err(e) => {
            writeln!(out, "Backend at {} is unreachable: {}", client.base_url(), e)?;
            Ok(Outcome::Failed)
        }
    }
}
