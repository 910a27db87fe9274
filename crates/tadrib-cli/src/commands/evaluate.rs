//! The `tadrib evaluate` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::model::Locale;
use tadrib_core::traits::EvaluationRequest;

use crate::session::{run_cancellable, Session};

/// Drop HTML tags from a text body, keeping its words.
fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub async fn execute(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    text_id: i64,
    question_id: i64,
    answer: String,
    locale: Locale,
) -> Result<()> {
    let session = Session::open(store, config)?;
    let orchestrator = session.orchestrator();
    let Some(text) = orchestrator.state().texts.iter().find(|t| t.id == text_id) else {
        anyhow::bail!("text not found: {text_id}");
    };
    let Some(question) = text.questions.iter().find(|q| q.id == question_id) else {
        anyhow::bail!("question {question_id} not found in text {text_id}");
    };

    let request = EvaluationRequest {
        passage: plain_text(text.content.get(locale)),
        question: question.text.get(locale).to_string(),
        answer,
        locale,
    };

    let assistant = session.assistant()?;
    let evaluation =
        run_cancellable(async move { assistant.evaluate_answer(&request).await }).await?;
    println!("{evaluation}");
    Ok(())
}
