//! The `tadrib quiz` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::model::Locale;
use tadrib_core::traits::QuizRequest;

use crate::session::{run_cancellable, Session};

pub async fn execute(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    context_id: i64,
    count: usize,
    locale: Locale,
) -> Result<()> {
    if count == 0 {
        anyhow::bail!("--count must be at least 1");
    }

    let session = Session::open(store, config)?;
    let orchestrator = session.orchestrator();
    let Some(context) = orchestrator
        .state()
        .test_contexts
        .iter()
        .find(|c| c.id == context_id)
    else {
        anyhow::bail!("test context not found: {context_id}");
    };

    let request = QuizRequest {
        reference: context.content.get(locale).to_string(),
        count,
        locale,
    };
    eprintln!(
        "Generating {count} question(s) from \"{}\"...",
        context.title.get(locale)
    );

    let assistant = session.assistant()?;
    let questions =
        run_cancellable(async move { assistant.generate_quiz(&request).await }).await?;

    for (i, q) in questions.iter().enumerate() {
        println!("{}. {}", i + 1, q.question);
        for option in &q.options {
            let marker = if *option == q.correct_answer { "*" } else { " " };
            println!("   [{marker}] {option}");
        }
    }
    Ok(())
}
