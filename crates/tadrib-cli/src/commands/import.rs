//! The `tadrib import` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tadrib_core::transfer::{apply_import, parse_import, Confirmation};

use crate::session::{confirm, Session};

pub fn execute(
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    file: PathBuf,
    yes: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read backup: {}", file.display()))?;
    let document = parse_import(&text)?;

    let session = Session::open(store, config)?;
    let confirmation = if yes
        || confirm(&format!(
            "Overwrite {} with {} keys from {}?",
            session.store.path().display(),
            document.len(),
            file.display()
        ))? {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };

    let summary = apply_import(session.store.as_ref(), &document, confirmation)?;
    for key in &summary.unknown {
        eprintln!("  Warning: imported unrecognized key '{key}'");
    }

    // Every repository re-reads the overwritten store.
    let orchestrator = session.orchestrator();
    println!(
        "Imported {} keys ({} users, {} texts)",
        summary.written.len(),
        orchestrator.state().platform_users.len(),
        orchestrator.state().texts.len()
    );
    Ok(())
}
