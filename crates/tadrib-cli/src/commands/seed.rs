//! The `tadrib seed` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::store::KvStore;

use crate::session::Session;

pub fn execute(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let session = Session::open(store, config)?;
    let before = session.store.keys().len();

    let orchestrator = session.orchestrator();
    let state = orchestrator.state();
    let after = session.store.keys().len();

    println!(
        "Store ready: {} ({} keys, {} added)",
        session.store.path().display(),
        after,
        after.saturating_sub(before)
    );
    println!(
        "  {} texts, {} skills, {} teams, {} chat channels, {} users",
        state.texts.len(),
        state.skills.len(),
        state.teams.len(),
        state.chat_channels.len(),
        state.platform_users.len()
    );
    Ok(())
}
