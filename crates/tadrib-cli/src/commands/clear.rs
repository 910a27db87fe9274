//! The `tadrib clear` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::store::KvStore;

use crate::session::{confirm, Session};

pub fn execute(store: Option<PathBuf>, config: Option<PathBuf>, yes: bool) -> Result<()> {
    let session = Session::open(store, config)?;
    let count = session.store.keys().len();

    let prompt = format!(
        "Delete all {count} keys from {}?",
        session.store.path().display()
    );
    if !yes && !confirm(&prompt)? {
        anyhow::bail!("clear not confirmed; nothing was deleted");
    }

    session.store.clear()?;
    println!("Deleted {count} keys");
    Ok(())
}
