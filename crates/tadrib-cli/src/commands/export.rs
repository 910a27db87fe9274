//! The `tadrib export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tadrib_core::transfer::write_export;

use crate::session::Session;

pub fn execute(store: Option<PathBuf>, config: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let session = Session::open(store, config)?;
    let path = write_export(session.store.as_ref(), &output)
        .with_context(|| format!("failed to export into {}", output.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}
