//! The `tadrib show` command.

use std::path::PathBuf;

use anyhow::Result;

use tadrib_core::store::KvStore;

use crate::session::Session;

pub fn execute(store: Option<PathBuf>, config: Option<PathBuf>, key: String) -> Result<()> {
    let session = Session::open(store, config)?;
    let Some(raw) = session.store.read(&key) else {
        anyhow::bail!("key not found: {key}");
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{raw}"),
    }
    Ok(())
}
