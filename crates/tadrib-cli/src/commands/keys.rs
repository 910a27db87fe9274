//! The `tadrib keys` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tadrib_core::keys;
use tadrib_core::store::KvStore;

use crate::session::Session;

fn kind(key: &str) -> &'static str {
    if keys::is_chat_history_key(key) {
        "chat history"
    } else if keys::is_known_key(key) {
        "application"
    } else {
        "unknown"
    }
}

pub fn execute(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let session = Session::open(store, config)?;
    let stored = session.store.keys();

    if stored.is_empty() {
        println!(
            "Store {} is empty. Run `tadrib seed` to load the defaults.",
            session.store.path().display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Key", "Kind", "Bytes"]);
    for key in &stored {
        let bytes = session.store.read(key).map(|v| v.len()).unwrap_or(0);
        table.add_row(vec![Cell::new(key), Cell::new(kind(key)), Cell::new(bytes)]);
    }
    println!("{table}");

    let used = session.store.used_bytes();
    let quota = session.config.storage_quota_bytes;
    println!(
        "{} keys, {used} of {quota} bytes used ({:.1}%)",
        stored.len(),
        used as f64 * 100.0 / quota.max(1) as f64
    );

    Ok(())
}
