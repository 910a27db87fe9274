//! Store, configuration, and assistant shared by the commands.

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use tadrib_core::state::{Notifier, Orchestrator};
use tadrib_core::store::{FileStore, KvStore};
use tadrib_core::tasks::{if_current, TaskScope};
use tadrib_core::traits::AiAssistant;
use tadrib_providers::{create_assistant, load_config_from, TadribConfig};

/// Console storage-full alert.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn storage_full(&self) {
        eprintln!("Warning: storage is full; the last change was not saved.");
    }
}

/// An opened store plus the configuration it was opened with.
pub struct Session {
    pub config: TadribConfig,
    pub store: Arc<FileStore>,
}

impl Session {
    pub fn open(store_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let path = store_path.unwrap_or_else(|| config.store_path.clone());
        let store = FileStore::open(&path, Some(config.storage_quota_bytes))
            .with_context(|| format!("failed to open store: {}", path.display()))?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    pub fn kv(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    /// Load the application state, seeding every absent collection.
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::load(self.kv(), Arc::new(ConsoleNotifier), self.config.settings())
    }

    pub fn assistant(&self) -> Result<Arc<dyn AiAssistant>> {
        Ok(Arc::from(create_assistant(&self.config)?))
    }
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" declines.
pub fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Run an assistant call in its own task, aborting it on Ctrl-C.
pub async fn run_cancellable<T, F>(call: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let mut scope = TaskScope::new();
    let token = scope.token();
    scope.spawn(if_current(token, call));

    tokio::select! {
        joined = scope.join_next() => {
            let output = joined
                .context("assistant task missing")?
                .context("assistant task failed")?;
            output.context("response discarded after cancellation")?
        }
        _ = tokio::signal::ctrl_c() => {
            scope.teardown();
            anyhow::bail!("cancelled");
        }
    }
}
