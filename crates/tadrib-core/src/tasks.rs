//! Cancellable external calls bound to a UI context.
//!
//! A [`TaskScope`] owns the tasks started on behalf of one view. Tearing the
//! scope down (or dropping it) aborts everything still running and
//! invalidates its [`ScopeToken`]s, so a response that arrives late can be
//! recognized as stale and discarded.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};

/// Cheap handle answering "is the context that started me still alive?".
#[derive(Debug, Clone)]
pub struct ScopeToken {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl ScopeToken {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }
}

/// Owner of the in-flight tasks of one UI context.
pub struct TaskScope<T> {
    tasks: JoinSet<T>,
    generation: Arc<AtomicU64>,
}

impl<T: Send + 'static> Default for TaskScope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> TaskScope<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Token valid until the next [`invalidate`](Self::invalidate) or teardown.
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            generation: Arc::clone(&self.generation),
            issued: self.generation.load(Ordering::Acquire),
        }
    }

    /// Start a task owned by this scope. Must be called inside a runtime.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.tasks.spawn(future);
    }

    /// Wait for the next task to finish. `None` once the scope is empty.
    pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    /// Mark every outstanding token stale without aborting anything.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Abort every running task and invalidate outstanding tokens.
    pub fn teardown(&mut self) {
        let running = self.tasks.len();
        self.invalidate();
        self.tasks.abort_all();
        if running > 0 {
            tracing::debug!(running, "task scope torn down");
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Drop for TaskScope<T> {
    fn drop(&mut self) {
        // JoinSet aborts its tasks on drop; only the tokens need handling.
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Await `future`, returning its output only if `token` is still current.
pub async fn if_current<F, T>(token: ScopeToken, future: F) -> Option<T>
where
    F: Future<Output = T>,
{
    let output = future.await;
    if token.is_current() {
        Some(output)
    } else {
        tracing::debug!("discarding stale response");
        None
    }
}
