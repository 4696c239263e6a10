//! Detached fire-and-forget tasks.
//!
//! Cache writes that follow a response are spawned here and never awaited
//! on the response path. Tasks run on the runtime, not inside this handle:
//! dropping every `Background` clone, or cancelling a `settle`, leaves them
//! running. A failing task is logged at `warn` and dropped; it can never
//! reach the caller. [`Background::settle`] waits for everything pending,
//! which is how tests observe the post-write state.

use std::future::Future;
use std::sync::Arc;

use offline_core::Error;
use tokio::sync::watch;

/// Handle to a set of detached tasks.
///
/// Cloning shares the same pending count.
#[derive(Clone)]
pub struct Background {
    pending: Arc<watch::Sender<usize>>,
}

impl Default for Background {
    fn default() -> Self {
        Self { pending: Arc::new(watch::Sender::new(0)) }
    }
}

/// Decrements the pending count when its task ends, however it ends.
struct Completion {
    label: &'static str,
    pending: Arc<watch::Sender<usize>>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!(task = self.label, "background task panicked");
        }
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` detached. Its error, if any, is logged and swallowed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.pending.send_modify(|n| *n += 1);
        let completion = Completion { label, pending: self.pending.clone() };

        tokio::spawn(async move {
            let _completion = completion;
            if let Err(e) = task.await {
                tracing::warn!(task = label, error = %e, "background task failed");
            }
        });
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until every task has finished, including tasks spawned while
    /// waiting.
    ///
    /// Cancel-safe: dropping the returned future does not affect the tasks.
    pub async fn settle(&self) {
        let mut pending = self.pending.subscribe();
        let _ = pending.wait_for(|n| *n == 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_waits_for_tasks() {
        let background = Background::new();
        let done = Arc::new(AtomicUsize::new(0));

        for i in 0..5 {
            let done = done.clone();
            background.spawn("count", async move {
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        background.settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 5);
        assert_eq!(background.pending(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_swallowed() {
        let background = Background::new();
        background.spawn("fails", async { Err(Error::Network("offline".into())) });
        background.settle().await;
        assert_eq!(background.pending(), 0);
    }

    #[tokio::test]
    async fn test_settle_covers_nested_spawns() {
        let background = Background::new();
        let done = Arc::new(AtomicUsize::new(0));

        let inner = background.clone();
        let counter = done.clone();
        background.spawn("outer", async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            inner.spawn("inner", async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        background.settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_settle_keeps_tasks() {
        let background = Background::new();
        let done = Arc::new(AtomicUsize::new(0));

        let counter = done.clone();
        background.spawn("slow-write", async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let timed_out = tokio::time::timeout(Duration::from_millis(5), background.settle()).await;
        assert!(timed_out.is_err());
        assert_eq!(background.pending(), 1);

        background.settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(background.pending(), 0);
    }

    #[tokio::test]
    async fn test_tasks_outlive_dropped_handle() {
        let background = Background::new();
        let done = Arc::new(AtomicUsize::new(0));

        let counter = done.clone();
        background.spawn("orphaned-write", async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        drop(background);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_is_counted_done() {
        let background = Background::new();
        let explode = true;
        background.spawn("panics", async move {
            if explode {
                panic!("boom");
            }
            Ok(())
        });
        background.settle().await;
        assert_eq!(background.pending(), 0);
    }

    #[tokio::test]
    async fn test_settle_with_nothing_pending() {
        Background::new().settle().await;
    }
}
