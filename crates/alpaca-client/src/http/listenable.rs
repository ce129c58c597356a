//! Dual-access result futures.
//!
//! A [`Listenable`] wraps exactly one in-flight operation and exposes its
//! eventual outcome two ways: an awaited pull ([`Listenable::await_outcome`])
//! and a completion callback ([`Listenable::on_complete`]). The outcome is
//! computed once, by the task driving the operation, and memoized; both
//! accessors observe the same terminal value, so using them together never
//! issues a second request.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::error::ApiError;

/// The terminal outcome of one network operation.
pub type Outcome<T> = Result<T, ApiError>;

type CompletionHandler<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

struct Shared<T> {
    outcome: OnceLock<Outcome<T>>,
    notify: Notify,
    handlers: Mutex<Vec<CompletionHandler<T>>>,
}

impl<T: Clone> Shared<T> {
    fn complete(&self, outcome: Outcome<T>) {
        let handlers = {
            let mut guard = self.handlers.lock();
            if self.outcome.set(outcome).is_err() {
                // Already terminal; the transition happens at most once.
                return;
            }
            std::mem::take(&mut *guard)
        };

        // Wake awaiters first; a misbehaving handler must not strand them.
        self.notify.notify_waiters();

        if let Some(outcome) = self.outcome.get() {
            for handler in handlers {
                let outcome = outcome.clone();
                if panic::catch_unwind(AssertUnwindSafe(move || handler(outcome))).is_err() {
                    tracing::error!("completion handler panicked");
                }
            }
        }
    }
}

/// Handle to the eventual outcome of one pending network operation.
///
/// Transitions exactly once from pending to `Ok(entity)` or `Err(error)`.
/// Cloning the handle shares the same underlying operation.
pub struct Listenable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Listenable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Listenable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn `operation` onto the runtime and return a handle to its outcome.
    ///
    /// The operation runs to completion exactly once, on a runtime-owned
    /// task; a panic or cancellation of that task surfaces as
    /// [`ApiError::Internal`] to anyone observing the handle.
    pub fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            outcome: OnceLock::new(),
            notify: Notify::new(),
            handlers: Mutex::new(Vec::new()),
        });

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(operation);
        tokio::spawn(async move {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ApiError::internal(format!("request task failed: {e}"))),
            };
            task_shared.complete(outcome);
        });

        Self { shared }
    }

    /// Build a handle that is already terminal.
    ///
    /// Useful when parameter validation fails before any request is issued.
    #[must_use]
    pub fn ready(outcome: Outcome<T>) -> Self {
        let shared = Arc::new(Shared {
            outcome: OnceLock::new(),
            notify: Notify::new(),
            handlers: Mutex::new(Vec::new()),
        });
        shared.complete(outcome);
        Self { shared }
    }

    /// Wait for the operation to complete and return its outcome.
    ///
    /// Suspends the calling task until the outcome is terminal. May be
    /// called any number of times; every call observes the same outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] the operation terminated with.
    pub async fn await_outcome(&self) -> Outcome<T> {
        loop {
            if let Some(outcome) = self.shared.outcome.get() {
                return outcome.clone();
            }
            let notified = self.shared.notify.notified();
            // Re-check after registering: completion may have raced us.
            if let Some(outcome) = self.shared.outcome.get() {
                return outcome.clone();
            }
            notified.await;
        }
    }

    /// Register a handler invoked exactly once with the terminal outcome.
    ///
    /// If the outcome is still pending the handler fires later, on the task
    /// that completes the operation. If the outcome is already terminal the
    /// handler fires immediately on the calling thread.
    pub fn on_complete<F>(&self, handler: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let mut guard = self.shared.handlers.lock();
        if let Some(outcome) = self.shared.outcome.get() {
            drop(guard);
            handler(outcome.clone());
        } else {
            guard.push(Box::new(handler));
        }
    }

    /// Whether the outcome is already terminal.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shared.outcome.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn await_returns_spawned_outcome() {
        let listenable = Listenable::spawn(async { Ok(42_u32) });
        assert_eq!(listenable.await_outcome().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn await_is_repeatable() {
        let listenable = Listenable::spawn(async { Ok("hello".to_string()) });
        assert_eq!(listenable.await_outcome().await.unwrap(), "hello");
        assert_eq!(listenable.await_outcome().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn callback_fires_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let listenable = Listenable::spawn(async { Ok(7_u32) });

        let counted = Arc::clone(&calls);
        listenable.on_complete(move |outcome| {
            assert_eq!(outcome.unwrap(), 7);
            counted.fetch_add(1, Ordering::SeqCst);
        });

        listenable.await_outcome().await.unwrap();
        // Give the completion task a chance to drain handlers.
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn callback_after_completion_fires_immediately() {
        let listenable = Listenable::ready(Ok(1_u32));
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        listenable.on_complete(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_outcome_reaches_both_paths() {
        let listenable: Listenable<u32> =
            Listenable::spawn(async { Err(ApiError::internal("connection reset")) });

        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        listenable.on_complete(move |outcome| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(outcome.is_err());
            }
        });

        assert!(listenable.await_outcome().await.is_err());
        assert!(rx.await.unwrap());
    }

    #[tokio::test]
    async fn handle_moves_across_tasks() {
        let listenable = Listenable::spawn(async { Ok(5_u32) });
        let handle = listenable.clone();
        let outcome = tokio::spawn(async move { handle.await_outcome().await })
            .await
            .unwrap();
        assert_eq!(outcome.unwrap(), 5);
    }

    #[tokio::test]
    async fn awaiter_survives_panicking_handler() {
        let listenable = Listenable::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            Ok(9_u32)
        });
        listenable.on_complete(|_| panic!("handler bug"));

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(3),
            listenable.await_outcome(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.unwrap(), 9);
    }

    #[tokio::test]
    async fn handlers_after_a_panicking_one_still_fire() {
        let listenable = Listenable::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            Ok(3_u32)
        });
        listenable.on_complete(|_| panic!("handler bug"));

        let (tx, rx) = tokio::sync::oneshot::channel();
        listenable.on_complete(move |outcome| {
            let _ = tx.send(outcome);
        });

        listenable.await_outcome().await.unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn ready_error_is_terminal() {
        let listenable: Listenable<u32> =
            Listenable::ready(Err(ApiError::invalid_params("limit must be positive")));
        assert!(listenable.is_complete());
        assert!(matches!(
            listenable.await_outcome().await,
            Err(ApiError::InvalidParams { .. })
        ));
    }
}
