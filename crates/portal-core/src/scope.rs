//! Lifetime of a mounted component. Remote work started through a scope is
//! abandoned once the component is torn down, so late results never touch
//! discarded state.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::sync::Notify;

use crate::CoreError;

#[derive(Debug, Default)]
struct ScopeState {
    torn_down: AtomicBool,
    notify: Notify,
}

/// Cloneable handle shared by a component and the tasks it spawns.
#[derive(Debug, Clone, Default)]
pub struct ComponentScope {
    state: Arc<ScopeState>,
}

impl ComponentScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        !self.state.torn_down.load(Ordering::SeqCst)
    }

    /// Marks the component as gone and wakes everything waiting on it.
    /// Calling it twice is harmless.
    pub fn teardown(&self) {
        if !self.state.torn_down.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    /// Resolves once the scope has been torn down.
    pub async fn torn_down(&self) {
        let notified = self.state.notify.notified();
        if !self.is_mounted() {
            return;
        }
        notified.await;
    }

    /// Runs `future` unless the scope is torn down first.
    pub async fn run<T, F>(&self, future: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        if !self.is_mounted() {
            return Err(CoreError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.torn_down() => Err(CoreError::Cancelled),
            result = future => {
                if self.is_mounted() { result } else { Err(CoreError::Cancelled) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn run_passes_results_through_while_mounted() {
        let scope = ComponentScope::new();
        let value = scope.run(async { Ok::<_, CoreError>(7) }).await;
        assert_eq!(value.expect("mounted scope"), 7);
    }

    #[tokio::test]
    async fn teardown_cancels_pending_work() {
        let scope = ComponentScope::new();
        let handle = scope.clone();
        let pending = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, CoreError>(())
                })
                .await
        });
        tokio::task::yield_now().await;
        scope.teardown();
        let outcome = pending.await.expect("join");
        assert!(matches!(outcome, Err(CoreError::Cancelled)));
        assert!(!scope.is_mounted());
    }

    #[tokio::test]
    async fn torn_down_scope_refuses_new_work() {
        let scope = ComponentScope::new();
        scope.teardown();
        scope.teardown();
        let outcome = scope.run(async { Ok::<_, CoreError>(1) }).await;
        assert!(outcome.is_err_and(|err| err.is_cancelled()));
    }
}
