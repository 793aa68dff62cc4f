use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info};

use crate::{
    remote::{FetchQuery, Notice, Notifier, RecordFetcher},
    scope::ComponentScope,
    CoreError,
};

use super::engine::{ListConfig, ListEngine};

/// Default period of the background list refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed,
    Cancelled,
}

/// Owns a list engine and keeps it in sync with its remote data set.
///
/// A failed fetch empties the list, is logged, and raises an error notice;
/// it never reaches the caller as an `Err`.
pub struct ListController {
    title: String,
    query: FetchQuery,
    engine: ListEngine,
    fetcher: Arc<dyn RecordFetcher>,
    notifier: Arc<dyn Notifier>,
    scope: ComponentScope,
    loading: bool,
}

impl ListController {
    pub fn new(
        title: impl Into<String>,
        query: FetchQuery,
        config: ListConfig,
        fetcher: Arc<dyn RecordFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            title: title.into(),
            query,
            engine: ListEngine::new(config),
            fetcher,
            notifier,
            scope: ComponentScope::new(),
            loading: false,
        }
    }

    pub async fn refresh(&mut self) -> LoadOutcome {
        self.loading = true;
        let result = self.scope.run(self.fetcher.fetch(&self.query)).await;
        self.loading = false;

        match result {
            Ok(rows) => {
                let count = rows.len();
                self.engine.set_source(rows);
                info!(list = %self.title, source = %self.query.source, count, "list loaded");
                LoadOutcome::Loaded(count)
            }
            Err(CoreError::Cancelled) => {
                debug!(list = %self.title, "list fetch abandoned after teardown");
                LoadOutcome::Cancelled
            }
            Err(err) => {
                error!(list = %self.title, source = %self.query.source, error = %err, "list fetch failed");
                self.engine.clear();
                self.notifier.notify(Notice::error(
                    format!("Unable to load {}", self.title),
                    err.to_string(),
                ));
                LoadOutcome::Failed
            }
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn query(&self) -> &FetchQuery {
        &self.query
    }

    pub fn engine(&self) -> &ListEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ListEngine {
        &mut self.engine
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scope(&self) -> &ComponentScope {
        &self.scope
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

/// Re-fetches a shared controller every `period` until its scope is torn
/// down. The first refresh happens one full period after spawning.
pub fn spawn_auto_refresh(controller: Arc<Mutex<ListController>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let scope = controller.lock().await.scope().clone();
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = scope.torn_down() => break,
                _ = ticker.tick() => {
                    let outcome = controller.lock().await.refresh().await;
                    debug!(?outcome, "scheduled list refresh");
                }
            }
        }
        debug!("auto refresh stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex as StdMutex,
    };

    use async_trait::async_trait;
    use portal_domain::{ColumnDescriptor, Row, SortDirection};

    use super::*;

    #[derive(Default)]
    struct Fetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RecordFetcher for Fetcher {
        async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<Row>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoreError::Remote("server unavailable".into()));
            }
            Ok(vec![
                Row::new().with("Name", "b").with("Amount", "10"),
                Row::new().with("Name", "a").with("Amount", 0),
            ])
        }
    }

    #[derive(Default)]
    struct Notices(StdMutex<Vec<Notice>>);

    impl Notifier for Notices {
        fn notify(&self, notice: Notice) {
            self.0.lock().expect("notices").push(notice);
        }
    }

    fn controller(fetcher: Arc<Fetcher>, notices: Arc<Notices>) -> ListController {
        let config = ListConfig::new(vec![ColumnDescriptor::currency("Amount", "Amount")])
            .with_default_sort("Amount", SortDirection::Desc);
        ListController::new("pledges", FetchQuery::new("pledges"), config, fetcher, notices)
    }

    #[tokio::test]
    async fn successful_fetch_replaces_source() {
        let fetcher = Arc::new(Fetcher::default());
        let notices = Arc::new(Notices::default());
        let mut list = controller(fetcher, notices.clone());

        assert_eq!(list.refresh().await, LoadOutcome::Loaded(2));
        assert_eq!(list.engine().rows()[0].text("Name").as_deref(), Some("b"));
        assert!(notices.0.lock().expect("notices").is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_clears_rows_and_notifies() {
        let notices = Arc::new(Notices::default());
        let mut list = controller(Arc::new(Fetcher::default()), notices.clone());
        list.refresh().await;
        assert_eq!(list.engine().total_records(), 2);

        list.fetcher = Arc::new(Fetcher {
            fail: true,
            ..Fetcher::default()
        });
        assert_eq!(list.refresh().await, LoadOutcome::Failed);
        assert_eq!(list.engine().total_records(), 0);
        assert_eq!(list.engine().total_pages(), 1);

        let notices = notices.0.lock().expect("notices");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Unable to load pledges");
    }

    #[tokio::test]
    async fn torn_down_controller_ignores_fetches() {
        let fetcher = Arc::new(Fetcher::default());
        let mut list = controller(fetcher.clone(), Arc::new(Notices::default()));
        list.teardown();
        assert_eq!(list.refresh().await, LoadOutcome::Cancelled);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_runs_until_teardown() {
        let fetcher = Arc::new(Fetcher::default());
        let list = Arc::new(Mutex::new(controller(
            fetcher.clone(),
            Arc::new(Notices::default()),
        )));
        let handle = spawn_auto_refresh(list.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

        list.lock().await.teardown();
        handle.await.expect("refresh task");
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
