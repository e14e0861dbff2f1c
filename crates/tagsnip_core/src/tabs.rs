//! Ordered open-tab list with one optional active entry.
//!
//! Every mutation queues the new state for a background writer that applies
//! writes to the [`TabStore`] one at a time, in mutation order. Persistence
//! is best-effort: failures are logged and the in-memory state stays
//! authoritative.

use crate::models::tab::TabsState;
use crate::remote::{RemoteError, TabStore};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum Write {
    Put(TabsState),
    Flush(oneshot::Sender<()>),
}

/// Tab manager over snippet ids.
pub struct TabManager<T: TabStore + 'static> {
    store: Arc<T>,
    order: Vec<String>,
    active: Option<String>,
    writer: Option<mpsc::UnboundedSender<Write>>,
}

impl<T: TabStore + 'static> TabManager<T> {
    /// Empty manager persisting through `store`.
    pub fn new(store: Arc<T>) -> Self {
        Self {
            store,
            order: Vec::new(),
            active: None,
            writer: None,
        }
    }

    /// Restore the tab list saved by a previous session.
    ///
    /// # Errors
    /// Returns the store's error; callers usually log it and start empty.
    pub async fn load(store: Arc<T>) -> Result<Self, RemoteError> {
        let saved = store.get().await?;
        let (order, active) = saved.into_order();
        let active = active.filter(|id| order.contains(id));
        Ok(Self {
            store,
            order,
            active,
            writer: None,
        })
    }

    /// Open tab ids in display order.
    pub fn tabs(&self) -> &[String] {
        &self.order
    }

    /// Active tab id, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Number of open tabs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no tab is open.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `id` is open.
    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|tab| tab == id)
    }

    /// Append `id` if it is not open yet, then make it active.
    pub fn open(&mut self, id: &str) {
        if !self.contains(id) {
            self.order.push(id.to_string());
        }
        self.active = Some(id.to_string());
        self.persist();
    }

    /// Close `id` and return the active tab afterwards.
    ///
    /// Closing the active tab activates the tab that slid into its slot, or
    /// the new last tab when the closed one was last. Unknown ids are ignored.
    pub fn close(&mut self, id: &str) -> Option<&str> {
        let Some(index) = self.order.iter().position(|tab| tab == id) else {
            return self.active();
        };
        self.order.remove(index);
        if self.order.is_empty() {
            self.active = None;
        } else if self.active.as_deref() == Some(id) {
            let next = index.min(self.order.len() - 1);
            self.active = Some(self.order[next].clone());
        }
        self.persist();
        self.active()
    }

    /// Make an already open tab active. Returns false for unknown ids.
    pub fn set_active(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = Some(id.to_string());
        self.persist();
        true
    }

    /// Close every tab and clear the active one.
    pub fn close_all(&mut self) {
        self.order.clear();
        self.active = None;
        self.persist();
    }

    /// Keep only `keep`, which becomes active.
    pub fn close_others(&mut self, keep: &str) {
        self.order = vec![keep.to_string()];
        self.active = Some(keep.to_string());
        self.persist();
    }

    /// Move the tab at `from` so it ends up at `to`.
    ///
    /// `to` past the end moves the tab to the end. Returns false when `from`
    /// is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.order.len() {
            return false;
        }
        let moved = self.order.remove(from);
        let to = to.min(self.order.len());
        self.order.insert(to, moved);
        self.persist();
        true
    }

    /// Current state in its persisted form.
    pub fn snapshot(&self) -> TabsState {
        TabsState::from_order(&self.order, self.active.as_deref())
    }

    /// Wait until every change made so far has been written (or has failed).
    pub async fn settle(&mut self) {
        let Some(writer) = &self.writer else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if writer.send(Write::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Must be called from within a Tokio runtime.
    fn persist(&mut self) {
        let state = self.snapshot();
        let store = &self.store;
        let writer = self
            .writer
            .get_or_insert_with(|| spawn_writer(Arc::clone(store)));
        if writer.send(Write::Put(state)).is_err() {
            tracing::warn!("tab writer stopped; change not persisted");
        }
    }
}

fn spawn_writer<T: TabStore + 'static>(store: Arc<T>) -> mpsc::UnboundedSender<Write> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(write) = rx.recv().await {
            match write {
                Write::Put(state) => {
                    if let Err(err) = store.put(state).await {
                        tracing::warn!("failed to persist tabs: {}", err);
                    }
                }
                Write::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryTabs {
        saved: Mutex<Vec<TabsState>>,
        fail: AtomicBool,
    }

    impl MemoryTabs {
        fn last(&self) -> Option<TabsState> {
            self.saved.lock().unwrap().last().cloned()
        }

        fn writes(&self) -> usize {
            self.saved.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TabStore for MemoryTabs {
        async fn get(&self) -> Result<TabsState, RemoteError> {
            Ok(self.last().unwrap_or_default())
        }

        async fn put(&self, tabs: TabsState) -> Result<(), RemoteError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RemoteError::Failed("offline".into()));
            }
            self.saved.lock().unwrap().push(tabs);
            Ok(())
        }
    }

    fn manager_with(ids: &[&str]) -> (TabManager<MemoryTabs>, Arc<MemoryTabs>) {
        let store = Arc::new(MemoryTabs::default());
        let mut tabs = TabManager::new(Arc::clone(&store));
        for id in ids {
            tabs.open(id);
        }
        (tabs, store)
    }

    #[tokio::test]
    async fn open_appends_once_and_activates() {
        let (mut tabs, store) = manager_with(&["a", "b"]);
        tabs.open("a");
        assert_eq!(tabs.tabs(), ["a", "b"]);
        assert_eq!(tabs.active(), Some("a"));

        tabs.settle().await;
        assert_eq!(store.writes(), 3);
        let (order, active) = store.last().unwrap().into_order();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(active.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn closing_inactive_middle_tab_keeps_active() {
        let (mut tabs, _store) = manager_with(&["a", "b", "c"]);
        assert_eq!(tabs.close("b"), Some("c"));
        assert_eq!(tabs.tabs(), ["a", "c"]);
    }

    #[tokio::test]
    async fn closing_last_active_tab_activates_new_last() {
        let (mut tabs, _store) = manager_with(&["a", "b", "c"]);
        tabs.close("b");
        assert_eq!(tabs.close("c"), Some("a"));
        assert_eq!(tabs.tabs(), ["a"]);
    }

    #[tokio::test]
    async fn closing_active_middle_tab_activates_successor() {
        let (mut tabs, _store) = manager_with(&["a", "b", "c"]);
        tabs.set_active("b");
        assert_eq!(tabs.close("b"), Some("c"));
    }

    #[tokio::test]
    async fn closing_only_tab_clears_active_and_unknown_is_ignored() {
        let (mut tabs, store) = manager_with(&["a"]);
        assert_eq!(tabs.close("zzz"), Some("a"));
        assert_eq!(tabs.close("a"), None);
        assert!(tabs.is_empty());
        tabs.settle().await;
        assert_eq!(store.writes(), 2);
        assert!(store.last().unwrap().tabs.is_empty());
    }

    #[tokio::test]
    async fn set_active_rejects_unknown_ids() {
        let (mut tabs, _store) = manager_with(&["a", "b"]);
        assert!(!tabs.set_active("x"));
        assert!(tabs.set_active("a"));
        assert_eq!(tabs.active(), Some("a"));
    }

    #[tokio::test]
    async fn close_all_and_close_others() {
        let (mut tabs, _store) = manager_with(&["a", "b", "c"]);
        tabs.close_others("b");
        assert_eq!(tabs.tabs(), ["b"]);
        assert_eq!(tabs.active(), Some("b"));
        tabs.close_all();
        assert!(tabs.is_empty());
        assert_eq!(tabs.active(), None);
    }

    #[tokio::test]
    async fn reorder_moves_like_splice() {
        let (mut tabs, store) = manager_with(&["a", "b", "c", "d"]);
        assert!(tabs.reorder(0, 2));
        assert_eq!(tabs.tabs(), ["b", "c", "a", "d"]);
        assert!(tabs.reorder(3, 0));
        assert_eq!(tabs.tabs(), ["d", "b", "c", "a"]);
        assert!(tabs.reorder(0, 99));
        assert_eq!(tabs.tabs(), ["b", "c", "a", "d"]);
        assert!(!tabs.reorder(4, 0));
        assert_eq!(tabs.active(), Some("d"));

        tabs.settle().await;
        let last = store.last().unwrap();
        assert_eq!(last.tabs[3].snippet_id, "d");
        assert!(last.tabs[3].is_active);
        assert_eq!(last.active_count(), 1);
    }

    #[tokio::test]
    async fn persistence_failures_do_not_block_state_changes() {
        let (mut tabs, store) = manager_with(&[]);
        store.fail.store(true, Ordering::SeqCst);
        tabs.open("a");
        tabs.open("b");
        tabs.settle().await;
        assert_eq!(tabs.tabs(), ["a", "b"]);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn load_restores_saved_order_and_active() {
        let (mut tabs, store) = manager_with(&["a", "b", "c"]);
        tabs.set_active("b");
        tabs.settle().await;

        let restored = TabManager::load(Arc::clone(&store)).await.unwrap();
        assert_eq!(restored.tabs(), ["a", "b", "c"]);
        assert_eq!(restored.active(), Some("b"));
    }
}
