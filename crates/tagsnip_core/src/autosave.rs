//! Debounced auto-save controller for one editing session at a time.
//!
//! `mark_dirty` records the latest snapshot and (re)arms a single-slot timer.
//! When the timer fires, the pending snapshot is taken and saved; edits that
//! arrive while a save is in flight start a fresh cycle. Saves are
//! serialized, so at most one is in flight. A failed timer save is logged
//! and not retried.
//!
//! Switching sessions discards pending work without saving it unless the
//! caller opts into [`AutoSaver::flush_then_switch`].

use crate::models::snippet::{Snippet, UpdateSnippetRequest};
use crate::remote::{RemoteError, SnippetSaver};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Where the current session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing unsaved.
    Clean,
    /// Unsaved changes, no save running.
    Dirty,
    /// A save is in flight and nothing newer is pending.
    Saving,
    /// A save is in flight and a newer edit is waiting for its own cycle.
    DirtyWhileSaving,
}

/// Snapshot of the controller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    pub session: Option<String>,
    pub state: SaveState,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct Inner {
    session: Option<String>,
    epoch: u64,
    pending: Option<UpdateSnippetRequest>,
    dirty: bool,
    /// Epoch of the save currently running, if any.
    in_flight: Option<u64>,
    timer: Option<JoinHandle<()>>,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Inner {
    fn state(&self) -> SaveState {
        // A save started before a switch or cancel belongs to a dead epoch.
        let saving = self.in_flight == Some(self.epoch);
        match (saving, self.dirty) {
            (true, true) => SaveState::DirtyWhileSaving,
            (true, false) => SaveState::Saving,
            (false, true) => SaveState::Dirty,
            (false, false) => SaveState::Clean,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Forget everything about the current session.
    fn reset(&mut self) {
        self.cancel_timer();
        self.pending = None;
        self.dirty = false;
        self.last_error = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

struct Shared<S> {
    saver: S,
    delay: Duration,
    enabled: bool,
    inner: Mutex<Inner>,
    /// Held for the duration of every save.
    gate: tokio::sync::Mutex<()>,
}

impl<S: SnippetSaver + 'static> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the pending snapshot (or use `explicit`) and save it.
    ///
    /// Returns `Ok(None)` when there was nothing to save or the session
    /// changed before the save could start.
    async fn run_save(
        &self,
        epoch: u64,
        explicit: Option<UpdateSnippetRequest>,
    ) -> Result<Option<Snippet>, RemoteError> {
        let _gate = self.gate.lock().await;

        let (id, snapshot) = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return Ok(None);
            }
            let pending = inner.pending.take();
            let Some(snapshot) = explicit.or(pending) else {
                return Ok(None);
            };
            let Some(id) = inner.session.clone() else {
                return Ok(None);
            };
            inner.in_flight = Some(epoch);
            inner.dirty = false;
            (id, snapshot)
        };

        let result = self.saver.save(&id, snapshot).await;

        let mut inner = self.lock();
        if inner.in_flight == Some(epoch) {
            inner.in_flight = None;
        }
        let current = inner.epoch == epoch;
        match &result {
            Ok(_) => {
                if current {
                    inner.last_saved = Some(Utc::now());
                    inner.last_error = None;
                    inner.dirty = inner.pending.is_some();
                }
            }
            Err(err) => {
                tracing::warn!("auto-save of snippet {} failed: {}", id, err);
                if current {
                    inner.last_error = Some(err.to_string());
                    inner.dirty = true;
                }
            }
        }
        result.map(Some)
    }
}

/// Debounced saver for the snippet currently being edited.
pub struct AutoSaver<S: SnippetSaver + 'static> {
    shared: Arc<Shared<S>>,
}

impl<S: SnippetSaver + 'static> AutoSaver<S> {
    /// Create a controller that saves through `saver` after `delay` of quiet.
    pub fn new(saver: S, delay: Duration) -> Self {
        Self::with_enabled(saver, delay, true)
    }

    /// Like [`Self::new`], but with debounced saving switchable off; when
    /// disabled, edits are only persisted by [`Self::save_now`].
    pub fn with_enabled(saver: S, delay: Duration, enabled: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                saver,
                delay,
                enabled,
                inner: Mutex::new(Inner::default()),
                gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Debounce delay.
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Current status.
    pub fn status(&self) -> SaveStatus {
        let inner = self.shared.lock();
        SaveStatus {
            session: inner.session.clone(),
            state: inner.state(),
            last_saved: inner.last_saved,
            last_error: inner.last_error.clone(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SaveState {
        self.shared.lock().state()
    }

    /// Begin editing `snippet_id`, discarding any pending work of the
    /// previous session without saving it.
    pub fn switch_session(&self, snippet_id: impl Into<String>) {
        let snippet_id = snippet_id.into();
        let mut inner = self.shared.lock();
        if inner.pending.is_some() {
            tracing::debug!(
                "discarding unsaved changes of {:?} on switch to {}",
                inner.session,
                snippet_id
            );
        }
        inner.reset();
        inner.session = Some(snippet_id);
        inner.last_saved = None;
    }

    /// Save whatever is pending for the current session, then switch.
    ///
    /// # Errors
    /// Returns the save error; the switch does not happen in that case.
    pub async fn flush_then_switch(
        &self,
        snippet_id: impl Into<String>,
    ) -> Result<Option<Snippet>, RemoteError> {
        let saved = self.save_now(None).await?;
        self.switch_session(snippet_id);
        Ok(saved)
    }

    /// Record a full snapshot of the editable fields and restart the timer.
    ///
    /// Must be called from within a Tokio runtime. Ignored when no session
    /// is active.
    pub fn mark_dirty(&self, snapshot: UpdateSnippetRequest) {
        let mut inner = self.shared.lock();
        if inner.session.is_none() {
            tracing::debug!("mark_dirty without an active session ignored");
            return;
        }
        inner.pending = Some(snapshot);
        inner.dirty = true;
        inner.cancel_timer();
        if !self.shared.enabled {
            return;
        }

        let epoch = inner.epoch;
        let delay = self.shared.delay;
        let shared = Arc::clone(&self.shared);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The save runs in its own task so re-arming the timer never
            // aborts a save that already started.
            tokio::spawn(async move {
                let _ = shared.run_save(epoch, None).await;
            });
        }));
    }

    /// Cancel the timer and save immediately.
    ///
    /// # Arguments
    /// - `snapshot`: Data to save; when `None`, the pending snapshot is used.
    ///
    /// # Returns
    /// The saved snippet, or `None` when there was nothing to save.
    ///
    /// # Errors
    /// Returns the saver's error. The controller stays dirty.
    pub async fn save_now(
        &self,
        snapshot: Option<UpdateSnippetRequest>,
    ) -> Result<Option<Snippet>, RemoteError> {
        let epoch = {
            let mut inner = self.shared.lock();
            inner.cancel_timer();
            inner.epoch
        };
        self.shared.run_save(epoch, snapshot).await
    }

    /// Drop the pending snapshot and timer without saving.
    pub fn cancel_save(&self) {
        let mut inner = self.shared.lock();
        let session = inner.session.take();
        inner.reset();
        inner.session = session;
    }
}

impl<S: SnippetSaver + 'static> Drop for AutoSaver<S> {
    fn drop(&mut self) {
        self.shared.lock().cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    const DELAY: Duration = Duration::from_millis(1500);

    #[derive(Clone, Default)]
    struct RecordingSaver {
        calls: Arc<Mutex<Vec<(String, String)>>>,
        latency: Duration,
        fail: Arc<AtomicBool>,
    }

    impl RecordingSaver {
        fn with_latency(latency: Duration) -> Self {
            Self {
                latency,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SnippetSaver for RecordingSaver {
        async fn save(&self, id: &str, snapshot: UpdateSnippetRequest) -> Result<Snippet, RemoteError> {
            let code = snapshot.code.clone().unwrap_or_default();
            self.calls.lock().unwrap().push((id.to_string(), code.clone()));
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(RemoteError::Failed("boom".into()));
            }
            let mut snippet = Snippet::new("t".into(), code, "rust".into());
            snippet.id = id.to_string();
            Ok(snippet)
        }
    }

    fn edit(code: &str) -> UpdateSnippetRequest {
        UpdateSnippetRequest {
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    fn saver_with(recorder: &RecordingSaver) -> AutoSaver<RecordingSaver> {
        let saver = AutoSaver::new(recorder.clone(), DELAY);
        saver.switch_session("s1");
        saver
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_saves_once_with_last_snapshot() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);

        for code in ["a", "ab", "abc"] {
            saver.mark_dirty(edit(code));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert!(recorder.calls().is_empty());
        assert_eq!(saver.state(), SaveState::Dirty);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(recorder.calls(), vec![("s1".to_string(), "abc".to_string())]);
        let status = saver.status();
        assert_eq!(status.state, SaveState::Clean);
        assert!(status.last_saved.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_cancels_timer_and_saves_once() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("one"));
        saver.mark_dirty(edit("two"));
        let saved = saver.save_now(None).await.unwrap().unwrap();
        assert_eq!(saved.code, "two");

        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(recorder.calls().len(), 1);
        assert_eq!(saver.state(), SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_prefers_explicit_data_and_noops_when_clean() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);
        assert_eq!(saver.save_now(None).await.unwrap(), None);

        saver.mark_dirty(edit("pending"));
        let saved = saver.save_now(Some(edit("explicit"))).await.unwrap().unwrap();
        assert_eq!(saved.code, "explicit");
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_during_save_triggers_exactly_one_more_save() {
        let recorder = RecordingSaver::with_latency(Duration::from_millis(500));
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("first"));
        tokio::time::sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(saver.state(), SaveState::Saving);

        saver.mark_dirty(edit("second"));
        assert_eq!(saver.state(), SaveState::DirtyWhileSaving);

        tokio::time::sleep(DELAY * 4).await;
        let codes: Vec<String> = recorder.calls().into_iter().map(|(_, c)| c).collect();
        assert_eq!(codes, vec!["first", "second"]);
        assert_eq!(saver.state(), SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_timer_save_is_not_retried() {
        let recorder = RecordingSaver::default();
        recorder.fail.store(true, Ordering::SeqCst);
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("lost"));
        tokio::time::sleep(DELAY * 2).await;
        let status = saver.status();
        assert_eq!(status.state, SaveState::Dirty);
        assert!(status.last_error.is_some());

        tokio::time::sleep(DELAY * 4).await;
        assert_eq!(recorder.calls().len(), 1);
        // Nothing pending any more: an explicit save has nothing to send.
        recorder.fail.store(false, Ordering::SeqCst);
        assert_eq!(saver.save_now(None).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_propagates_errors() {
        let recorder = RecordingSaver::default();
        recorder.fail.store(true, Ordering::SeqCst);
        let saver = saver_with(&recorder);

        let err = saver.save_now(Some(edit("x"))).await.unwrap_err();
        assert_eq!(err, RemoteError::Failed("boom".into()));
        assert_eq!(saver.state(), SaveState::Dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_sessions_drops_pending_without_saving() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("unsaved"));
        saver.switch_session("s2");
        assert_eq!(saver.state(), SaveState::Clean);
        tokio::time::sleep(DELAY * 3).await;
        assert!(recorder.calls().is_empty());
        assert_eq!(saver.status().session.as_deref(), Some("s2"));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_then_switch_saves_previous_session_first() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("keep me"));
        saver.flush_then_switch("s2").await.unwrap();
        assert_eq!(recorder.calls(), vec![("s1".to_string(), "keep me".to_string())]);
        assert_eq!(saver.status().session.as_deref(), Some("s2"));
        assert_eq!(saver.state(), SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_save_discards_pending() {
        let recorder = RecordingSaver::default();
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("discard"));
        saver.cancel_save();
        assert_eq!(saver.state(), SaveState::Clean);
        tokio::time::sleep(DELAY * 3).await;
        assert!(recorder.calls().is_empty());
        assert_eq!(saver.status().session.as_deref(), Some("s1"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_after_switch_does_not_touch_new_session() {
        let recorder = RecordingSaver::with_latency(Duration::from_millis(500));
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("old"));
        tokio::time::sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(saver.state(), SaveState::Saving);
        saver.switch_session("s2");

        assert_eq!(saver.state(), SaveState::Clean);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let status = saver.status();
        assert_eq!(status.state, SaveState::Clean);
        assert_eq!(status.last_saved, None);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_save_reports_clean_and_keeps_new_edits() {
        let recorder = RecordingSaver::with_latency(Duration::from_millis(500));
        let saver = saver_with(&recorder);

        saver.mark_dirty(edit("in flight"));
        tokio::time::sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(saver.state(), SaveState::Saving);
        saver.cancel_save();
        assert_eq!(saver.state(), SaveState::Clean);

        saver.mark_dirty(edit("after cancel"));
        tokio::time::sleep(Duration::from_millis(600)).await;
        // The earlier save finishing must not mark the new edit as saved.
        assert_eq!(saver.state(), SaveState::Dirty);
        assert_eq!(saver.status().last_saved, None);

        tokio::time::sleep(DELAY * 2).await;
        let codes: Vec<String> = recorder.calls().into_iter().map(|(_, c)| c).collect();
        assert_eq!(codes, vec!["in flight", "after cancel"]);
        assert_eq!(saver.state(), SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_controller_only_saves_explicitly() {
        let recorder = RecordingSaver::default();
        let saver = AutoSaver::with_enabled(recorder.clone(), DELAY, false);
        saver.switch_session("s1");

        saver.mark_dirty(edit("manual"));
        tokio::time::sleep(DELAY * 3).await;
        assert!(recorder.calls().is_empty());
        assert_eq!(saver.state(), SaveState::Dirty);
        saver.save_now(None).await.unwrap();
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_without_session_are_ignored() {
        let recorder = RecordingSaver::default();
        let saver = AutoSaver::new(recorder.clone(), DELAY);
        saver.mark_dirty(edit("x"));
        assert_eq!(saver.state(), SaveState::Clean);
        assert_eq!(saver.delay(), DELAY);
    }
}
