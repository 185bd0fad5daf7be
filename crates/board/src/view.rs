//! A mounted board: live set, debounced ranking, edit buffers and the
//! admin write operations.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wanted_core::edit_buffer::Commit;
use wanted_core::entry::{apply_delta, parse_bounty_input, Entry, NewEntry};
use wanted_core::ranking::{build_cards, max_bounty, BoardCard};
use wanted_core::types::{Bounty, EntryId};
use wanted_store::Identity;

use crate::backend::Backend;
use crate::edit::{BufferView, EditBuffers};
use crate::error::BoardError;
use crate::live_set::{run_sync, LiveState, SyncTargets};
use crate::ranking::{run_ranking, DisplayedRanking, DEFAULT_SORT_DELAY};

#[derive(Debug, Clone)]
pub struct BoardOptions {
    /// Quiet period before the displayed order is recomputed.
    pub sort_delay: Duration,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            sort_delay: DEFAULT_SORT_DELAY,
        }
    }
}

/// Everything a page needs to render the board at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub loading: bool,
    pub max_bounty: Bounty,
    pub total: usize,
    pub cards: Vec<BoardCard>,
}

struct Shared {
    backend: Arc<dyn Backend>,
    identity: watch::Receiver<Option<Identity>>,
    live: watch::Receiver<LiveState>,
    ranking: watch::Receiver<DisplayedRanking>,
    buffers: Arc<Mutex<EditBuffers>>,
}

/// One mounted board view.
///
/// Mounting signs in and subscribes in the background. Dropping the view
/// (or calling [`unmount`](Self::unmount)) stops the subscription,
/// discards any pending re-sort and signs the anonymous identity out.
pub struct BoardView {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    sync: Option<JoinHandle<()>>,
    ranking: JoinHandle<()>,
}

impl BoardView {
    pub fn mount(backend: Arc<dyn Backend>, options: BoardOptions) -> Self {
        let (identity_tx, identity_rx) = watch::channel(None);
        let (live_tx, live_rx) = watch::channel(LiveState::default());
        let (ranking_tx, ranking_rx) = watch::channel(DisplayedRanking::default());
        let buffers = Arc::new(Mutex::new(EditBuffers::default()));
        let cancel = CancellationToken::new();

        let sync = tokio::spawn(run_sync(
            Arc::clone(&backend),
            SyncTargets {
                identity: identity_tx,
                live: Arc::new(live_tx),
                buffers: Arc::clone(&buffers),
            },
            cancel.clone(),
        ));
        let ranking = tokio::spawn(run_ranking(
            live_rx.clone(),
            Arc::new(ranking_tx),
            options.sort_delay,
            cancel.clone(),
        ));

        tracing::debug!(sort_delay_ms = options.sort_delay.as_millis() as u64, "Board mounted");

        Self {
            shared: Arc::new(Shared {
                backend,
                identity: identity_rx,
                live: live_rx,
                ranking: ranking_rx,
                buffers,
            }),
            cancel,
            sync: Some(sync),
            ranking,
        }
    }

    /// Tear the view down and wait until its identity is signed out.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(sync) = self.sync.take() {
            if let Err(e) = sync.await {
                tracing::warn!(error = %e, "Live set sync task failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn live(&self) -> LiveState {
        self.shared.live.borrow().clone()
    }

    pub fn ranking(&self) -> DisplayedRanking {
        self.shared.ranking.borrow().clone()
    }

    pub fn watch_live(&self) -> watch::Receiver<LiveState> {
        self.shared.live.clone()
    }

    pub fn watch_ranking(&self) -> watch::Receiver<DisplayedRanking> {
        self.shared.ranking.clone()
    }

    /// Displayed order paired with live values.
    pub fn snapshot(&self) -> BoardSnapshot {
        let live = self.live();
        let ranking = self.ranking();
        BoardSnapshot {
            loading: live.loading,
            max_bounty: max_bounty(&live.entries),
            total: live.entries.len(),
            cards: build_cards(&ranking.entries, &live.entries),
        }
    }

    /// Resolve once the first snapshot arrived or the subscription failed.
    pub async fn wait_until_loaded(&self) -> LiveState {
        let mut rx = self.shared.live.clone();
        let state = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.live(),
        };
        state
    }

    pub async fn buffer(&self, id: EntryId) -> Option<BufferView> {
        self.shared.buffers.lock().await.view(&id)
    }

    pub async fn buffers(&self) -> Vec<BufferView> {
        self.shared.buffers.lock().await.views()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Post a new bounty. The name is trimmed; negative amounts clamp to 0.
    pub async fn create(&self, name: &str, bounty: i64) -> Result<Entry, BoardError> {
        let new = NewEntry::new(name, bounty)?;
        let identity = self.identity().await?;
        let entry = self.shared.backend.create(&identity, new).await?;
        tracing::info!(id = %entry.id, name = %entry.name, bounty = entry.bounty, "Bounty posted");
        Ok(entry)
    }

    /// Add `delta` to the live bounty, flooring at 0.
    ///
    /// Bypasses the edit buffer.
    pub async fn increment_bounty(&self, id: EntryId, delta: i64) -> Result<Entry, BoardError> {
        let current = self
            .live_bounty(id)
            .ok_or(BoardError::NotFound(id))?;
        let identity = self.identity().await?;
        let bounty = apply_delta(current, delta);
        tracing::debug!(%id, delta, bounty, "Adjusting bounty");
        self.shared.backend.set_bounty(&identity, id, bounty).await
    }

    /// Write a bounty typed by the admin.
    ///
    /// Input that is not a number writes nothing and yields `None`.
    pub async fn set_bounty(&self, id: EntryId, raw: &str) -> Result<Option<Entry>, BoardError> {
        let Some(bounty) = parse_bounty_input(raw) else {
            tracing::debug!(%id, raw, "Ignoring non-numeric bounty input");
            return Ok(None);
        };
        let identity = self.identity().await?;
        let entry = self.shared.backend.set_bounty(&identity, id, bounty).await?;
        Ok(Some(entry))
    }

    /// Delete an entry. Nothing happens unless `confirmed` is set.
    pub async fn remove(&self, id: EntryId, confirmed: bool) -> Result<bool, BoardError> {
        if !confirmed {
            return Ok(false);
        }
        let identity = self.identity().await?;
        let removed = self.shared.backend.delete(&identity, id).await?;
        if removed {
            tracing::info!(%id, "Outlaw removed");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Edit buffers
    // ------------------------------------------------------------------

    pub async fn focus(&self, id: EntryId) -> Result<BufferView, BoardError> {
        let mut buffers = self.shared.buffers.lock().await;
        buffers.get_mut(&id).ok_or(BoardError::NotFound(id))?.focus();
        buffers.view(&id).ok_or(BoardError::NotFound(id))
    }

    pub async fn input(&self, id: EntryId, text: &str) -> Result<BufferView, BoardError> {
        let mut buffers = self.shared.buffers.lock().await;
        buffers.get_mut(&id).ok_or(BoardError::NotFound(id))?.input(text);
        buffers.view(&id).ok_or(BoardError::NotFound(id))
    }

    /// Leave editing and await the resulting write, if any.
    pub async fn commit(&self, id: EntryId) -> Result<Commit, BoardError> {
        let outcome = self.leave_editing(id).await?;
        if let Commit::Write(bounty) = outcome {
            let identity = self.identity().await?;
            self.shared.backend.set_bounty(&identity, id, bounty).await?;
        }
        Ok(outcome)
    }

    /// Leave editing and issue the write in the background.
    ///
    /// Write failures are logged and not retried.
    pub async fn commit_detached(&self, id: EntryId) -> Result<Commit, BoardError> {
        let outcome = self.leave_editing(id).await?;
        if let Commit::Write(bounty) = outcome {
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                let result = match wait_for_identity(shared.identity.clone()).await {
                    Ok(identity) => shared.backend.set_bounty(&identity, id, bounty).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::error!(%id, bounty, error = %e, "Bounty write failed");
                }
            });
        }
        Ok(outcome)
    }

    async fn leave_editing(&self, id: EntryId) -> Result<Commit, BoardError> {
        let mut buffers = self.shared.buffers.lock().await;
        let buffer = buffers.get_mut(&id).ok_or(BoardError::NotFound(id))?;
        Ok(buffer.commit())
    }

    fn live_bounty(&self, id: EntryId) -> Option<Bounty> {
        self.shared
            .live
            .borrow()
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.bounty)
    }

    /// The anonymous identity, once sign-in has completed.
    pub async fn identity(&self) -> Result<Identity, BoardError> {
        wait_for_identity(self.shared.identity.clone()).await
    }
}

async fn wait_for_identity(
    mut rx: watch::Receiver<Option<Identity>>,
) -> Result<Identity, BoardError> {
    let identity = match rx.wait_for(Option::is_some).await {
        Ok(identity) => identity.clone(),
        Err(_) => None,
    };
    identity.ok_or(BoardError::NotSignedIn)
}

impl Drop for BoardView {
    fn drop(&mut self) {
        // The sync task exits on its own once it has signed out.
        self.cancel.cancel();
        self.ranking.abort();
        tracing::debug!("Board unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wanted_core::collection::CollectionPath;
    use wanted_core::edit_buffer::EditState;
    use wanted_core::entry::STATUS_WANTED;
    use wanted_core::ranking::Podium;
    use wanted_store::DocumentStore;

    use crate::backend::StoreBackend;
    use crate::fake::{entry, FakeBackend, Write};

    const DELAY: Duration = DEFAULT_SORT_DELAY;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn quiet_period() {
        settle().await;
        tokio::time::advance(DELAY).await;
        settle().await;
    }

    fn mount_fake() -> (Arc<FakeBackend>, BoardView) {
        let backend = FakeBackend::new();
        let view = BoardView::mount(backend.clone(), BoardOptions::default());
        (backend, view)
    }

    fn ranked_names(view: &BoardView) -> Vec<String> {
        view.ranking().entries.iter().map(|e| e.name.clone()).collect()
    }

    // ------------------------------------------------------------------
    // Loading and ranking
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn empty_board_scales_to_default_max() {
        let (backend, view) = mount_fake();
        assert!(view.snapshot().loading);

        backend.deliver(Vec::new());
        view.wait_until_loaded().await;

        let board = view.snapshot();
        assert!(!board.loading);
        assert_eq!(board.max_bounty, 100);
        assert_eq!(board.total, 0);
        assert!(board.cards.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cards_use_ranked_order_and_live_values() {
        let (backend, view) = mount_fake();
        let a = entry("Jesse", 50);
        let mut b = entry("Belle", 200);
        let c = entry("Doc", 10);
        backend.deliver(vec![a.clone(), b.clone(), c.clone()]);
        view.wait_until_loaded().await;
        quiet_period().await;

        assert_eq!(ranked_names(&view), vec!["Belle", "Jesse", "Doc"]);

        // Belle drops below Jesse: value updates now, position later.
        b.bounty = 20;
        backend.deliver(vec![a.clone(), b.clone(), c.clone()]);
        settle().await;

        let board = view.snapshot();
        assert_eq!(board.cards[0].entry.name, "Belle");
        assert_eq!(board.cards[0].entry.bounty, 20);
        assert_eq!(board.cards[0].podium, Some(Podium::Gold));
        assert_eq!(board.max_bounty, 50);

        quiet_period().await;
        assert_eq!(ranked_names(&view), vec!["Jesse", "Belle", "Doc"]);
        assert_eq!(view.snapshot().cards[0].fill, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_changes_sorts_once() {
        let (backend, view) = mount_fake();
        settle().await;
        let mut a = entry("a", 0);
        let b = entry("b", 25);
        for bounty in 1..=10 {
            a.bounty = bounty * 5;
            backend.deliver(vec![a.clone(), b.clone()]);
            settle().await;
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        settle().await;
        assert_eq!(view.ranking().revision, 0);

        quiet_period().await;
        let ranking = view.ranking();
        assert_eq!(ranking.revision, 1);
        assert_eq!(ranking.entries[0].bounty, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_discards_pending_sort() {
        let (backend, view) = mount_fake();
        backend.deliver(vec![entry("a", 1)]);
        view.wait_until_loaded().await;
        let mut ranking = view.watch_ranking();

        view.unmount().await;
        quiet_period().await;

        assert_eq!(ranking.borrow_and_update().revision, 0);
        assert!(ranking.has_changed().is_err());
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn increment_floors_at_zero() {
        let (backend, view) = mount_fake();
        let a = entry("a", 3);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        let updated = view.increment_bounty(a.id, -100).await.unwrap();
        assert_eq!(updated.bounty, 0);
        assert_eq!(backend.writes(), vec![Write::SetBounty(a.id, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn increment_uses_live_value() {
        let (backend, view) = mount_fake();
        let mut a = entry("a", 3);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        a.bounty = 40;
        backend.deliver(vec![a.clone()]);
        settle().await;

        view.increment_bounty(a.id, 5).await.unwrap();
        assert_eq!(backend.writes(), vec![Write::SetBounty(a.id, 45)]);
    }

    #[tokio::test(start_paused = true)]
    async fn increment_unknown_entry_is_not_found() {
        let (backend, view) = mount_fake();
        backend.deliver(Vec::new());
        view.wait_until_loaded().await;

        let missing = uuid::Uuid::new_v4();
        assert_matches!(
            view.increment_bounty(missing, 5).await,
            Err(BoardError::NotFound(id)) if id == missing
        );
        assert!(backend.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_bounty_clamps_and_rejects() {
        let (backend, view) = mount_fake();
        let a = entry("a", 3);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        let stored = view.set_bounty(a.id, "-5").await.unwrap();
        assert_eq!(stored.map(|e| e.bounty), Some(0));

        assert!(view.set_bounty(a.id, "abc").await.unwrap().is_none());
        assert_eq!(backend.writes(), vec![Write::SetBounty(a.id, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_requires_confirmation() {
        let (backend, view) = mount_fake();
        let a = entry("a", 3);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        assert!(!view.remove(a.id, false).await.unwrap());
        assert!(backend.writes().is_empty());

        assert!(view.remove(a.id, true).await.unwrap());
        settle().await;
        assert!(view.live().entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn create_rejects_blank_name() {
        let (backend, view) = mount_fake();
        backend.deliver(Vec::new());
        view.wait_until_loaded().await;

        assert_matches!(view.create("   ", 10).await, Err(BoardError::Core(_)));
        assert!(backend.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn writes_fail_when_sign_in_failed() {
        let backend = FakeBackend::failing_sign_in();
        let view = BoardView::mount(backend.clone(), BoardOptions::default());
        let state = view.wait_until_loaded().await;
        assert!(state.entries.is_empty());

        assert_matches!(view.create("Kid", 1).await, Err(BoardError::NotSignedIn));
    }

    // ------------------------------------------------------------------
    // Edit buffers
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn editing_buffer_ignores_remote_updates() {
        let (backend, view) = mount_fake();
        let mut a = entry("a", 10);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        view.focus(a.id).await.unwrap();
        view.input(a.id, "42").await.unwrap();

        for bounty in [11, 12, 13] {
            a.bounty = bounty;
            backend.deliver(vec![a.clone()]);
            settle().await;
            let buffer = view.buffer(a.id).await.unwrap();
            assert_eq!(buffer.value, "42");
            assert_eq!(buffer.state, EditState::Editing);
        }

        assert_eq!(view.commit(a.id).await.unwrap(), Commit::Write(42));
        assert_eq!(backend.writes(), vec![Write::SetBounty(a.id, 42)]);

        settle().await;
        let buffer = view.buffer(a.id).await.unwrap();
        assert_eq!(buffer.state, EditState::Synced);
        assert_eq!(buffer.value, "42");
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_commit_writes_nothing() {
        let (backend, view) = mount_fake();
        let a = entry("a", 10);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        view.input(a.id, "12abc").await.unwrap();
        assert_eq!(view.commit(a.id).await.unwrap(), Commit::Rejected);
        assert_eq!(view.commit(a.id).await.unwrap(), Commit::Idle);
        assert!(backend.writes().is_empty());
        assert_eq!(view.buffer(a.id).await.unwrap().value, "10");
    }

    #[tokio::test(start_paused = true)]
    async fn detached_commit_writes_in_background() {
        let (backend, view) = mount_fake();
        let a = entry("a", 10);
        backend.deliver(vec![a.clone()]);
        view.wait_until_loaded().await;

        view.input(a.id, "3.7").await.unwrap();
        assert_eq!(view.commit_detached(a.id).await.unwrap(), Commit::Write(3));
        settle().await;
        assert_eq!(backend.writes(), vec![Write::SetBounty(a.id, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn buffers_follow_membership() {
        let (backend, view) = mount_fake();
        let a = entry("a", 1);
        let b = entry("b", 2);
        backend.deliver(vec![a.clone(), b.clone()]);
        view.wait_until_loaded().await;
        assert_eq!(view.buffers().await.len(), 2);

        backend.deliver(vec![b.clone()]);
        settle().await;
        assert!(view.buffer(a.id).await.is_none());
        assert_matches!(view.focus(a.id).await, Err(BoardError::NotFound(_)));
    }

    // ------------------------------------------------------------------
    // Against the in-memory store
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn posting_a_bounty_reaches_the_ranking() {
        let store = Arc::new(DocumentStore::new());
        let path = CollectionPath::leaderboard("test-app").unwrap();
        let backend = Arc::new(StoreBackend::new(Arc::clone(&store), path));
        let view = BoardView::mount(backend, BoardOptions::default());
        view.wait_until_loaded().await;

        view.create("Jesse James", 50).await.unwrap();
        view.create("Calamity Jane", 5).await.unwrap();
        let bill = view.create("Buffalo Bill", 10).await.unwrap();

        assert_eq!(bill.bounty, 10);
        assert_eq!(bill.status, STATUS_WANTED);
        assert!(bill
            .image
            .starts_with("https://api.dicebear.com/9.x/adventurer/svg?seed=Buffalo%20Bill"));

        settle().await;
        assert!(view.live().entries.iter().any(|e| e.id == bill.id));
        assert!(view.ranking().entries.iter().all(|e| e.id != bill.id));

        quiet_period().await;
        let board = view.snapshot();
        let card = board
            .cards
            .iter()
            .find(|c| c.entry.id == bill.id)
            .unwrap();
        assert_eq!(card.rank, 2);
        assert_eq!(card.podium, Some(Podium::Silver));
    }

    #[tokio::test]
    async fn unmount_revokes_the_anonymous_identity() {
        let store = Arc::new(DocumentStore::new());
        let path = CollectionPath::leaderboard("test-app").unwrap();
        let backend = Arc::new(StoreBackend::new(Arc::clone(&store), path));

        let mut identities = Vec::new();
        for _ in 0..3 {
            let view = BoardView::mount(backend.clone(), BoardOptions::default());
            view.wait_until_loaded().await;
            let identity = view.identity().await.unwrap();
            assert!(store.auth().authorize(&identity).await.is_ok());
            view.unmount().await;
            identities.push(identity);
        }

        for identity in &identities {
            assert!(store.auth().authorize(identity).await.is_err());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_view_signs_out() {
        let (backend, view) = mount_fake();
        let identity = view.identity().await.unwrap();

        drop(view);
        settle().await;

        assert_eq!(backend.signed_out(), vec![identity]);
    }
}
