//! Debounced ranking.
//!
//! Derives the displayed order from the live set. Every change to the
//! live set re-arms a [`Debouncer`]; only when the set has been quiet for
//! the whole delay is a snapshot sorted and published.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wanted_core::entry::Entry;
use wanted_core::ranking::rank_by_bounty;

use crate::debounce::Debouncer;
use crate::live_set::LiveState;

/// Default quiet period before the board re-sorts.
pub const DEFAULT_SORT_DELAY: Duration = Duration::from_millis(750);

/// The order actually shown.
#[derive(Debug, Clone, Default)]
pub struct DisplayedRanking {
    pub entries: Arc<Vec<Entry>>,
    /// Number of times the ranking has been recomputed.
    pub revision: u64,
}

/// Re-sort the live set after each quiet period until cancelled.
///
/// A pending sort is dropped together with the debouncer when the loop
/// exits, so nothing is published after teardown.
pub(crate) async fn run_ranking(
    mut live: watch::Receiver<LiveState>,
    ranking: Arc<watch::Sender<DisplayedRanking>>,
    delay: Duration,
    cancel: CancellationToken,
) {
    let mut debouncer = Debouncer::new(delay);

    loop {
        let snapshot = Arc::clone(&live.borrow_and_update().entries);
        let target = Arc::clone(&ranking);
        debouncer.schedule(move || {
            let sorted = rank_by_bounty(&snapshot);
            target.send_modify(|displayed| {
                displayed.entries = Arc::new(sorted);
                displayed.revision += 1;
            });
        });

        tokio::select! {
            () = cancel.cancelled() => break,
            changed = live.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debouncer.cancel();
    tracing::debug!("Ranking task stopped");
}
