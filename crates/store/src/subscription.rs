//! Live snapshot subscriptions.

use std::sync::Arc;

use tokio::sync::watch;
use wanted_core::entry::Entry;

use crate::error::StoreError;

/// Full contents of a collection, in delivery order.
pub type Snapshot = Arc<Vec<Entry>>;

/// A live view of one collection.
///
/// The first call to [`next`](Subscription::next) yields the current
/// contents immediately; later calls wait for the next change. Changes
/// that land between two calls collapse into the latest snapshot, which
/// is all a full-replace consumer needs.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    delivered_initial: bool,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self {
            rx,
            delivered_initial: false,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// Returns [`StoreError::Closed`] once the store drops the collection.
    pub async fn next(&mut self) -> Result<Snapshot, StoreError> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Ok(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.map_err(|_| StoreError::Closed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
