//! The seam between a board view and the document store.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use wanted_core::collection::CollectionPath;
use wanted_core::entry::{Entry, NewEntry};
use wanted_core::types::{Bounty, EntryId};
use wanted_store::{DocumentStore, Identity, Snapshot, StoreError};

use crate::error::BoardError;

/// Stream of full collection snapshots. Ends when the subscription closes.
pub type SnapshotStream = BoxStream<'static, Result<Snapshot, BoardError>>;

/// Operations a board view needs from its backing store.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn sign_in_anonymously(&self) -> Result<Identity, BoardError>;

    /// Give up an identity issued by [`sign_in_anonymously`](Self::sign_in_anonymously).
    async fn sign_out(&self, identity: &Identity);

    async fn subscribe(&self, identity: &Identity) -> Result<SnapshotStream, BoardError>;

    async fn create(&self, identity: &Identity, entry: NewEntry) -> Result<Entry, BoardError>;

    async fn set_bounty(
        &self,
        identity: &Identity,
        id: EntryId,
        bounty: Bounty,
    ) -> Result<Entry, BoardError>;

    /// Returns `false` when the document did not exist.
    async fn delete(&self, identity: &Identity, id: EntryId) -> Result<bool, BoardError>;
}

/// [`Backend`] over an in-process [`DocumentStore`], bound to one
/// collection.
#[derive(Clone)]
pub struct StoreBackend {
    store: Arc<DocumentStore>,
    path: CollectionPath,
}

impl StoreBackend {
    pub fn new(store: Arc<DocumentStore>, path: CollectionPath) -> Self {
        Self { store, path }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }
}

#[async_trait]
impl Backend for StoreBackend {
    async fn sign_in_anonymously(&self) -> Result<Identity, BoardError> {
        Ok(self.store.sign_in_anonymously().await)
    }

    async fn sign_out(&self, identity: &Identity) {
        self.store.auth().revoke(identity).await;
    }

    async fn subscribe(&self, identity: &Identity) -> Result<SnapshotStream, BoardError> {
        let subscription = self.store.subscribe(identity, &self.path).await?;
        let snapshots = stream::unfold(subscription, |mut sub| async move {
            match sub.next().await {
                Ok(snapshot) => Some((Ok(snapshot), sub)),
                Err(StoreError::Closed) => None,
                Err(e) => Some((Err(BoardError::from(e)), sub)),
            }
        });
        Ok(snapshots.boxed())
    }

    async fn create(&self, identity: &Identity, entry: NewEntry) -> Result<Entry, BoardError> {
        Ok(self.store.add(identity, &self.path, entry).await?)
    }

    async fn set_bounty(
        &self,
        identity: &Identity,
        id: EntryId,
        bounty: Bounty,
    ) -> Result<Entry, BoardError> {
        Ok(self
            .store
            .update_bounty(identity, &self.path, id, bounty)
            .await?)
    }

    async fn delete(&self, identity: &Identity, id: EntryId) -> Result<bool, BoardError> {
        Ok(self.store.delete(identity, &self.path, id).await?)
    }
}
