//! The document store.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{watch, RwLock};
use wanted_core::avatar::generate_avatar;
use wanted_core::collection::CollectionPath;
use wanted_core::entry::{Entry, NewEntry, STATUS_WANTED};
use wanted_core::types::{Bounty, EntryId};
use wanted_events::{BoardEvent, EventBus, ENTRY_BOUNTY_UPDATED, ENTRY_CREATED, ENTRY_REMOVED};

use crate::auth::{AuthService, Identity};
use crate::error::StoreError;
use crate::subscription::{Snapshot, Subscription};

/// One collection: its documents in insertion order plus the channel
/// that fans snapshots out to subscribers.
struct Collection {
    docs: IndexMap<EntryId, Entry>,
    tx: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            docs: IndexMap::new(),
            tx,
        }
    }

    fn publish(&self) {
        let snapshot: Snapshot = Arc::new(self.docs.values().cloned().collect());
        self.tx.send_replace(snapshot);
    }
}

/// In-memory document store with anonymous auth and live snapshots.
///
/// Cheap to share behind `Arc`. Every operation checks the caller's
/// identity first; there are no other access rules.
pub struct DocumentStore {
    auth: AuthService,
    collections: RwLock<HashMap<CollectionPath, Collection>>,
    event_bus: Option<Arc<EventBus>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            auth: AuthService::new(),
            collections: RwLock::new(HashMap::new()),
            event_bus: None,
        }
    }

    /// Publish a [`BoardEvent`] for every successful mutation.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub async fn sign_in_anonymously(&self) -> Identity {
        self.auth.sign_in_anonymously().await
    }

    /// Open a live subscription to a collection.
    ///
    /// Subscribing to a collection that has never been written creates it
    /// empty.
    pub async fn subscribe(
        &self,
        identity: &Identity,
        path: &CollectionPath,
    ) -> Result<Subscription, StoreError> {
        self.auth.authorize(identity).await?;
        let mut collections = self.collections.write().await;
        let collection = collections
            .entry(path.clone())
            .or_insert_with(Collection::new);
        tracing::debug!(uid = %identity.uid, collection = %path, "Subscribed");
        Ok(Subscription::new(collection.tx.subscribe()))
    }

    /// Current contents of a collection, in delivery order.
    pub async fn list(
        &self,
        identity: &Identity,
        path: &CollectionPath,
    ) -> Result<Vec<Entry>, StoreError> {
        self.auth.authorize(identity).await?;
        Ok(self
            .collections
            .read()
            .await
            .get(path)
            .map(|c| c.docs.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Create a document, assigning its id, avatar, timestamp and status.
    pub async fn add(
        &self,
        identity: &Identity,
        path: &CollectionPath,
        new: NewEntry,
    ) -> Result<Entry, StoreError> {
        self.auth.authorize(identity).await?;
        let entry = materialize(new);
        self.insert(path, std::slice::from_ref(&entry)).await;
        self.emit_created(identity, path, &entry);
        Ok(entry)
    }

    /// Create several documents at once; subscribers see one snapshot.
    pub async fn add_batch(
        &self,
        identity: &Identity,
        path: &CollectionPath,
        batch: Vec<NewEntry>,
    ) -> Result<Vec<Entry>, StoreError> {
        self.auth.authorize(identity).await?;
        let created: Vec<Entry> = batch.into_iter().map(materialize).collect();
        self.insert(path, &created).await;
        for entry in &created {
            self.emit_created(identity, path, entry);
        }
        Ok(created)
    }

    /// Overwrite the bounty field of one document.
    pub async fn update_bounty(
        &self,
        identity: &Identity,
        path: &CollectionPath,
        id: EntryId,
        bounty: Bounty,
    ) -> Result<Entry, StoreError> {
        self.auth.authorize(identity).await?;

        let (previous, updated) = {
            let mut collections = self.collections.write().await;
            let collection = collections.get_mut(path).ok_or_else(|| not_found(path, id))?;
            let doc = collection
                .docs
                .get_mut(&id)
                .ok_or_else(|| not_found(path, id))?;
            let previous = doc.bounty;
            doc.bounty = bounty;
            let updated = doc.clone();
            collection.publish();
            (previous, updated)
        };

        self.emit(
            BoardEvent::new(ENTRY_BOUNTY_UPDATED)
                .with_entry(path.as_str(), id)
                .with_actor(&identity.uid)
                .with_payload(serde_json::json!({ "from": previous, "to": bounty })),
        );
        Ok(updated)
    }

    /// Delete a document. Returns `false` if it did not exist.
    pub async fn delete(
        &self,
        identity: &Identity,
        path: &CollectionPath,
        id: EntryId,
    ) -> Result<bool, StoreError> {
        self.auth.authorize(identity).await?;

        let removed = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(path) {
                Some(collection) => {
                    // shift_remove keeps the delivery order of the rest.
                    let removed = collection.docs.shift_remove(&id);
                    if removed.is_some() {
                        collection.publish();
                    }
                    removed
                }
                None => None,
            }
        };

        if let Some(entry) = &removed {
            self.emit(
                BoardEvent::new(ENTRY_REMOVED)
                    .with_entry(path.as_str(), id)
                    .with_actor(&identity.uid)
                    .with_payload(serde_json::json!({ "name": entry.name })),
            );
        }
        Ok(removed.is_some())
    }

    pub async fn document_count(&self, path: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(path)
            .map_or(0, |c| c.docs.len())
    }

    /// Drop every collection, ending all subscriptions with
    /// [`StoreError::Closed`].
    pub async fn close(&self) {
        let mut collections = self.collections.write().await;
        let count = collections.len();
        collections.clear();
        tracing::info!(count, "Document store closed");
    }

    async fn insert(&self, path: &CollectionPath, entries: &[Entry]) {
        let mut collections = self.collections.write().await;
        let collection = collections
            .entry(path.clone())
            .or_insert_with(Collection::new);
        for entry in entries {
            collection.docs.insert(entry.id, entry.clone());
        }
        collection.publish();
    }

    fn emit_created(&self, identity: &Identity, path: &CollectionPath, entry: &Entry) {
        self.emit(
            BoardEvent::new(ENTRY_CREATED)
                .with_entry(path.as_str(), entry.id)
                .with_actor(&identity.uid)
                .with_payload(serde_json::json!({
                    "name": entry.name,
                    "bounty": entry.bounty,
                })),
        );
    }

    fn emit(&self, event: BoardEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn materialize(new: NewEntry) -> Entry {
    let image = new.image.unwrap_or_else(|| generate_avatar(&new.name));
    Entry {
        id: uuid::Uuid::new_v4(),
        name: new.name,
        bounty: new.bounty,
        image,
        created_at: chrono::Utc::now(),
        status: STATUS_WANTED.to_string(),
    }
}

fn not_found(path: &CollectionPath, id: EntryId) -> StoreError {
    StoreError::NotFound {
        collection: path.to_string(),
        id,
    }
}
