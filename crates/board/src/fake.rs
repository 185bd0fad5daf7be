//! In-memory [`Backend`] for view tests. Writes echo back as snapshots,
//! like a real store would.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use wanted_core::entry::{Entry, NewEntry, STATUS_WANTED};
use wanted_core::types::{Bounty, EntryId};
use wanted_store::{Identity, Snapshot, StoreError};

use crate::backend::{Backend, SnapshotStream};
use crate::error::BoardError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Write {
    Create(String, Bounty),
    SetBounty(EntryId, Bounty),
    Delete(EntryId),
}

type Delivery = Result<Snapshot, BoardError>;

pub(crate) struct FakeBackend {
    fail_sign_in: bool,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
    docs: Mutex<Vec<Entry>>,
    writes: Mutex<Vec<Write>>,
    signed_out: Mutex<Vec<Identity>>,
}

pub(crate) fn entry(name: &str, bounty: Bounty) -> Entry {
    Entry {
        id: uuid::Uuid::new_v4(),
        name: name.to_string(),
        bounty,
        image: format!("https://img.test/{name}.svg"),
        created_at: chrono::Utc::now(),
        status: STATUS_WANTED.to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    pub fn failing_sign_in() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_sign_in: bool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fail_sign_in,
            tx,
            rx: Mutex::new(Some(rx)),
            docs: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            signed_out: Mutex::new(Vec::new()),
        }
    }

    /// Replace the remote contents and notify the subscriber.
    pub fn deliver(&self, entries: Vec<Entry>) {
        *self.docs.lock().unwrap() = entries.clone();
        let _ = self.tx.send(Ok(Arc::new(entries)));
    }

    pub fn fail(&self, error: BoardError) {
        let _ = self.tx.send(Err(error));
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn signed_out(&self) -> Vec<Identity> {
        self.signed_out.lock().unwrap().clone()
    }

    fn record(&self, write: Write) {
        self.writes.lock().unwrap().push(write);
    }

    fn echo(&self) {
        let docs = self.docs.lock().unwrap().clone();
        let _ = self.tx.send(Ok(Arc::new(docs)));
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn sign_in_anonymously(&self) -> Result<Identity, BoardError> {
        if self.fail_sign_in {
            return Err(StoreError::PermissionDenied("sign-in disabled".into()).into());
        }
        Ok(Identity {
            uid: "anon-test".into(),
        })
    }

    async fn sign_out(&self, identity: &Identity) {
        self.signed_out.lock().unwrap().push(identity.clone());
    }

    async fn subscribe(&self, _identity: &Identity) -> Result<SnapshotStream, BoardError> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("fake backend supports one subscriber");
        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|delivery| (delivery, rx))
        });
        Ok(stream.boxed())
    }

    async fn create(&self, _identity: &Identity, new: NewEntry) -> Result<Entry, BoardError> {
        self.record(Write::Create(new.name.clone(), new.bounty));
        let mut created = entry(&new.name, new.bounty);
        if let Some(image) = new.image {
            created.image = image;
        }
        self.docs.lock().unwrap().push(created.clone());
        self.echo();
        Ok(created)
    }

    async fn set_bounty(
        &self,
        _identity: &Identity,
        id: EntryId,
        bounty: Bounty,
    ) -> Result<Entry, BoardError> {
        self.record(Write::SetBounty(id, bounty));
        let updated = {
            let mut docs = self.docs.lock().unwrap();
            let doc = docs
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(BoardError::NotFound(id))?;
            doc.bounty = bounty;
            doc.clone()
        };
        self.echo();
        Ok(updated)
    }

    async fn delete(&self, _identity: &Identity, id: EntryId) -> Result<bool, BoardError> {
        self.record(Write::Delete(id));
        let removed = {
            let mut docs = self.docs.lock().unwrap();
            let before = docs.len();
            docs.retain(|e| e.id != id);
            docs.len() != before
        };
        if removed {
            self.echo();
        }
        Ok(removed)
    }
}
