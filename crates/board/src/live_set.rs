//! Live set synchronizer.
//!
//! Mirrors the remote collection into a `watch` channel. Every delivery
//! replaces the whole set, so handling is idempotent and does not depend
//! on the order changes were made in.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use wanted_store::{Identity, Snapshot};

use crate::backend::Backend;
use crate::edit::EditBuffers;
use crate::error::BoardError;

/// The locally mirrored collection.
#[derive(Debug, Clone)]
pub struct LiveState {
    pub entries: Snapshot,
    /// `true` until the first snapshot arrives or the subscription fails.
    pub loading: bool,
}

impl Default for LiveState {
    fn default() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            loading: true,
        }
    }
}

/// Handles the synchronizer writes to. It is the only writer of the live set.
pub(crate) struct SyncTargets {
    pub identity: watch::Sender<Option<Identity>>,
    pub live: Arc<watch::Sender<LiveState>>,
    pub buffers: Arc<Mutex<EditBuffers>>,
}

/// Sign in, subscribe, and mirror snapshots until cancelled.
///
/// Failures are logged and leave the view no longer loading. The
/// anonymous identity stays valid for writes until cancellation, then it
/// is signed out.
pub(crate) async fn run_sync(
    backend: Arc<dyn Backend>,
    targets: SyncTargets,
    cancel: CancellationToken,
) {
    let SyncTargets {
        identity,
        live,
        buffers,
    } = targets;

    tokio::select! {
        () = cancel.cancelled() => {
            tracing::debug!("Live set sync cancelled");
        }
        result = sync(backend.as_ref(), &identity, &live, &buffers) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Live set subscription failed");
            }
            live.send_modify(|state| state.loading = false);
        }
    }

    let signed_in = identity.borrow().clone();
    // Writes still waiting for a sign-in give up once the sender is gone.
    drop(identity);
    if let Some(identity) = signed_in {
        cancel.cancelled().await;
        backend.sign_out(&identity).await;
        tracing::debug!(uid = %identity.uid, "Signed out");
    }
}

async fn sync(
    backend: &dyn Backend,
    identity_tx: &watch::Sender<Option<Identity>>,
    live: &watch::Sender<LiveState>,
    buffers: &Mutex<EditBuffers>,
) -> Result<(), BoardError> {
    let identity = backend.sign_in_anonymously().await?;
    tracing::debug!(uid = %identity.uid, "Signed in anonymously");
    identity_tx.send_replace(Some(identity.clone()));

    let mut snapshots = backend.subscribe(&identity).await?;
    while let Some(next) = snapshots.next().await {
        let entries = next?;
        buffers.lock().await.reconcile(&entries);
        live.send_replace(LiveState {
            entries,
            loading: false,
        });
    }

    tracing::debug!("Live set subscription ended");
    Ok(())
}
