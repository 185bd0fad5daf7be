//! Event log service.
//!
//! [`EventLog`] subscribes to the [`EventBus`](crate::bus::EventBus),
//! traces every [`BoardEvent`] and keeps the most recent ones in memory.
//! Nothing is persisted; history is lost on restart.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::bus::BoardEvent;

/// Number of events retained for the activity feed.
pub const RECENT_CAPACITY: usize = 100;

/// Background subscriber that logs events and retains a bounded history.
#[derive(Default)]
pub struct EventLog {
    recent: RwLock<VecDeque<BoardEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the logging loop until the bus is dropped.
    pub async fn run(self: Arc<Self>, mut receiver: broadcast::Receiver<BoardEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.record(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event log shutting down");
                    break;
                }
            }
        }
    }

    async fn record(&self, event: BoardEvent) {
        tracing::info!(
            event_type = %event.event_type,
            entry_id = ?event.entry_id,
            actor = ?event.actor_uid,
            payload = %event.payload,
            "Board event"
        );

        let mut recent = self.recent.write().await;
        if recent.len() == RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(event);
    }

    /// Most recent events, newest first.
    pub async fn recent(&self) -> Vec<BoardEvent> {
        self.recent.read().await.iter().rev().cloned().collect()
    }
}
