//! Edit buffers for every card on the board, keyed by entry id.

use std::collections::HashMap;

use serde::Serialize;
use wanted_core::edit_buffer::{EditBuffer, EditState};
use wanted_core::entry::Entry;
use wanted_core::types::EntryId;

/// What a client renders for one card's bounty input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub id: EntryId,
    pub value: String,
    pub state: EditState,
}

impl BufferView {
    fn of(id: EntryId, buffer: &EditBuffer) -> Self {
        Self {
            id,
            value: buffer.value().to_string(),
            state: buffer.state(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EditBuffers {
    buffers: HashMap<EntryId, EditBuffer>,
}

impl EditBuffers {
    /// Align buffers with a fresh live set.
    ///
    /// Buffers of vanished entries are dropped, new entries get a synced
    /// buffer, and the rest see the live value (ignored while editing).
    /// Returns the ids whose visible value changed.
    pub fn reconcile(&mut self, entries: &[Entry]) -> Vec<EntryId> {
        self.buffers
            .retain(|id, _| entries.iter().any(|e| e.id == *id));

        let mut changed = Vec::new();
        for entry in entries {
            match self.buffers.get_mut(&entry.id) {
                Some(buffer) => {
                    if buffer.on_live_update(entry.bounty) {
                        changed.push(entry.id);
                    }
                }
                None => {
                    self.buffers.insert(entry.id, EditBuffer::new(entry.bounty));
                }
            }
        }
        changed
    }

    pub fn get(&self, id: &EntryId) -> Option<&EditBuffer> {
        self.buffers.get(id)
    }

    pub fn get_mut(&mut self, id: &EntryId) -> Option<&mut EditBuffer> {
        self.buffers.get_mut(id)
    }

    pub fn view(&self, id: &EntryId) -> Option<BufferView> {
        self.buffers.get(id).map(|b| BufferView::of(*id, b))
    }

    pub fn views(&self) -> Vec<BufferView> {
        self.buffers
            .iter()
            .map(|(id, b)| BufferView::of(*id, b))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
