//! Per-entry edit buffer for the bounty field.
//!
//! While an admin types into a card, remote echoes of that entry (their
//! own earlier writes, or another admin's) must not overwrite the draft.
//! The buffer is a two-state machine:
//!
//! ```text
//!   Synced --focus/input--> Editing --commit--> Synced
//!     ^  live updates applied     live updates ignored
//! ```

use serde::Serialize;

use crate::entry::parse_bounty_input;
use crate::types::Bounty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    Synced,
    Editing,
}

/// Result of leaving the editing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Issue exactly one write with this value.
    Write(Bounty),
    /// The draft was not a number; nothing is written.
    Rejected,
    /// The buffer was not being edited.
    Idle,
}

#[derive(Debug, Clone)]
pub struct EditBuffer {
    state: EditState,
    draft: String,
    live: Bounty,
}

impl EditBuffer {
    pub fn new(live: Bounty) -> Self {
        Self {
            state: EditState::Synced,
            draft: live.to_string(),
            live,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    /// The text currently shown in the input.
    pub fn value(&self) -> &str {
        &self.draft
    }

    /// Last live value seen, whether or not it is displayed.
    pub fn live(&self) -> Bounty {
        self.live
    }

    /// Record a live value delivered by the store.
    ///
    /// Returns `true` when the visible value changed.
    pub fn on_live_update(&mut self, live: Bounty) -> bool {
        self.live = live;
        if self.is_editing() {
            return false;
        }
        let shown = live.to_string();
        if shown == self.draft {
            return false;
        }
        self.draft = shown;
        true
    }

    pub fn focus(&mut self) {
        self.state = EditState::Editing;
    }

    /// Replace the draft text. Typing implies focus.
    pub fn input(&mut self, text: impl Into<String>) {
        self.state = EditState::Editing;
        self.draft = text.into();
    }

    /// Leave editing (blur or Enter) and decide what to write.
    ///
    /// The buffer returns to `Synced` and shows the last known live value
    /// until the write echoes back.
    pub fn commit(&mut self) -> Commit {
        if !self.is_editing() {
            return Commit::Idle;
        }
        let outcome = match parse_bounty_input(&self.draft) {
            Some(value) => Commit::Write(value),
            None => Commit::Rejected,
        };
        self.state = EditState::Synced;
        self.draft = self.live.to_string();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_synced() {
        let buf = EditBuffer::new(12);
        assert_eq!(buf.state(), EditState::Synced);
        assert_eq!(buf.value(), "12");
    }

    #[test]
    fn test_synced_buffer_tracks_live() {
        let mut buf = EditBuffer::new(12);
        assert!(buf.on_live_update(15));
        assert_eq!(buf.value(), "15");
        assert!(!buf.on_live_update(15));
    }

    #[test]
    fn test_editing_ignores_live_updates() {
        let mut buf = EditBuffer::new(12);
        buf.focus();
        buf.input("4");
        assert!(!buf.on_live_update(99));
        assert!(!buf.on_live_update(100));
        assert_eq!(buf.value(), "4");
        assert_eq!(buf.live(), 100);
    }

    #[test]
    fn test_commit_writes_once_and_resyncs() {
        let mut buf = EditBuffer::new(12);
        buf.focus();
        buf.input("40");
        assert_eq!(buf.commit(), Commit::Write(40));
        assert_eq!(buf.state(), EditState::Synced);
        assert_eq!(buf.value(), "12");

        // A second blur without focus must not write again.
        assert_eq!(buf.commit(), Commit::Idle);

        // The echo of our own write lands.
        assert!(buf.on_live_update(40));
        assert_eq!(buf.value(), "40");
    }

    #[test]
    fn test_commit_clamps_negative() {
        let mut buf = EditBuffer::new(3);
        buf.input("-5");
        assert_eq!(buf.commit(), Commit::Write(0));
    }

    #[test]
    fn test_commit_rejects_garbage() {
        let mut buf = EditBuffer::new(3);
        buf.input("abc");
        assert_eq!(buf.commit(), Commit::Rejected);
        assert_eq!(buf.state(), EditState::Synced);
        assert_eq!(buf.value(), "3");
    }

    #[test]
    fn test_focus_without_typing_rewrites_current_value() {
        let mut buf = EditBuffer::new(8);
        buf.focus();
        buf.on_live_update(9);
        assert_eq!(buf.commit(), Commit::Write(8));
    }

    #[test]
    fn test_input_implies_focus() {
        let mut buf = EditBuffer::new(1);
        buf.input("2");
        assert!(buf.is_editing());
    }
}
