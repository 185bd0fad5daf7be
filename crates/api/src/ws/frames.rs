//! JSON frames exchanged over the live board socket.
//!
//! Server to client:
//!
//! ```text
//! {"type":"snapshot","entries":[..],"loading":false,"maxBounty":205}
//! {"type":"ranking","revision":3,"cards":[..]}
//! {"type":"buffer","id":"..","value":"42","state":"editing"}
//! {"type":"error","code":"FORBIDDEN","message":".."}
//! ```
//!
//! Client to server (admin sessions only):
//!
//! ```text
//! {"type":"focus","id":".."}
//! {"type":"input","id":"..","value":"42"}
//! {"type":"commit","id":".."}
//! {"type":"adjust","id":"..","delta":5}
//! ```

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use wanted_board::edit::BufferView;
use wanted_board::{BoardSnapshot, LiveState};
use wanted_core::entry::Entry;
use wanted_core::ranking::{max_bounty, BoardCard};
use wanted_core::types::{Bounty, EntryId};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    Snapshot {
        entries: Vec<Entry>,
        loading: bool,
        max_bounty: Bounty,
    },
    Ranking {
        revision: u64,
        cards: Vec<BoardCard>,
    },
    Buffer(BufferView),
    Error {
        code: &'static str,
        message: String,
    },
}

impl ServerFrame {
    pub fn snapshot(live: &LiveState) -> Self {
        ServerFrame::Snapshot {
            entries: live.entries.as_ref().clone(),
            loading: live.loading,
            max_bounty: max_bounty(&live.entries),
        }
    }

    pub fn ranking(revision: u64, board: BoardSnapshot) -> Self {
        ServerFrame::Ranking {
            revision,
            cards: board.cards,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        ServerFrame::Error {
            code,
            message: message.into(),
        }
    }

    pub fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode WebSocket frame");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    Focus { id: EntryId },
    Input { id: EntryId, value: String },
    Commit { id: EntryId },
    Adjust { id: EntryId, delta: i64 },
}
