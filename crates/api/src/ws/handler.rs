use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use wanted_board::edit::BufferView;
use wanted_board::{BoardError, BoardView};
use wanted_core::edit_buffer::EditState;
use wanted_core::types::EntryId;

use crate::middleware::auth::MaybeAdmin;
use crate::state::AppState;
use crate::ws::frames::{ClientFrame, ServerFrame};
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// Anyone may watch the board. A valid `?token=` (or bearer header)
/// unlocks the edit frames; an invalid one is rejected before upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    admin: MaybeAdmin,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let admin = admin.is_admin();
    ws.on_upgrade(move |socket| handle_socket(socket, state, admin))
}

/// Manage a single WebSocket connection after upgrade.
///
/// 1. Registers the connection and mounts a board view for it.
/// 2. Spawns a sender task forwarding the manager channel to the sink.
/// 3. Spawns a push task turning view changes into frames.
/// 4. Processes inbound frames on the current task.
/// 5. Unmounts and cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, admin: bool) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, admin, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), admin).await;
    let view = Arc::new(BoardView::mount(
        state.backend.clone(),
        state.board_options(),
    ));

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    let push_task = tokio::spawn(push_updates(
        Arc::clone(&view),
        Arc::clone(&state.ws_manager),
        conn_id.clone(),
    ));

    let session = Session {
        conn_id: &conn_id,
        admin,
        view: &view,
        manager: &state.ws_manager,
    };

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => session.handle_text(text.as_str()).await,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    push_task.abort();
    send_task.abort();
    // The push task holds the other reference; the view unmounts once it
    // has been dropped.
    drop(view);
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

struct Session<'a> {
    conn_id: &'a str,
    admin: bool,
    view: &'a BoardView,
    manager: &'a WsManager,
}

impl Session<'_> {
    async fn handle_text(&self, text: &str) {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                self.reply(ServerFrame::error("BAD_FRAME", e.to_string())).await;
                return;
            }
        };

        if !self.admin {
            self.reply(ServerFrame::error("FORBIDDEN", "Admin session required"))
                .await;
            return;
        }

        tracing::debug!(conn_id = %self.conn_id, ?frame, "Client frame");
        let reply = match frame {
            ClientFrame::Focus { id } => self.view.focus(id).await.map(buffer_frame),
            ClientFrame::Input { id, value } => self.view.input(id, &value).await.map(buffer_frame),
            ClientFrame::Commit { id } => self.commit(id).await,
            // The new value arrives through the live set like any remote change.
            ClientFrame::Adjust { id, delta } => {
                self.view.increment_bounty(id, delta).await.map(|_| None)
            }
        };

        match reply {
            Ok(Some(frame)) => self.reply(frame).await,
            Ok(None) => {}
            Err(e) => self.reply(board_error_frame(&e)).await,
        }
    }

    /// Leave editing; the write itself runs in the background.
    async fn commit(&self, id: EntryId) -> Result<Option<ServerFrame>, BoardError> {
        self.view.commit_detached(id).await?;
        Ok(self.view.buffer(id).await.map(ServerFrame::Buffer))
    }

    async fn reply(&self, frame: ServerFrame) {
        if let Some(msg) = frame.to_message() {
            self.manager.send(self.conn_id, msg).await;
        }
    }
}

fn buffer_frame(view: BufferView) -> Option<ServerFrame> {
    Some(ServerFrame::Buffer(view))
}

fn board_error_frame(err: &BoardError) -> ServerFrame {
    match err {
        BoardError::NotFound(_) => ServerFrame::error("NOT_FOUND", err.to_string()),
        BoardError::Core(_) => ServerFrame::error("VALIDATION_ERROR", err.to_string()),
        _ => {
            tracing::warn!(error = %err, "Board operation failed");
            ServerFrame::error("UNAVAILABLE", "The board is not connected")
        }
    }
}

/// Forward view changes to one connection until it goes away.
///
/// Sends the current state first, then a `snapshot` frame per live set
/// change, a `ranking` frame per re-sort and a `buffer` frame for every
/// synced buffer whose shown value moved.
async fn push_updates(view: Arc<BoardView>, manager: Arc<WsManager>, conn_id: String) {
    let mut live = view.watch_live();
    let mut ranking = view.watch_ranking();
    let mut shown: HashMap<EntryId, BufferView> = HashMap::new();

    let push = |frame: ServerFrame| {
        let manager = Arc::clone(&manager);
        let conn_id = conn_id.clone();
        async move {
            match frame.to_message() {
                Some(msg) => manager.send(&conn_id, msg).await,
                None => true,
            }
        }
    };

    let first = live.borrow_and_update().clone();
    let revision = ranking.borrow_and_update().revision;
    if !push(ServerFrame::snapshot(&first)).await
        || !push(ServerFrame::ranking(revision, view.snapshot())).await
    {
        return;
    }

    loop {
        let frames = tokio::select! {
            changed = live.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = live.borrow_and_update().clone();
                let mut frames = vec![ServerFrame::snapshot(&state)];
                for buffer in view.buffers().await {
                    if buffer.state == EditState::Synced
                        && shown.get(&buffer.id) != Some(&buffer)
                    {
                        shown.insert(buffer.id, buffer.clone());
                        frames.push(ServerFrame::Buffer(buffer));
                    }
                }
                shown.retain(|id, _| state.entries.iter().any(|e| e.id == *id));
                frames
            }
            changed = ranking.changed() => {
                if changed.is_err() {
                    break;
                }
                let revision = ranking.borrow_and_update().revision;
                vec![ServerFrame::ranking(revision, view.snapshot())]
            }
        };

        for frame in frames {
            if !push(frame).await {
                tracing::debug!(conn_id = %conn_id, "Connection gone, stopping updates");
                return;
            }
        }
    }
}
