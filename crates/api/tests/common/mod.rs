#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use wanted_api::auth::jwt::SessionKeys;
use wanted_api::config::{BoardConfig, ServerConfig};
use wanted_api::router::build_app_router;
use wanted_api::state::AppState;
use wanted_api::ws::WsManager;
use wanted_board::{BoardOptions, BoardView, StoreBackend};
use wanted_core::collection::CollectionPath;
use wanted_events::{EventBus, EventLog};
use wanted_store::DocumentStore;

pub const TEST_PASSWORD: &str = "sheriff";
pub const TEST_APP_ID: &str = "test-app";
pub const SORT_DELAY: Duration = Duration::from_millis(750);

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

pub fn test_board_config() -> BoardConfig {
    BoardConfig {
        collection: CollectionPath::leaderboard(TEST_APP_ID).unwrap(),
        admin_password: TEST_PASSWORD.to_string(),
        sort_delay: SORT_DELAY,
        session_hours: 12,
        seed_file: None,
    }
}

/// A running app: the router plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Build the full application router over a fresh in-memory store.
///
/// Must be called inside a tokio runtime: the server-side board view is
/// mounted immediately.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let event_log = Arc::new(EventLog::new());
    tokio::spawn(Arc::clone(&event_log).run(event_bus.subscribe()));

    let store = Arc::new(DocumentStore::new().with_event_bus(event_bus));
    let board_config = test_board_config();
    let backend = Arc::new(StoreBackend::new(
        Arc::clone(&store),
        board_config.collection.clone(),
    ));
    let board = Arc::new(BoardView::mount(
        backend.clone(),
        BoardOptions {
            sort_delay: SORT_DELAY,
        },
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        board_config: Arc::new(board_config),
        sessions: Arc::new(SessionKeys::generate(12)),
        store,
        backend,
        board,
        ws_manager: Arc::new(WsManager::new()),
        event_log,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(
            Request::get(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Send a JSON body, optionally with an admin session.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn delete_as(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(
            Request::delete(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Sign in with the test password and return the session token.
    pub async fn admin_token(&self) -> String {
        let response = self
            .send_json(
                Method::POST,
                "/api/v1/admin/session",
                None,
                serde_json::json!({ "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["data"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Post an outlaw as admin and return the created entry JSON.
    pub async fn post_outlaw(&self, token: &str, name: &str, bounty: i64) -> Value {
        let response = self
            .send_json(
                Method::POST,
                "/api/v1/admin/entries",
                Some(token),
                serde_json::json!({ "name": name, "bounty": bounty }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"].clone()
    }

    /// Wait until the server-side view has seen `count` entries.
    pub async fn wait_for_live_count(&self, count: usize) {
        let mut live = self.state.board.watch_live();
        live.wait_for(|s| !s.loading && s.entries.len() == count)
            .await
            .unwrap();
    }

    /// Read the activity feed once the log task has caught up to
    /// `expected` events (or given up waiting).
    pub async fn events_once_settled(&self, token: &str, expected: usize) -> Vec<Value> {
        let mut events = Vec::new();
        for _ in 0..50 {
            let json = body_json(self.get_as("/api/v1/admin/events", token).await).await;
            events = json["data"].as_array().cloned().unwrap_or_default();
            if events.len() >= expected {
                break;
            }
            tokio::task::yield_now().await;
        }
        events
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
