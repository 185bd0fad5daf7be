use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wanted_api::auth::jwt::SessionKeys;
use wanted_api::config::{BoardConfig, ConfigError, ServerConfig};
use wanted_api::router::{build_app_router, build_setup_router};
use wanted_api::state::AppState;
use wanted_api::ws;
use wanted_board::{BoardOptions, BoardView, StoreBackend};
use wanted_events::{EventBus, EventLog};
use wanted_store::{seed, DocumentStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wanted_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seeding failed: {0}")]
    Seed(#[from] wanted_store::StoreError),
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let addr = SocketAddr::new(
        config.host.parse().map_err(|_| ConfigError::Invalid {
            var: "HOST",
            value: config.host.clone(),
        })?,
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let board_config = match BoardConfig::from_env() {
        Ok(board_config) => board_config,
        Err(problem) => {
            tracing::warn!(error = %problem, "Board configuration missing or invalid, starting in setup mode");
            tracing::info!(%addr, "Starting setup server");
            let app = build_setup_router(&problem, &config);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            return Ok(());
        }
    };
    let path = board_config.collection.clone();

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let event_log = Arc::new(EventLog::new());
    let event_log_handle = tokio::spawn(Arc::clone(&event_log).run(event_bus.subscribe()));
    tracing::info!("Event bus created");

    // --- Store ---
    let store = Arc::new(DocumentStore::new().with_event_bus(Arc::clone(&event_bus)));
    if let Some(seed_file) = &board_config.seed_file {
        let names = seed::parse_names(&tokio::fs::read_to_string(seed_file).await?);
        let identity = store.sign_in_anonymously().await;
        let seeded = seed::seed_if_empty(&store, &identity, &path, &names).await?;
        tracing::info!(seeded, file = %seed_file.display(), "Seed file processed");
    }
    tracing::info!(collection = %path, "Document store ready");

    // --- Board ---
    let backend = Arc::new(StoreBackend::new(Arc::clone(&store), path));
    let board = Arc::new(BoardView::mount(
        backend.clone(),
        BoardOptions {
            sort_delay: board_config.sort_delay,
        },
    ));

    // --- WebSocket manager + heartbeat ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- App state ---
    let sessions = Arc::new(SessionKeys::generate(board_config.session_hours));
    let state = AppState {
        config: Arc::new(config.clone()),
        board_config: Arc::new(board_config),
        sessions,
        store: Arc::clone(&store),
        backend,
        board,
        ws_manager: Arc::clone(&ws_manager),
        event_log,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;

    // Ends every live subscription.
    store.close().await;

    // The event log stops once every bus handle is gone.
    drop(store);
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), event_log_handle).await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
