//! WebSocket live board.
//!
//! Every connection mounts its own board view: connecting is a page
//! opening, disconnecting is the page closing.

pub mod frames;
mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
