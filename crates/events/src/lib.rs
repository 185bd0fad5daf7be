//! Wanted event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BoardEvent`]: envelope for every store mutation.
//! - [`EventLog`]: background subscriber that traces events and keeps a
//!   short history for the admin activity feed.

pub mod bus;
pub mod log;

pub use bus::{BoardEvent, EventBus};
pub use log::EventLog;

/// An entry was posted.
pub const ENTRY_CREATED: &str = "entry.created";
/// An entry's bounty changed.
pub const ENTRY_BOUNTY_UPDATED: &str = "entry.bounty_updated";
/// An entry was removed.
pub const ENTRY_REMOVED: &str = "entry.removed";
