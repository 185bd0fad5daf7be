//! View model of the bounty board.
//!
//! A [`BoardView`] is what one open page holds: it signs in, mirrors the
//! leaderboard collection into a live set, derives a debounced ranking
//! from it and keeps an edit buffer per card. The store is reached only
//! through the injected [`Backend`], so tests can drive a view with a
//! fake.

pub mod backend;
pub mod debounce;
pub mod edit;
pub mod error;
pub mod live_set;
pub mod ranking;
pub mod view;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{Backend, SnapshotStream, StoreBackend};
pub use debounce::Debouncer;
pub use error::BoardError;
pub use live_set::LiveState;
pub use ranking::DisplayedRanking;
pub use view::{BoardOptions, BoardSnapshot, BoardView};
