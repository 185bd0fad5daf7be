//! Domain types and pure logic for the Wanted bounty board.
//!
//! Nothing in this crate performs I/O. The store, board and API crates
//! build on these types so clamping, parsing and ranking rules live in
//! exactly one place.

pub mod avatar;
pub mod collection;
pub mod edit_buffer;
pub mod entry;
pub mod error;
pub mod gate;
pub mod ranking;
pub mod types;
