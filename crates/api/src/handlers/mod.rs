pub mod board;
pub mod entries;
pub mod events;
pub mod session;
