//! In-memory document store backing the bounty board.
//!
//! Stands in for a hosted document database: documents live in named
//! collections, every client signs in with an anonymous identity, the
//! store stamps server-side fields on creation, and subscribers receive a
//! full snapshot of a collection after every change.

pub mod auth;
pub mod error;
pub mod seed;
pub mod store;
pub mod subscription;

pub use auth::{AuthService, Identity};
pub use error::StoreError;
pub use store::DocumentStore;
pub use subscription::{Snapshot, Subscription};
