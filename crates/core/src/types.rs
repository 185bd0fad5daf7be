/// Entry identifiers are opaque UUIDs assigned by the store.
pub type EntryId = uuid::Uuid;

/// Bounties are non-negative by construction.
pub type Bounty = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
