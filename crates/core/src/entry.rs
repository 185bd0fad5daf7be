//! The leaderboard entry ("outlaw") and the rules that keep its bounty
//! non-negative on every write path.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Bounty, EntryId, Timestamp};

/// Status label stamped on every entry at creation.
pub const STATUS_WANTED: &str = "Wanted";

/// Maximum length of an outlaw name, in characters.
pub const MAX_NAME_LEN: u64 = 80;

/// A stored leaderboard record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub bounty: Bounty,
    pub image: String,
    pub created_at: Timestamp,
    pub status: String,
}

/// Fields supplied by the caller when posting a new bounty.
///
/// `image`, `created_at`, `status` and `id` are filled in by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct NewEntry {
    #[validate(length(min = 1, max = MAX_NAME_LEN, message = "name is blank or too long"))]
    pub name: String,
    pub bounty: Bounty,
    /// Explicit avatar URL. `None` lets the store generate one from the name.
    #[serde(default)]
    pub image: Option<String>,
}

impl NewEntry {
    /// Build a validated entry from raw admin input.
    ///
    /// The name is trimmed and must not be blank. Negative bounties clamp to 0.
    pub fn new(name: &str, bounty: i64) -> Result<Self, CoreError> {
        let entry = Self {
            name: name.trim().to_string(),
            bounty: clamp_bounty(bounty),
            image: None,
        };
        entry
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        Ok(entry)
    }

    /// Use a fixed avatar URL instead of a generated one.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Clamp a signed amount into the bounty domain.
pub fn clamp_bounty(value: i64) -> Bounty {
    value.max(0) as Bounty
}

/// Apply an increment or decrement to a live bounty, never going below 0.
pub fn apply_delta(current: Bounty, delta: i64) -> Bounty {
    if delta >= 0 {
        current.saturating_add(delta as Bounty)
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

/// Coerce raw text typed into a bounty field.
///
/// Blank input means 0. Any finite decimal is truncated toward zero and
/// clamped to 0 from below. Returns `None` for text that is not a number,
/// in which case no write should be issued.
pub fn parse_bounty_input(raw: &str) -> Option<Bounty> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    if value <= 0.0 {
        Some(0)
    } else {
        // `as` saturates at u64::MAX for out-of-range floats.
        Some(value.trunc() as Bounty)
    }
}
