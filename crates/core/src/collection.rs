//! Logical path of the leaderboard collection inside the document store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Path of the leaderboard collection for one application namespace:
/// `artifacts/{app_id}/public/data/leaderboard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Build the leaderboard path for an application namespace.
    ///
    /// The id becomes a single path segment, so it may not be blank or
    /// contain `/`.
    pub fn leaderboard(app_id: &str) -> Result<Self, CoreError> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            return Err(CoreError::Validation("app id must not be empty".into()));
        }
        if app_id.contains('/') {
            return Err(CoreError::Validation(format!(
                "app id '{app_id}' must not contain '/'"
            )));
        }
        Ok(Self(format!("artifacts/{app_id}/public/data/leaderboard")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
