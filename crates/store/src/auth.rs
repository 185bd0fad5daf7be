//! Anonymous identities.
//!
//! Access rules require every read and write to carry an identity issued
//! by this store. Anonymous sign-in always succeeds and carries no
//! credentials.

use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// An anonymous client identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub uid: String,
}

/// Issues and checks anonymous identities.
#[derive(Default)]
pub struct AuthService {
    issued: RwLock<HashSet<String>>,
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in_anonymously(&self) -> Identity {
        let uid = format!("anon-{}", uuid::Uuid::new_v4().simple());
        self.issued.write().await.insert(uid.clone());
        tracing::debug!(uid = %uid, "Anonymous sign-in");
        Identity { uid }
    }

    /// Check that an identity was issued here and has not been revoked.
    pub async fn authorize(&self, identity: &Identity) -> Result<(), StoreError> {
        if self.issued.read().await.contains(&identity.uid) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied(format!(
                "unknown identity '{}'",
                identity.uid
            )))
        }
    }

    pub async fn revoke(&self, identity: &Identity) {
        self.issued.write().await.remove(&identity.uid);
    }
}
