use wanted_core::types::EntryId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Document not found: {id} in {collection}")]
    NotFound { collection: String, id: EntryId },

    #[error("Subscription closed")]
    Closed,
}
