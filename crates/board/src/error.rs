use wanted_core::error::CoreError;
use wanted_core::types::EntryId;
use wanted_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The view has not finished its anonymous sign-in.
    #[error("Not signed in")]
    NotSignedIn,

    /// The entry is not in the live set.
    #[error("Entry {0} is not on the board")]
    NotFound(EntryId),
}
