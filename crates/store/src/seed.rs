//! Seeding a fresh collection from a list of names.

use rand::Rng;
use wanted_core::avatar::avatar_url;
use wanted_core::collection::CollectionPath;
use wanted_core::entry::NewEntry;

use crate::auth::Identity;
use crate::error::StoreError;
use crate::store::DocumentStore;

/// Smallest random bounty handed to a seeded outlaw.
pub const SEED_BOUNTY_MIN: u64 = 5;
/// Largest random bounty handed to a seeded outlaw.
pub const SEED_BOUNTY_MAX: u64 = 205;

/// Parse a seed file: one name per line, blank lines and `#` comments
/// skipped.
pub fn parse_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Build seed entries with random bounties. Seeded avatars use the bare
/// name as seed so a reseed shows the same faces.
pub fn seed_entries(names: &[String]) -> Vec<NewEntry> {
    let mut rng = rand::rng();
    names
        .iter()
        .filter_map(|name| match NewEntry::new(name, 0) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Skipping invalid seed name");
                None
            }
        })
        .map(|mut entry| {
            entry.bounty = rng.random_range(SEED_BOUNTY_MIN..=SEED_BOUNTY_MAX);
            let image = avatar_url(&entry.name);
            entry.with_image(image)
        })
        .collect()
}

/// Seed the collection if it is empty. Returns the number of entries added.
pub async fn seed_if_empty(
    store: &DocumentStore,
    identity: &Identity,
    path: &CollectionPath,
    names: &[String],
) -> Result<usize, StoreError> {
    if store.document_count(path).await > 0 {
        tracing::info!(collection = %path, "Collection already populated, skipping seed");
        return Ok(0);
    }

    let created = store
        .add_batch(identity, path, seed_entries(names))
        .await?;
    tracing::info!(count = created.len(), collection = %path, "Seeded outlaws");
    Ok(created.len())
}
