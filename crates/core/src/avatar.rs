//! Generated avatar URLs.
//!
//! Avatars come from the DiceBear "adventurer" style. The seed is
//! percent-encoded into the query string so any name is safe to embed.

use rand::Rng;

/// Base URL of the avatar generator.
pub const AVATAR_BASE_URL: &str = "https://api.dicebear.com/9.x/adventurer/svg";

/// Number of random base-36 characters appended to a name to form a seed.
pub const SEED_SUFFIX_LEN: usize = 6;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build the avatar URL for an exact seed.
pub fn avatar_url(seed: &str) -> String {
    format!("{AVATAR_BASE_URL}?seed={}", urlencoding::encode(seed))
}

/// Derive a fresh seed from a name: the name plus a random base-36 suffix,
/// so two outlaws with the same name still get different faces.
pub fn random_seed(name: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SEED_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{name}{suffix}")
}

/// Avatar URL for a newly created entry.
pub fn generate_avatar(name: &str) -> String {
    avatar_url(&random_seed(name))
}
