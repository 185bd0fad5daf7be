//! Admin session tokens.
//!
//! Sessions are HS256-signed JWTs. The signing key is generated when the
//! process starts and never persisted, so a restart signs everyone out.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by every session token.
pub const ROLE_ADMIN: &str = "admin";

/// Length of the generated signing key in bytes.
const KEY_LEN: usize = 32;

/// Claims embedded in every admin session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the session id.
    pub sub: String,
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    pub jti: String,
}

/// Signing key and lifetime for admin sessions.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
    /// Session lifetime in hours.
    pub expiry_hours: i64,
}

impl SessionKeys {
    /// Generate a fresh random signing key.
    pub fn generate(expiry_hours: i64) -> Self {
        let mut secret = vec![0u8; KEY_LEN];
        rand::rng().fill(secret.as_mut_slice());
        Self {
            secret,
            expiry_hours,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

/// Issue a session token for a successful admin sign-in.
pub fn generate_session_token(keys: &SessionKeys) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: ROLE_ADMIN.to_string(),
        exp: now + keys.expires_in_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(&keys.secret),
    )
}

/// Validate and decode a session token.
pub fn validate_token(
    token: &str,
    keys: &SessionKeys,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&keys.secret),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
