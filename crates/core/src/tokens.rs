//! Opaque bearer-token generation.
//!
//! Refresh tokens and share tokens are high-entropy random strings. Only the
//! SHA-256 digest is persisted; the plaintext is handed to the caller once.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a generated token (hex-encoded to twice as many chars).
pub const TOKEN_BYTES: usize = 32;

/// A freshly generated token.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    /// Returned to the client exactly once, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest, the only form written to the database.
    pub hash: String,
}

/// Generate a cryptographically random, hex-encoded token.
pub fn generate_token() -> GeneratedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext = hex::encode(bytes);
    let hash = hash_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Lowercase hex SHA-256 of a presented token, used to look it up by hash.
///
/// Surrounding whitespace is ignored so a token copied with a trailing
/// newline still matches.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}
