//! One-time codes and reset grant tokens.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

pub const CODE_LENGTH: usize = 6;

/// Generate a numeric code of `length` digits from the OS RNG.
#[must_use]
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Compare a submitted code with the issued one.
///
/// `bypass` is only set when an operator explicitly configured a test code.
#[must_use]
pub fn codes_match(issued: &str, submitted: &str, bypass: Option<&str>) -> bool {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return false;
    }
    if bypass.is_some_and(|code| code == submitted) {
        return true;
    }
    issued == submitted
}

/// Random single-use token handed out after a forgot-password code check.
#[must_use]
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Hex SHA-256 of a reset token; only the digest is written to the cache.
#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
