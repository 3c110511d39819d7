//! Token material: random generation, constant-time comparison, log-safe digests.
//!
//! Authorization codes are 16 random bytes and tokens 32, both hex-encoded
//! from the operating system RNG. Raw values never appear in logs; call sites
//! log [`fingerprint`] output instead.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Byte length of an authorization code before hex encoding.
const CODE_BYTES: usize = 16;

/// Byte length of access and refresh tokens before hex encoding.
const TOKEN_BYTES: usize = 32;

/// Number of digest characters kept in a log fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Generate a fresh authorization code (32 lowercase hex characters).
#[must_use]
pub fn authorization_code() -> String {
    random_hex(CODE_BYTES)
}

/// Generate a fresh access token (64 lowercase hex characters).
#[must_use]
pub fn access_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// Generate a fresh refresh token (64 lowercase hex characters).
#[must_use]
pub fn refresh_token() -> String {
    random_hex(TOKEN_BYTES)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compare two secrets without leaking the position of the first mismatch
/// through timing. Inputs of different lengths compare unequal.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Full SHA-256 hex digest of a secret, usable as a cache key.
#[must_use]
pub fn digest(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Short digest prefix for log correlation. Not reversible to the secret.
#[must_use]
pub fn fingerprint(value: &str) -> String {
    let mut digest = digest(value);
    digest.truncate(FINGERPRINT_LEN);
    digest
}
