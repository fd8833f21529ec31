//! Shared password digest
//!
//! Stored form: `sha256:<salt-hex>:<digest-hex>` where
//! digest = SHA-256(salt || password). Values without the prefix are
//! plaintext secrets written by older builds and are compared verbatim.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::SharedSecret;

const SCHEME_PREFIX: &str = "sha256:";

/// Digest a new password with a fresh random salt
pub fn seal(password: &str) -> SharedSecret {
    let salt = *Uuid::new_v4().as_bytes();
    seal_with_salt(password, &salt)
}

fn seal_with_salt(password: &str, salt: &[u8]) -> SharedSecret {
    let digest = sha256(salt, password.as_bytes());
    SharedSecret::from_stored(format!(
        "{}{}:{}",
        SCHEME_PREFIX,
        to_hex(salt),
        to_hex(&digest)
    ))
}

/// Does `candidate` match the stored secret?
pub fn verify(secret: &SharedSecret, candidate: &str) -> bool {
    let stored = secret.as_stored();
    let Some(rest) = stored.strip_prefix(SCHEME_PREFIX) else {
        return stored == candidate;
    };
    let Some((salt_hex, digest_hex)) = rest.split_once(':') else {
        return false;
    };
    let Some(salt) = from_hex(salt_hex) else {
        return false;
    };
    to_hex(&sha256(&salt, candidate.as_bytes())) == digest_hex
}

/// SHA-256 helper
fn sha256(salt: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(data);
    hasher.finalize().into()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}
