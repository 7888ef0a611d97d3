//! SHA-256 helpers for identity fields.

use sha2::{Digest, Sha256};

use crate::models::HexDigest;

/// SHA-256 of `value`'s UTF-8 bytes, as 64 lowercase hex chars.
pub fn sha256_hex(value: &str) -> HexDigest {
    let digest = Sha256::digest(value.as_bytes());
    HexDigest::from_hex(hex::encode(digest))
}
