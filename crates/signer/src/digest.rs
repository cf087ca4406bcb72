//! Digest primitives: SHA-256/SHA-1 hashing and HMAC over byte inputs.
//!
//! Keys may themselves be raw byte sequences (the output of a prior HMAC
//! step); key-chain derivation in both signing schemes depends on this.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// SHA-256 of the input, as lowercase hex (64 characters).
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// SHA-1 of the input, as lowercase hex (40 characters).
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// HMAC-SHA256 returning the raw 32-byte tag.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA1 returning the raw 20-byte tag.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; 20] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA256 as lowercase hex.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(hmac_sha256(key, message))
}

/// HMAC-SHA1 as lowercase hex.
pub fn hmac_sha1_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(hmac_sha1(key, message))
}
