//! Partner request signature.
//!
//! `hex(SHA256(identity || timestamp || secret))`, lowercase.

use sha2::{Digest, Sha256};

/// Sign an identity and unix timestamp with the shared secret.
pub fn sign(identity: &str, timestamp: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
