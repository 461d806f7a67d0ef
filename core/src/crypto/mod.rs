//! Record digests with domain separation
//!
//! Every record kind hashes under its own domain so that two records of
//! different kinds never share a digest, even with identical field bytes.

use sha2::{Sha256, Digest};
use constant_time_eq::constant_time_eq;

/// Create a domain-separated hash using SHA-256
///
/// # Arguments
///
/// * `domain` - Domain prefix (e.g., "PROVENANCE_SUPPLIER")
/// * `data` - Data to hash
///
/// # Returns
///
/// A 32-byte hash with domain separation
pub fn secure_hash(domain: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());

    // Domain length byte keeps "AB"+"C" and "A"+"BC" apart
    hasher.update([domain.len() as u8]);
    hasher.update(data);

    finalize(hasher)
}

/// Create a domain-separated hash of multiple fields
///
/// Each field is length-prefixed, so moving bytes between adjacent fields
/// changes the digest.
pub fn secure_hash_multiple(domain: &str, fields: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([domain.len() as u8]);
    hasher.update((fields.len() as u32).to_be_bytes());

    for field in fields {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field);
    }

    finalize(hasher)
}

fn finalize(hasher: Sha256) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Encode a sequence of ids as big-endian bytes for hashing
pub fn encode_ids(ids: &[u64]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_be_bytes()).collect()
}

/// Compare two digests in constant time
pub fn verify_hash(expected: &[u8; 32], actual: &[u8; 32]) -> bool {
    constant_time_eq(expected, actual)
}

/// Short hex form of a digest for log lines
pub fn short_hex(hash: &[u8; 32]) -> String {
    hex::encode(&hash[0..4])
}
