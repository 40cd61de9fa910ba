pub mod url_validator;
pub mod user_agent;

use xxhash_rust::xxh64::xxh64;

/// URL 安全字符集
const HASH_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Fixed width of a link hash. 62^11 > 2^64, so the full xxh64 value
/// always fits.
pub const HASH_LENGTH: usize = 11;

/// Compute the short identifier for a target URL.
///
/// Deterministic across calls and processes: the bulk pipeline relies on
/// recomputing the same hash when it re-reads the store, and retried
/// creation messages must land on the same key.
pub fn compute_hash(target: &str) -> String {
    let mut value = xxh64(target.as_bytes(), 0);
    let base = HASH_ALPHABET.len() as u64;

    let mut out = [HASH_ALPHABET[0]; HASH_LENGTH];
    let mut i = HASH_LENGTH;
    while value > 0 && i > 0 {
        i -= 1;
        out[i] = HASH_ALPHABET[(value % base) as usize];
        value /= base;
    }

    out.iter().map(|&b| b as char).collect()
}
