//! Deterministic record identifiers
//!
//! A record id is a pure function of the task context (account, report type,
//! date bounds) and the row's natural key, so re-ingesting the same window
//! produces the same ids and the storage layer can upsert instead of
//! duplicating.

use sha2::{Digest, Sha256};

/// Number of hex digits of the key digest kept in the id
const KEY_DIGEST_LEN: usize = 16;

/// Compute the deterministic id for one record.
///
/// `key_parts` is the row's natural key: entity ids plus segment cells where
/// the record type defines them, otherwise the normalized row content. The
/// parts are length-prefixed before hashing so `["ab", "c"]` and
/// `["a", "bc"]` do not collide.
pub fn record_id(
    account_id: u64,
    report_type: &str,
    date_start: &str,
    date_end: &str,
    key_parts: &[String],
) -> String {
    let mut hasher = Sha256::new();
    for part in key_parts {
        hasher.update(part.len().to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());

    format!(
        "{}-{}-{}-{}-{}",
        account_id,
        report_type,
        date_start,
        date_end,
        &digest[..KEY_DIGEST_LEN]
    )
}
