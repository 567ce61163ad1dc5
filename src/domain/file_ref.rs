//! Object keys for uploaded print files.
//!
//! Keys are scoped under the owning job: `{job_id}/{unix_millis}_{random}_{name}`.
//! The timestamp plus random suffix keeps concurrent uploads of identically
//! named files apart, and the job prefix keeps different jobs apart.

use super::job::JobId;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

const SUFFIX_LEN: usize = 6;
const FALLBACK_NAME: &str = "file";

/// Collapses whitespace runs to `_` and drops every character that is not
/// ASCII alphanumeric or one of `._-`.
pub fn sanitize_file_name(original: &str) -> String {
    let collapsed = original.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Builds the storage key for one upload.
pub fn object_key(job_id: &JobId, original_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}_{}",
        job_id,
        at.timestamp_millis(),
        random_suffix(),
        sanitize_file_name(original_name)
    )
}
