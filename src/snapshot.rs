use chrono::{DateTime, Utc};

const SHORT_SHA_LEN: usize = 6;

/// Builds a `YYYYMMDD-HHMMSS-<short sha>` tag unique to one build.
///
/// The timestamp is supplied by the caller rather than read off the
/// wall clock here, keeping the output deterministic under test.
#[must_use]
pub fn snapshot_tag(now: DateTime<Utc>, sha: &str) -> String {
    let short_sha = &sha[..sha.len().min(SHORT_SHA_LEN)];
    format!("{}-{short_sha}", now.format("%Y%m%d-%H%M%S"))
}
