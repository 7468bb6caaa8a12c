//! Test helpers for generating unique test data
//!
//! ULID suffixes keep names unique across tests sharing a process.

use ulid::Ulid;

/// Generate a unique string in the format `{prefix}-{ulid}`.
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("player");
/// let id2 = unique_str("player");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a short unique player name, suitable for the 64-char name limit.
pub fn unique_player_name(prefix: &str) -> String {
    let ulid = Ulid::new().to_string();
    let tail = &ulid[ulid.len() - 8..];
    format!("{prefix}-{tail}")
}
