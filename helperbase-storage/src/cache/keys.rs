//! Cache key conventions shared by every reader and writer of the API cache.
//!
//! Invalidation relies on these exact spellings: `HELPER_PATTERN` is a plain
//! substring that matches every per-helper key but not the `helpers` list key.

use helperbase_core::HelperId;

/// List of all helpers.
pub const HELPERS: &str = "helpers";
/// List of all users.
pub const USERS: &str = "users";
/// List of all incidents.
pub const INCIDENTS: &str = "incidents";
/// Computed dashboard aggregates.
pub const DASHBOARD_METRICS: &str = "dashboard-metrics";
/// Substring shared by all per-helper keys.
pub const HELPER_PATTERN: &str = "helper-";

/// Single helper record.
pub fn helper_profile(id: HelperId) -> String {
    format!("helper-profile-{id}")
}

/// Incidents filed against one helper.
pub fn helper_incidents(id: HelperId) -> String {
    format!("helper-incidents-{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_pattern_matches_per_helper_keys_only() {
        let id = HelperId::now_v7();
        assert!(helper_profile(id).contains(HELPER_PATTERN));
        assert!(helper_incidents(id).contains(HELPER_PATTERN));
        assert!(!HELPERS.contains(HELPER_PATTERN));
        assert!(!DASHBOARD_METRICS.contains(HELPER_PATTERN));
    }

    #[test]
    fn test_per_helper_keys_embed_id() {
        let id = HelperId::now_v7();
        assert_eq!(helper_profile(id), format!("helper-profile-{}", id));
        assert!(helper_incidents(id).ends_with(&id.to_string()));
    }
}
