//! Record freshness policy
//!
//! A single fixed window governs the whole catalog: a stored record younger
//! than 24 hours is served as-is, anything older triggers a refetch.

use chrono::{DateTime, Duration, Utc};

/// Freshness window in hours
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// True when the record is fresh enough to serve without refetching.
/// Strict comparison: a record exactly 24 hours old is stale.
pub fn is_fresh(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(last_updated) < Duration::hours(FRESHNESS_WINDOW_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_inside_window_is_fresh() {
        let now = Utc::now();
        let last = now - Duration::hours(23) - Duration::minutes(59);
        assert!(is_fresh(last, now));
    }

    #[test]
    fn exactly_at_boundary_is_stale() {
        let now = Utc::now();
        assert!(!is_fresh(now - Duration::hours(24), now));
    }

    #[test]
    fn just_outside_window_is_stale() {
        let now = Utc::now();
        let last = now - Duration::hours(24) - Duration::minutes(1);
        assert!(!is_fresh(last, now));
    }

    #[test]
    fn current_timestamp_is_fresh() {
        let now = Utc::now();
        assert!(is_fresh(now, now));
    }
}
