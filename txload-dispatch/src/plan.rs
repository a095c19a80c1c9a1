//! Slice planning arithmetic

use txload_config::DispatchConfig;
use txload_core::SliceEntry;

/// Requests one connection sends in a slice.
///
/// `tps / pool_size` rounded down, capped at `cap`. The remainder of the
/// division is not redistributed.
pub fn requests_per_connection(tps: u32, pool_size: usize, cap: u32) -> u32 {
    if pool_size == 0 {
        return 0;
    }
    let pool = u32::try_from(pool_size).unwrap_or(u32::MAX);
    (tps / pool).min(cap)
}

/// How a slice is spread over the connection pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlicePlan {
    pub label: String,
    pub tps: u32,
    /// Connections to open; zero when there is nothing to send
    pub connections: usize,
    pub requests_per_connection: u32,
}

impl SlicePlan {
    pub fn new(entry: &SliceEntry, config: &DispatchConfig) -> Self {
        let per_connection = requests_per_connection(
            entry.tps,
            config.pool_size,
            config.max_requests_per_connection,
        );
        let connections = if per_connection == 0 { 0 } else { config.pool_size };

        Self {
            label: entry.label.clone(),
            tps: entry.tps,
            connections,
            requests_per_connection: per_connection,
        }
    }

    /// Upper bound on requests this slice sends
    pub fn max_requests(&self) -> u64 {
        self.connections as u64 * u64::from(self.requests_per_connection)
    }

    pub fn is_empty(&self) -> bool {
        self.connections == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_pool_arithmetic() {
        assert_eq!(requests_per_connection(1000, 10, 100), 100);
        assert_eq!(requests_per_connection(5000, 10, 100), 100);
        assert_eq!(requests_per_connection(250, 10, 100), 25);
        assert_eq!(requests_per_connection(9, 10, 100), 0);
        assert_eq!(requests_per_connection(0, 10, 100), 0);
        assert_eq!(requests_per_connection(100, 0, 100), 0);
    }

    #[test]
    fn test_zero_tps_plans_nothing() {
        let plan = SlicePlan::new(&SliceEntry::new("idle", 0), &DispatchConfig::default());
        assert!(plan.is_empty());
        assert_eq!(plan.max_requests(), 0);
    }

    #[test]
    fn test_capped_plan() {
        let plan = SlicePlan::new(&SliceEntry::new("peak", 1000), &DispatchConfig::default());
        assert_eq!(plan.connections, 10);
        assert_eq!(plan.requests_per_connection, 100);
        assert_eq!(plan.max_requests(), 1000);
    }

    proptest! {
        #[test]
        fn per_connection_never_exceeds_cap_or_share(
            tps in 0u32..1_000_000,
            pool in 1usize..512,
            cap in 1u32..10_000,
        ) {
            let per = requests_per_connection(tps, pool, cap);
            prop_assert!(per <= cap);
            prop_assert!(u64::from(per) * pool as u64 <= u64::from(tps));
        }

        #[test]
        fn small_slices_send_nothing(pool in 2usize..512, cap in 1u32..1000) {
            let tps = (pool - 1) as u32;
            prop_assert_eq!(requests_per_connection(tps, pool, cap), 0);
        }
    }
}
