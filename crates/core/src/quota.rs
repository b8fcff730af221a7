//! Storage quota defaults and the within-limit predicate.

/// API calls allocated to a freshly created account.
pub const DEFAULT_API_CALLS_ALLOCATED: i64 = 20_000;

/// Storage bytes allocated to a freshly created account (500 MiB).
pub const DEFAULT_MEMORY_ALLOCATED: i64 = 500 * 1024 * 1024;

/// Whether the account may perform another state-changing storage call.
///
/// Callers evaluate this before the operation and record usage after it;
/// the two steps are deliberately not atomic (see the gate in the API
/// layer).
pub fn within_limit(api_calls_used: i64, api_calls_allocated: i64) -> bool {
    api_calls_used < api_calls_allocated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_limit_boundary() {
        assert!(within_limit(0, 1));
        assert!(within_limit(19_999, 20_000));
        assert!(!within_limit(20_000, 20_000));
        assert!(!within_limit(20_001, 20_000));
    }

    #[test]
    fn test_zero_allocation_is_always_over() {
        assert!(!within_limit(0, 0));
    }
}
