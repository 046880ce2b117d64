//! Break-length suggestion.
//!
//! The flowtime method suggests a break proportional to the length of the
//! preceding stretch of focused work. This is the single implementation of
//! that mapping; everything else in the workspace goes through it.

use std::time::Duration;

/// Suggest a break length for the given stretch of work.
///
/// Whole elapsed minutes (truncating) are compared against fixed
/// breakpoints:
///
/// | work minutes | break |
/// |---|---|
/// | <= 25 | 5 min |
/// | <= 50 | 8 min |
/// | <= 90 | 10 min |
/// | > 90 | 15 min |
pub fn suggested_break(work: Duration) -> Duration {
    let work_minutes = work.as_secs() / 60;

    let break_minutes = if work_minutes <= 25 {
        5
    } else if work_minutes <= 50 {
        8
    } else if work_minutes <= 90 {
        10
    } else {
        15
    };
    Duration::from_secs(break_minutes * 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn matches_tier_table_at_boundaries() {
        let cases = [
            (25, 5),
            (26, 8),
            (50, 8),
            (51, 10),
            (90, 10),
            (91, 15),
        ];
        for (work, expected) in cases {
            assert_eq!(
                suggested_break(minutes(work)),
                minutes(expected),
                "work = {work}m"
            );
        }
    }

    #[test]
    fn zero_work_gets_shortest_break() {
        assert_eq!(suggested_break(Duration::ZERO), minutes(5));
    }

    #[test]
    fn sub_minute_remainder_is_truncated() {
        // 25m 59s is still in the first tier.
        assert_eq!(suggested_break(Duration::from_secs(25 * 60 + 59)), minutes(5));
    }

    proptest! {
        #[test]
        fn non_decreasing_in_work_duration(a in 0u64..20_000, b in 0u64..20_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                suggested_break(Duration::from_secs(lo)) <= suggested_break(Duration::from_secs(hi))
            );
        }
    }
}
