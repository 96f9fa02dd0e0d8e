//! Property tests for `SlidingWindowFilter`.
//!
//! Filters are driven into arbitrary states by replaying a random counter history through `add`,
//! then probed for the acceptance rules that must hold in every state.

use proptest::prelude::*;

use antireplay::SlidingWindowFilter;
use antireplay_reference::ReferenceFilter;

fn history() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..2048, 0..200)
}

fn filter_after(size: u64, history: &[u64]) -> SlidingWindowFilter {
    let mut f = SlidingWindowFilter::new(size);
    for &c in history {
        f.add(c);
    }
    f
}

proptest! {
    #[test]
    fn ahead_is_always_ok(size in 0u64..300, history in history(), ahead in 1u64..10_000) {
        let f = filter_after(size, &history);
        prop_assert!(f.is_ok(f.last() + ahead));
    }

    #[test]
    fn accepted_at_most_once(size in 0u64..300, history in history(), counter in 0u64..2048) {
        let mut f = filter_after(size, &history);
        if f.add(counter) {
            prop_assert!(!f.is_ok(counter));
            prop_assert!(!f.add(counter));
        }
    }

    #[test]
    fn behind_window_is_rejected(size in 0u64..300, history in history(), behind in 0u64..1000) {
        let mut f = filter_after(size, &history);
        let last = f.last();
        if let Some(c) = last.checked_sub(size + behind) {
            prop_assert!(f.is_expired(c));
            prop_assert!(!f.is_ok(c));
            prop_assert!(!f.add(c));
            prop_assert_eq!(f.last(), last);
        }
    }

    #[test]
    fn zero_size_only_accepts_increasing(history in history()) {
        let mut f = SlidingWindowFilter::new(0);
        for c in history {
            let ahead = c > f.last();
            prop_assert_eq!(f.is_ok(c), ahead);
            prop_assert_eq!(f.add(c), ahead);
        }
    }

    #[test]
    fn reset_matches_fresh(size in 0u64..300, history in history(), probes in history()) {
        let mut f = filter_after(size, &history);
        f.reset();
        let mut fresh = SlidingWindowFilter::new(size);
        prop_assert_eq!(f.ring_capacity(), fresh.ring_capacity());
        for p in probes {
            prop_assert_eq!(f.is_ok(p), fresh.is_ok(p));
            prop_assert_eq!(f.add(p), fresh.add(p));
        }
    }

    #[test]
    fn matches_reference(
        size in 0u64..600,
        counters in prop::collection::vec(0u64..4096, 0..400),
        use_add in any::<bool>()
    ) {
        let mut f = SlidingWindowFilter::new(size);
        let mut r = ReferenceFilter::new(size as usize);
        for c in counters {
            if use_add {
                prop_assert_eq!(f.add(c), r.add(c), "add({})", c);
            } else {
                prop_assert_eq!(f.is_ok(c), r.is_ok(c), "is_ok({})", c);
                f.must_add(c);
                r.must_add(c);
            }
            prop_assert_eq!(f.last(), r.last());
        }
    }
}
