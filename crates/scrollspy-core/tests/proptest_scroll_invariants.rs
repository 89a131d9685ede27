//! Property-based invariant tests for scroll tracking and catalog validation.
//!
//! 1. The first observation is always `None`.
//! 2. Direction agrees with the sign of the offset delta.
//! 3. Valid catalogs keep one entry per color, in order.
//! 4. Mismatched lengths never build a catalog.

use proptest::prelude::*;
use scrollspy_core::config::{Catalog, ConfigError};
use scrollspy_core::scroll::{ScrollDirection, ScrollTracker};

fn offset_strategy() -> impl Strategy<Value = f64> {
    -10_000.0f64..10_000.0
}

// ═════════════════════════════════════════════════════════════════════════
// 1. First observation is None
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn first_observation_is_none(offset in offset_strategy()) {
        let mut tracker = ScrollTracker::new();
        prop_assert_eq!(tracker.observe(offset), ScrollDirection::None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Direction matches delta sign
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn direction_matches_delta(offsets in prop::collection::vec(offset_strategy(), 2..40)) {
        let mut tracker = ScrollTracker::new();
        tracker.observe(offsets[0]);
        for pair in offsets.windows(2) {
            let direction = tracker.observe(pair[1]);
            let expected = if pair[1] > pair[0] {
                ScrollDirection::Down
            } else if pair[1] < pair[0] {
                ScrollDirection::Up
            } else {
                ScrollDirection::None
            };
            prop_assert_eq!(direction, expected, "offsets {:?}", pair);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Valid catalogs preserve order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn catalog_preserves_order(heights in prop::collection::vec(0.0f64..5_000.0, 0..12)) {
        let colors: Vec<String> = (0..heights.len()).map(|i| format!("#{i:06x}")).collect();
        let catalog = Catalog::new(colors.clone(), &heights).unwrap();
        prop_assert_eq!(catalog.len(), colors.len());
        for (entry, (color, height)) in catalog.entries().iter().zip(colors.iter().zip(&heights)) {
            prop_assert_eq!(entry.color.as_str(), color.as_str());
            prop_assert_eq!(entry.height, *height);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Mismatched lengths are rejected
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn mismatched_lengths_rejected(n_colors in 0usize..10, n_heights in 0usize..10) {
        prop_assume!(n_colors != n_heights);
        let colors: Vec<String> = (0..n_colors).map(|i| format!("c{i}")).collect();
        let heights = vec![900.0; n_heights];
        let is_mismatch = matches!(
            Catalog::new(colors, &heights),
            Err(ConfigError::LengthMismatch { colors, heights }) if colors == n_colors && heights == n_heights
        );
        prop_assert!(is_mismatch);
    }
}
