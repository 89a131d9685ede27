#![forbid(unsafe_code)]

//! Scroll direction tracking.
//!
//! The host reports absolute vertical scroll offsets. [`ScrollTracker`]
//! remembers the last observed offset for the session and classifies each new
//! observation as [`ScrollDirection::Up`], [`ScrollDirection::Down`], or
//! [`ScrollDirection::None`].
//!
//! # Invariants
//!
//! 1. The first observation of a session is always `None`.
//! 2. An unchanged offset is `None`.
//! 3. Non-finite offsets are ignored and do not replace the stored offset.

use serde::{Deserialize, Serialize};

/// Direction of the most recent scroll motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    /// Offset decreased (content moved down, user scrolled towards the top).
    Up,
    /// Offset increased.
    Down,
    /// No observable change, or no previous measurement.
    #[default]
    None,
}

impl ScrollDirection {
    /// Classify the motion from `previous` to `current`.
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Self::Down
        } else if current < previous {
            Self::Up
        } else {
            Self::None
        }
    }

    /// Stable lowercase name for logs and traces.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::None => "none",
        }
    }
}

/// Session-scoped memory of the last observed scroll offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollTracker {
    last_offset: Option<f64>,
    last_direction: ScrollDirection,
}

impl ScrollTracker {
    /// Create a tracker with no previous measurement.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_offset: None,
            last_direction: ScrollDirection::None,
        }
    }

    /// Record a new offset and return the direction relative to the previous one.
    pub fn observe(&mut self, offset: f64) -> ScrollDirection {
        if !offset.is_finite() {
            crate::warn!(offset, "ignoring non-finite scroll offset");
            self.last_direction = ScrollDirection::None;
            return ScrollDirection::None;
        }

        let direction = match self.last_offset {
            Some(previous) => ScrollDirection::between(previous, offset),
            None => ScrollDirection::None,
        };
        self.last_offset = Some(offset);
        self.last_direction = direction;
        crate::trace!(offset, direction = direction.as_str(), "scroll observed");
        direction
    }

    /// Last offset seen, if any.
    #[inline]
    pub fn last_offset(&self) -> Option<f64> {
        self.last_offset
    }

    /// Direction produced by the most recent observation.
    #[inline]
    pub fn last_direction(&self) -> ScrollDirection {
        self.last_direction
    }

    /// Forget the previous measurement (session restart).
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_measurement_is_none() {
        let mut tracker = ScrollTracker::new();
        assert_eq!(tracker.observe(250.0), ScrollDirection::None);
        assert_eq!(tracker.last_offset(), Some(250.0));
    }

    #[test]
    fn increasing_offset_is_down() {
        let mut tracker = ScrollTracker::new();
        tracker.observe(0.0);
        assert_eq!(tracker.observe(10.0), ScrollDirection::Down);
        assert_eq!(tracker.observe(11.5), ScrollDirection::Down);
    }

    #[test]
    fn decreasing_offset_is_up() {
        let mut tracker = ScrollTracker::new();
        tracker.observe(300.0);
        assert_eq!(tracker.observe(200.0), ScrollDirection::Up);
    }

    #[test]
    fn unchanged_offset_is_none() {
        let mut tracker = ScrollTracker::new();
        tracker.observe(300.0);
        tracker.observe(400.0);
        assert_eq!(tracker.observe(400.0), ScrollDirection::None);
        assert_eq!(tracker.last_direction(), ScrollDirection::None);
    }

    #[test]
    fn non_finite_offset_keeps_previous() {
        let mut tracker = ScrollTracker::new();
        tracker.observe(100.0);
        assert_eq!(tracker.observe(f64::NAN), ScrollDirection::None);
        assert_eq!(tracker.last_offset(), Some(100.0));
        assert_eq!(tracker.observe(90.0), ScrollDirection::Up);
    }

    #[test]
    fn reset_forgets_offset() {
        let mut tracker = ScrollTracker::new();
        tracker.observe(100.0);
        tracker.reset();
        assert_eq!(tracker.observe(500.0), ScrollDirection::None);
    }
}
