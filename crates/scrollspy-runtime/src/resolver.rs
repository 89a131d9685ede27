#![forbid(unsafe_code)]

//! Active-item handoff.
//!
//! The head of the visibility queue stays active until it leaves the
//! viewport. While the user keeps scrolling down, that can take a long time
//! for a tall block that is already mostly gone. [`ActiveItemResolver`]
//! decides when to demote the head early so the next visible item takes over.
//!
//! # Rule
//!
//! Demote iff all of:
//!
//! - `queue.len() > 1` (someone to hand off to),
//! - `|top| > height * handoff_ratio` (head mostly scrolled past),
//! - direction is [`ScrollDirection::Down`].
//!
//! # Failure Modes
//!
//! - Non-finite geometry never demotes.
//! - A direction of `None` (first measurement, no motion) never demotes.

use scrollspy_core::config::{ConfigError, DEFAULT_HANDOFF_RATIO};
use scrollspy_core::geometry::Bounds;
use scrollspy_core::scroll::ScrollDirection;
use tracing::trace;

use crate::store::VisibilityQueue;

/// Configuration for the head handoff rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Fraction of the head's height that must be scrolled past.
    /// Default: 0.5
    pub handoff_ratio: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            handoff_ratio: DEFAULT_HANDOFF_RATIO,
        }
    }
}

impl ResolverConfig {
    /// Validated config with a custom ratio.
    pub fn with_ratio(handoff_ratio: f64) -> Result<Self, ConfigError> {
        if !handoff_ratio.is_finite() || handoff_ratio < 0.0 {
            return Err(ConfigError::InvalidRatio(handoff_ratio));
        }
        Ok(Self { handoff_ratio })
    }
}

/// Decides whether the active item should hand off to the next visible one.
#[derive(Debug, Clone, Default)]
pub struct ActiveItemResolver {
    config: ResolverConfig,
}

impl ActiveItemResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether the queue head should be demoted.
    ///
    /// `head_bounds.top` is the head's top edge relative to the viewport top
    /// (negative once scrolled past) and `head_height` its layout height.
    pub fn should_demote_head(
        &self,
        queue: &VisibilityQueue,
        head_bounds: Bounds,
        head_height: f64,
        direction: ScrollDirection,
    ) -> bool {
        let has_candidate = queue.len() > 1;
        let threshold = head_height * self.config.handoff_ratio;
        let past_threshold = head_bounds.top.is_finite()
            && threshold.is_finite()
            && head_bounds.top_distance() > threshold;
        let scrolling_down = direction == ScrollDirection::Down;

        let demote = has_candidate && past_threshold && scrolling_down;
        trace!(
            queue_len = queue.len(),
            top = head_bounds.top,
            head_height,
            threshold,
            direction = direction.as_str(),
            demote,
            "handoff evaluated"
        );
        demote
    }
}

/// [`ActiveItemResolver::should_demote_head`] with the default ratio.
pub fn should_demote_head(
    queue: &VisibilityQueue,
    head_bounds: Bounds,
    head_height: f64,
    direction: ScrollDirection,
) -> bool {
    ActiveItemResolver::default().should_demote_head(queue, head_bounds, head_height, direction)
}
