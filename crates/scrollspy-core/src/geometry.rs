#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// Bounding box of a rendered element, relative to the viewport.
///
/// Uses layout pixels with the origin at the viewport's top-left corner.
/// A negative `top` means the element's top edge has scrolled past the
/// viewport top.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Top edge offset from the viewport top (signed).
    pub top: f64,
    /// Left edge offset from the viewport left (signed).
    #[serde(default)]
    pub left: f64,
    /// Width in layout pixels.
    #[serde(default)]
    pub width: f64,
    /// Height in layout pixels.
    #[serde(default)]
    pub height: f64,
}

impl Bounds {
    /// Create a new bounding box.
    #[inline]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bounding box where only the top edge is known.
    #[inline]
    pub const fn from_top(top: f64) -> Self {
        Self::new(top, 0.0, 0.0, 0.0)
    }

    /// Distance the top edge sits from the viewport top, in either direction.
    #[inline]
    pub fn top_distance(&self) -> f64 {
        self.top.abs()
    }

    /// Check that every coordinate is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}
