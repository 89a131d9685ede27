#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Every notification the host delivers (visibility changes, scroll motion,
//! menu clicks) is normalized into an [`Event`] before it reaches the model.
//! Events are delivered one at a time, in host order, on a single thread.

use crate::geometry::Bounds;
use crate::item::{Color, ElementHandle};

/// Geometry of the watched head item, captured at scroll time.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSample {
    /// Item the sample was taken for.
    pub color: Color,
    /// Bounding box relative to the viewport.
    pub bounds: Bounds,
}

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An item's element was rendered and can be referenced.
    Attached {
        /// Item identity.
        color: Color,
        /// Rendered node.
        handle: ElementHandle,
    },
    /// An item started intersecting the viewport.
    Entered {
        /// Item identity.
        color: Color,
        /// Rendered node.
        handle: ElementHandle,
    },
    /// An item stopped intersecting the viewport.
    Left {
        /// Item identity.
        color: Color,
    },
    /// The page scrolled.
    Scrolled {
        /// Absolute vertical scroll offset.
        offset: f64,
        /// Geometry of the item currently being watched, if any.
        watch: Option<WatchSample>,
    },
    /// A menu entry was clicked.
    MenuClicked {
        /// Item identity.
        color: Color,
    },
}

impl Event {
    /// Stable name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Attached { .. } => "attached",
            Self::Entered { .. } => "entered",
            Self::Left { .. } => "left",
            Self::Scrolled { .. } => "scrolled",
            Self::MenuClicked { .. } => "menu_clicked",
        }
    }
}
