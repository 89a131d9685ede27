#![forbid(unsafe_code)]

//! Core: item identity, layout geometry, host events, scroll direction, and
//! catalog configuration for the scroll-spy menu.

pub mod config;
pub mod event;
pub mod geometry;
pub mod item;
pub mod logging;
pub mod scroll;

pub use config::{Catalog, ConfigError, SpyConfig};
pub use event::{Event, WatchSample};
pub use geometry::Bounds;
pub use item::{Color, ElementHandle};
pub use scroll::{ScrollDirection, ScrollTracker};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
