#![forbid(unsafe_code)]

//! Scroll-spy runtime.
//!
//! # Key Components
//!
//! - [`VisibilityStore`] - Reducer over the menu and the visibility queue
//! - [`ActiveItemResolver`] - Early handoff of the active item while scrolling down
//! - [`ScrollSpy`] - Session model wiring events, store, resolver, and watches
//! - [`Program`] - Elm-style driver that executes commands and reconciles watches
//! - [`SubscriptionManager`] - Start/stop bookkeeping for the single scroll watch
//! - [`SpyView`] - Menu and item snapshots for the presentation layer
//!
//! # How it fits in the system
//! Events arrive from `scrollspy-core` types, pass through [`Program`] into
//! [`ScrollSpy::update`], and leave as [`Effects`] the host applies.

pub mod program;
pub mod resolver;
pub mod spy;
pub mod store;
pub mod subscription;
pub mod view;

pub use program::{Cmd, Effects, Model, Program};
pub use resolver::{ActiveItemResolver, ResolverConfig, should_demote_head};
pub use spy::{ScrollSpy, SpyMsg, SpyStats};
pub use store::{Intent, Item, ItemStatus, MenuState, QueueEntry, VisibilityQueue, VisibilityStore};
pub use subscription::{ScrollWatch, SubId, SubscriptionChange, SubscriptionManager};
pub use view::{ItemRow, MenuEntry, SpyView};
