#![forbid(unsafe_code)]

//! Declarative scroll-watch subscriptions.
//!
//! Only the active item needs to be evaluated on scroll, so the model
//! declares at most one [`ScrollWatch`] at a time. The host owns the actual
//! listeners; the runtime tells it when to attach and detach them.
//!
//! # How it works
//!
//! 1. `Model::subscriptions()` returns the set of watches that should be live.
//! 2. After each `update()`, [`SubscriptionManager::reconcile`] compares the
//!    declared set against the running set.
//! 3. Watches no longer declared are stopped, new ones started with a fresh
//!    [`SubId`]. Each change is reported as a [`SubscriptionChange`].
//!
//! A watch that is stopped and later declared again gets a new id, so
//! samples tagged with a stale id can be recognized and dropped.

use scrollspy_core::item::{Color, ElementHandle};
use tracing::debug;

/// A unique identifier for a running subscription.
pub type SubId = u64;

/// Request to report scroll geometry for one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScrollWatch {
    /// Item being watched.
    pub color: Color,
    /// Element whose bounds the host should sample on scroll.
    pub handle: ElementHandle,
}

/// Lifecycle change the host must apply to its listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum SubscriptionChange {
    /// Attach a scroll listener for `watch`.
    Started {
        /// Id of the new subscription.
        id: SubId,
        /// What to watch.
        watch: ScrollWatch,
    },
    /// Release the listener previously started under `id`.
    Stopped {
        /// Id of the released subscription.
        id: SubId,
        /// What was being watched.
        watch: ScrollWatch,
    },
}

impl SubscriptionChange {
    /// Id the change refers to.
    pub fn id(&self) -> SubId {
        match self {
            Self::Started { id, .. } | Self::Stopped { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone)]
struct RunningWatch {
    id: SubId,
    watch: ScrollWatch,
}

/// Tracks running watches and diffs them against declarations.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    active: Vec<RunningWatch>,
    next_id: SubId,
    started: u64,
    stopped: u64,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Create a manager with no running watches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            next_id: 1,
            started: 0,
            stopped: 0,
        }
    }

    /// Bring the running set in line with `declared`.
    ///
    /// Stops come before starts in the returned list.
    pub fn reconcile(&mut self, declared: Vec<ScrollWatch>) -> Vec<SubscriptionChange> {
        let mut changes = Vec::new();

        let mut kept = Vec::with_capacity(self.active.len());
        for running in self.active.drain(..) {
            if declared.contains(&running.watch) {
                kept.push(running);
            } else {
                debug!(
                    sub_id = running.id,
                    color = %running.watch.color,
                    "stopping scroll watch"
                );
                self.stopped += 1;
                changes.push(SubscriptionChange::Stopped {
                    id: running.id,
                    watch: running.watch,
                });
            }
        }
        self.active = kept;

        for watch in declared {
            if self.active.iter().any(|r| r.watch == watch) {
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;
            self.started += 1;
            debug!(sub_id = id, color = %watch.color, "starting scroll watch");
            changes.push(SubscriptionChange::Started {
                id,
                watch: watch.clone(),
            });
            self.active.push(RunningWatch { id, watch });
        }

        changes
    }

    /// Stop everything (session teardown).
    pub fn stop_all(&mut self) -> Vec<SubscriptionChange> {
        self.reconcile(Vec::new())
    }

    /// Whether `id` is currently running.
    pub fn is_active(&self, id: SubId) -> bool {
        self.active.iter().any(|r| r.id == id)
    }

    /// Running watches with their ids.
    pub fn active(&self) -> impl Iterator<Item = (SubId, &ScrollWatch)> {
        self.active.iter().map(|r| (r.id, &r.watch))
    }

    /// Number of running watches.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Total watches started since creation.
    pub fn started_total(&self) -> u64 {
        self.started
    }

    /// Total watches stopped since creation.
    pub fn stopped_total(&self) -> u64 {
        self.stopped
    }
}
