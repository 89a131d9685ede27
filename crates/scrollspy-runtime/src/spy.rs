#![forbid(unsafe_code)]

//! The scroll-spy session model.
//!
//! [`ScrollSpy`] ties the pieces together for one page session:
//!
//! - visibility events become [`Intent`]s applied to the [`VisibilityStore`];
//! - scroll events update the session's [`ScrollTracker`] and, when a sample
//!   for the current head arrives, ask the [`ActiveItemResolver`] whether to
//!   demote it;
//! - the head of the queue is declared as the only [`ScrollWatch`], so the
//!   runtime releases the old watch on demotion and starts one for the new
//!   head;
//! - menu clicks turn into scroll-to commands when a handle is known.
//!
//! # Invariants
//!
//! 1. At most one watch is declared, always for the queue head.
//! 2. Samples for anything other than the current head are ignored.
//! 3. Demotion goes through the same `LeaveView` intent as a real leave.

use scrollspy_core::config::{Catalog, ConfigError, SpyConfig};
use scrollspy_core::event::{Event, WatchSample};
use scrollspy_core::item::Color;
use scrollspy_core::scroll::ScrollTracker;
use tracing::{debug, info};

use crate::program::{Cmd, Model};
use crate::resolver::{ActiveItemResolver, ResolverConfig};
use crate::store::{Intent, VisibilityStore};
use crate::subscription::ScrollWatch;
use crate::view::SpyView;

/// Messages understood by [`ScrollSpy`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpyMsg {
    /// Apply a store intent.
    Intent(Intent),
    /// The page scrolled to `offset`.
    Scrolled {
        /// Absolute vertical offset.
        offset: f64,
        /// Geometry of the watched head, if a watch is running.
        watch: Option<WatchSample>,
    },
    /// A menu entry was clicked.
    MenuClicked(Color),
}

impl From<Event> for SpyMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Attached { color, handle } => Self::Intent(Intent::AttachHandle { color, handle }),
            Event::Entered { color, handle } => Self::Intent(Intent::EnterView { color, handle }),
            Event::Left { color } => Self::Intent(Intent::LeaveView { color }),
            Event::Scrolled { offset, watch } => Self::Scrolled { offset, watch },
            Event::MenuClicked { color } => Self::MenuClicked(color),
        }
    }
}

impl From<Intent> for SpyMsg {
    fn from(intent: Intent) -> Self {
        Self::Intent(intent)
    }
}

/// Diagnostic counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpyStats {
    /// Intents applied to the store.
    pub intents_applied: u64,
    /// Scroll events observed.
    pub scroll_events: u64,
    /// Heads demoted before leaving the viewport.
    pub demotions: u64,
    /// Samples dropped because they did not describe the current head.
    pub stale_samples: u64,
}

/// Scroll-spy session state.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    store: VisibilityStore,
    tracker: ScrollTracker,
    resolver: ActiveItemResolver,
    stats: SpyStats,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(&Catalog::default(), ActiveItemResolver::default())
    }
}

impl ScrollSpy {
    /// Start a session over `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog, resolver: ActiveItemResolver) -> Self {
        Self {
            store: VisibilityStore::initialize(catalog),
            tracker: ScrollTracker::new(),
            resolver,
            stats: SpyStats::default(),
        }
    }

    /// Start a session from page configuration.
    pub fn from_config(config: &SpyConfig) -> Result<Self, ConfigError> {
        let catalog = config.catalog()?;
        let resolver = ActiveItemResolver::new(ResolverConfig::with_ratio(config.handoff_ratio)?);
        Ok(Self::new(&catalog, resolver))
    }

    /// Current session state.
    pub fn store(&self) -> &VisibilityStore {
        &self.store
    }

    /// Scroll direction memory.
    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    /// Handoff rule.
    pub fn resolver(&self) -> &ActiveItemResolver {
        &self.resolver
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> SpyStats {
        self.stats
    }

    fn apply(&mut self, intent: Intent) {
        debug!(intent = intent.name(), "applying intent");
        if matches!(intent, Intent::Initialize(_)) {
            self.tracker.reset();
        }
        let store = std::mem::take(&mut self.store);
        self.store = store.reduce(intent);
        self.stats.intents_applied += 1;
    }

    fn on_scroll(&mut self, offset: f64, watch: Option<WatchSample>) -> Cmd<SpyMsg> {
        self.stats.scroll_events += 1;
        let direction = self.tracker.observe(offset);

        let Some(sample) = watch else {
            return Cmd::none();
        };
        let Some(head) = self.store.queue().head() else {
            self.stats.stale_samples += 1;
            return Cmd::none();
        };
        if head.color != sample.color {
            debug!(
                sampled = %sample.color,
                head = %head.color,
                "dropping sample for non-head item"
            );
            self.stats.stale_samples += 1;
            return Cmd::none();
        }
        let Some(height) = self.store.item(head.color.as_str()).map(|item| item.height) else {
            return Cmd::none();
        };

        if self
            .resolver
            .should_demote_head(self.store.queue(), sample.bounds, height, direction)
        {
            let color = head.color.clone();
            self.stats.demotions += 1;
            info!(color = %color, top = sample.bounds.top, "demoting active item");
            return Cmd::batch(vec![
                Cmd::log(format!("demoted {color}")),
                Cmd::msg(SpyMsg::Intent(Intent::LeaveView { color })),
            ]);
        }
        Cmd::none()
    }
}

impl Model for ScrollSpy {
    type Message = SpyMsg;
    type View = SpyView;

    fn update(&mut self, msg: SpyMsg) -> Cmd<SpyMsg> {
        match msg {
            SpyMsg::Intent(intent) => {
                self.apply(intent);
                Cmd::none()
            }
            SpyMsg::Scrolled { offset, watch } => self.on_scroll(offset, watch),
            SpyMsg::MenuClicked(color) => match self.store.handle_of(color.as_str()) {
                Some(handle) => Cmd::scroll_to(handle),
                None => {
                    debug!(color = %color, "menu click without a recorded handle");
                    Cmd::none()
                }
            },
        }
    }

    fn view(&self) -> SpyView {
        SpyView::from_store(&self.store)
    }

    fn subscriptions(&self) -> Vec<ScrollWatch> {
        self.store
            .queue()
            .head()
            .map(|head| ScrollWatch {
                color: head.color.clone(),
                handle: head.handle,
            })
            .into_iter()
            .collect()
    }
}
