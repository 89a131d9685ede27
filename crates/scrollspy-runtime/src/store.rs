#![forbid(unsafe_code)]

//! Visibility store: the reducer at the center of the scroll-spy.
//!
//! The store holds two pieces of session state:
//!
//! - [`MenuState`]: one [`Item`] per catalog color, in page order.
//! - [`VisibilityQueue`]: the items currently intersecting the viewport, in
//!   the order they entered it. The head of the queue is the active item.
//!
//! State only changes through [`VisibilityStore::reduce`], which consumes the
//! old state and returns the new one. The store performs no side effects;
//! scrolling and listener registration belong to the caller.
//!
//! # Invariants
//!
//! 1. The queue never holds the same color twice.
//! 2. Every queued color exists in the menu.
//! 3. The set of menu colors is fixed after [`Intent::Initialize`].
//! 4. Intents naming an unknown color are identity transitions.

use indexmap::IndexMap;
use scrollspy_core::config::{Catalog, ConfigError};
use scrollspy_core::item::{Color, ElementHandle};
use smallvec::SmallVec;
use tracing::debug;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Whether an item is currently considered in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum ItemStatus {
    /// Not intersecting the viewport, or demoted.
    #[default]
    NotInView,
    /// Intersecting the viewport.
    InView,
}

impl ItemStatus {
    /// Stable lowercase name for logs and views.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInView => "not_in_view",
            Self::InView => "in_view",
        }
    }
}

/// One catalog entry and its session state.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Identity and display color.
    pub color: Color,
    /// Layout height in pixels.
    pub height: f64,
    /// Visibility status.
    pub status: ItemStatus,
    /// Rendered node, once the host has attached one.
    pub handle: Option<ElementHandle>,
}

/// Color → item mapping, iterated in page order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuState {
    items: IndexMap<Color, Item>,
}

impl MenuState {
    fn from_catalog(catalog: &Catalog) -> Self {
        let mut items = IndexMap::with_capacity(catalog.len());
        for entry in catalog.entries() {
            // Duplicate colors collide: the later height wins, the first position stays.
            items.insert(
                entry.color.clone(),
                Item {
                    color: entry.color.clone(),
                    height: entry.height,
                    status: ItemStatus::NotInView,
                    handle: None,
                },
            );
        }
        Self { items }
    }

    /// Look up an item.
    pub fn get(&self, color: &str) -> Option<&Item> {
        self.items.get(color)
    }

    /// Items in page order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the menu is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get_mut(&mut self, color: &str) -> Option<&mut Item> {
        self.items.get_mut(color)
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// An item currently intersecting the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Item identity.
    pub color: Color,
    /// Node reported when the item entered.
    pub handle: ElementHandle,
}

/// Visible items in order of entry. The head is the active item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibilityQueue {
    entries: SmallVec<[QueueEntry; 8]>,
}

impl VisibilityQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First item to have entered among those still visible.
    pub fn head(&self) -> Option<&QueueEntry> {
        self.entries.first()
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `color` is queued.
    pub fn contains(&self, color: &str) -> bool {
        self.position(color).is_some()
    }

    /// Queue position of `color`.
    pub fn position(&self, color: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.color.as_str() == color)
    }

    /// Entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Colors from head to tail.
    pub fn colors(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.color.as_str()).collect()
    }

    /// Append unless already present. Returns whether the queue changed.
    fn push_unique(&mut self, color: Color, handle: ElementHandle) -> bool {
        if self.contains(color.as_str()) {
            return false;
        }
        self.entries.push(QueueEntry { color, handle });
        true
    }

    /// Remove `color`. Returns whether the queue changed.
    fn remove(&mut self, color: &str) -> bool {
        match self.position(color) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a VisibilityQueue {
    type Item = &'a QueueEntry;
    type IntoIter = std::slice::Iter<'a, QueueEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// A request to transition session state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace all state with a fresh menu built from the catalog.
    Initialize(Catalog),
    /// The item entered the viewport.
    EnterView {
        /// Item identity.
        color: Color,
        /// Node that entered.
        handle: ElementHandle,
    },
    /// The item left the viewport, or was demoted.
    LeaveView {
        /// Item identity.
        color: Color,
    },
    /// Record the rendered node for later navigation.
    AttachHandle {
        /// Item identity.
        color: Color,
        /// Rendered node.
        handle: ElementHandle,
    },
}

impl Intent {
    /// Stable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialize(_) => "initialize",
            Self::EnterView { .. } => "enter_view",
            Self::LeaveView { .. } => "leave_view",
            Self::AttachHandle { .. } => "attach_handle",
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Session state: menu plus visibility queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibilityStore {
    menu: MenuState,
    queue: VisibilityQueue,
}

impl VisibilityStore {
    /// Build the initial state from a validated catalog.
    #[must_use]
    pub fn initialize(catalog: &Catalog) -> Self {
        Self {
            menu: MenuState::from_catalog(catalog),
            queue: VisibilityQueue::new(),
        }
    }

    /// Build the initial state from parallel color/height sequences.
    pub fn try_new<C>(
        colors: impl IntoIterator<Item = C>,
        heights: &[f64],
    ) -> Result<Self, ConfigError>
    where
        C: Into<Color>,
    {
        Ok(Self::initialize(&Catalog::new(colors, heights)?))
    }

    /// Apply one intent, returning the next state.
    #[must_use]
    pub fn reduce(mut self, intent: Intent) -> Self {
        match intent {
            Intent::Initialize(catalog) => Self::initialize(&catalog),
            Intent::EnterView { color, handle } => {
                let Some(item) = self.menu.get_mut(color.as_str()) else {
                    debug!(color = %color, "enter_view for unknown color ignored");
                    return self;
                };
                item.status = ItemStatus::InView;
                self.queue.push_unique(color, handle);
                self
            }
            Intent::LeaveView { color } => {
                let Some(item) = self.menu.get_mut(color.as_str()) else {
                    debug!(color = %color, "leave_view for unknown color ignored");
                    return self;
                };
                item.status = ItemStatus::NotInView;
                self.queue.remove(color.as_str());
                self
            }
            Intent::AttachHandle { color, handle } => {
                match self.menu.get_mut(color.as_str()) {
                    Some(item) => item.handle = Some(handle),
                    None => debug!(color = %color, "attach_handle for unknown color ignored"),
                }
                self
            }
        }
    }

    /// Shorthand for [`Intent::EnterView`].
    #[must_use]
    pub fn mark_entered(self, color: impl Into<Color>, handle: ElementHandle) -> Self {
        self.reduce(Intent::EnterView {
            color: color.into(),
            handle,
        })
    }

    /// Shorthand for [`Intent::LeaveView`].
    #[must_use]
    pub fn mark_left(self, color: impl Into<Color>) -> Self {
        self.reduce(Intent::LeaveView {
            color: color.into(),
        })
    }

    /// Shorthand for [`Intent::AttachHandle`].
    #[must_use]
    pub fn attach_handle(self, color: impl Into<Color>, handle: ElementHandle) -> Self {
        self.reduce(Intent::AttachHandle {
            color: color.into(),
            handle,
        })
    }

    /// Catalog items and their status.
    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    /// Visible items in entry order.
    pub fn queue(&self) -> &VisibilityQueue {
        &self.queue
    }

    /// Color of the active item, if anything is visible.
    pub fn active_color(&self) -> Option<&Color> {
        self.queue.head().map(|e| &e.color)
    }

    /// Look up one item.
    pub fn item(&self, color: &str) -> Option<&Item> {
        self.menu.get(color)
    }

    /// Rendered node recorded for `color`.
    pub fn handle_of(&self, color: &str) -> Option<ElementHandle> {
        self.menu.get(color).and_then(|item| item.handle)
    }
}
