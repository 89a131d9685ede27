#![forbid(unsafe_code)]

//! `scrollspy-web` is the host-driven bridge for the scroll-spy menu.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes visibility,
//!   geometry, scroll, and click events as JSON.
//! - **No clocks, no threads**: every step is a pure function of the events
//!   pushed so far, which makes sessions recordable and replayable.
//! - **Explicit effects**: scroll-to requests and listener start/stop changes
//!   come back as data; the host applies them.
//!
//! This crate does not bind to `wasm-bindgen`; a thin JS shim can wrap
//! [`StepSession`] with string-in/string-out methods.

pub mod session_record;
pub mod step_session;

use std::collections::HashMap;
use std::fmt;

use scrollspy_core::event::Event;
use scrollspy_core::geometry::Bounds;
use scrollspy_core::item::{Color, ElementHandle};
use scrollspy_runtime::subscription::SubscriptionChange;
use scrollspy_runtime::view::SpyView;
use serde::{Deserialize, Serialize};

pub use session_record::{
    ReplayError, ReplayMismatch, ReplayResult, SessionRecorder, SessionTrace, TraceError,
    TraceRecord, replay,
};
pub use step_session::{StepResult, StepSession};

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Name of the hash used for output fingerprints.
pub const OUTPUT_HASH_ALGO: &str = "fnv1a64";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Web bridge error type.
#[derive(Debug)]
pub enum HostError {
    /// A host payload was not valid JSON for the expected shape.
    Json(serde_json::Error),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed host payload: {e}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for HostError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ---------------------------------------------------------------------------
// Host events
// ---------------------------------------------------------------------------

/// Event payload pushed by the host, tagged by `"type"`.
///
/// Unrecognized tags decode to [`HostEvent::Unknown`] and are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The element for `color` was rendered.
    Attach {
        /// Item identity.
        color: Color,
        /// Host node id.
        handle: ElementHandle,
    },
    /// `color` started intersecting the viewport.
    Enter {
        /// Item identity.
        color: Color,
        /// Host node id.
        handle: ElementHandle,
        /// Geometry at the time of the intersection change.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<Bounds>,
    },
    /// `color` stopped intersecting the viewport.
    Leave {
        /// Item identity.
        color: Color,
    },
    /// The page scrolled.
    Scroll {
        /// Absolute vertical offset.
        offset: f64,
    },
    /// Fresh geometry for one element.
    Bounds {
        /// Host node id.
        handle: ElementHandle,
        /// Bounding box relative to the viewport.
        bounds: Bounds,
    },
    /// A menu entry was clicked.
    Click {
        /// Item identity.
        color: Color,
    },
    /// Anything else.
    #[serde(other)]
    Unknown,
}

impl HostEvent {
    /// Decode a single event object.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode either a single event object or an array of them.
    pub fn batch_from_json(json: &str) -> Result<Vec<Self>, HostError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<HostEvent>),
            One(HostEvent),
        }

        Ok(match serde_json::from_str(json)? {
            OneOrMany::Many(events) => events,
            OneOrMany::One(event) => vec![event],
        })
    }

    /// Canonical event for the model, if this payload maps to one.
    ///
    /// `Scroll` maps without a watch sample; the session fills that in.
    pub fn to_event(&self) -> Option<Event> {
        match self {
            Self::Attach { color, handle } => Some(Event::Attached {
                color: color.clone(),
                handle: *handle,
            }),
            Self::Enter { color, handle, .. } => Some(Event::Entered {
                color: color.clone(),
                handle: *handle,
            }),
            Self::Leave { color } => Some(Event::Left {
                color: color.clone(),
            }),
            Self::Scroll { offset } => Some(Event::Scrolled {
                offset: *offset,
                watch: None,
            }),
            Self::Click { color } => Some(Event::MenuClicked {
                color: color.clone(),
            }),
            Self::Bounds { .. } | Self::Unknown => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Last reported bounding box per element.
#[derive(Debug, Clone, Default)]
pub struct GeometryTable {
    bounds: HashMap<ElementHandle, Bounds>,
}

impl GeometryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record geometry for `handle`. Non-finite boxes are dropped.
    pub fn update(&mut self, handle: ElementHandle, bounds: Bounds) -> bool {
        if !bounds.is_finite() {
            tracing::warn!(%handle, "ignoring non-finite bounds");
            return false;
        }
        self.bounds.insert(handle, bounds);
        true
    }

    /// Last known geometry for `handle`.
    pub fn get(&self, handle: ElementHandle) -> Option<Bounds> {
        self.bounds.get(&handle).copied()
    }

    /// Forget geometry for `handle`.
    pub fn remove(&mut self, handle: ElementHandle) {
        self.bounds.remove(&handle);
    }

    /// Number of elements with geometry.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether no geometry is known.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Captured outputs for host consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebOutputs {
    /// Elements to scroll into view, in order.
    pub scroll_requests: Vec<ElementHandle>,
    /// Listener changes to apply, in order.
    pub subscription_changes: Vec<SubscriptionChange>,
    /// Log lines emitted by the model.
    pub logs: Vec<String>,
    /// Latest view, present only when it changed since the last drain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<SpyView>,
    /// Host payloads that were skipped as unknown.
    pub ignored_events: u32,
}

impl WebOutputs {
    /// Whether the host has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.scroll_requests.is_empty()
            && self.subscription_changes.is_empty()
            && self.logs.is_empty()
            && self.view.is_none()
            && self.ignored_events == 0
    }

    /// Serialize for the JS side.
    pub fn to_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(self)?)
    }

    /// `fnv1a64` over the JSON form.
    pub fn checksum(&self) -> Result<u64, HostError> {
        Ok(fnv1a64(self.to_json()?.as_bytes()))
    }

    /// Deterministic fingerprint of these outputs, e.g. `fnv1a64:00ff...`.
    pub fn fingerprint(&self) -> Result<String, HostError> {
        Ok(format!("{}:{:016x}", OUTPUT_HASH_ALGO, self.checksum()?))
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV64_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}
