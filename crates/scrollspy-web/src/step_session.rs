#![forbid(unsafe_code)]

//! Step-based session runner for the scroll-spy.
//!
//! [`StepSession`] drives a [`Program<ScrollSpy>`] without threads or
//! blocking. The host controls the loop:
//!
//! 1. Push events via [`StepSession::push_event`] or [`StepSession::push_json`].
//! 2. Call [`StepSession::step`] to process everything queued.
//! 3. Read effects and the latest view via [`StepSession::take_outputs`].
//!
//! # Example
//!
//! ```ignore
//! use scrollspy_web::{HostEvent, StepSession};
//!
//! let mut session = StepSession::default();
//! session.init();
//! session.push_json(r#"{"type":"enter","color":"red","handle":1}"#)?;
//! session.step();
//! let outputs = session.take_outputs();
//! // Apply outputs.subscription_changes and outputs.scroll_requests...
//! ```
//!
//! Scroll events carry only an offset. When a scroll watch is running, the
//! session attaches the watched element's last reported bounds so the model
//! can evaluate the handoff rule.

use std::collections::VecDeque;

use scrollspy_core::config::{ConfigError, SpyConfig};
use scrollspy_core::event::{Event, WatchSample};
use scrollspy_runtime::program::Program;
use scrollspy_runtime::spy::ScrollSpy;
use scrollspy_runtime::subscription::SubscriptionChange;
use scrollspy_runtime::view::SpyView;
use tracing::{debug, debug_span};

use crate::{GeometryTable, HostError, HostEvent, WebOutputs};

/// Result of a single [`StepSession::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Host events consumed during this step.
    pub events_processed: u32,
    /// Host events skipped as unknown.
    pub events_ignored: u32,
    /// Whether the view changed.
    pub view_changed: bool,
    /// Current step index (monotonically increasing).
    pub step_idx: u64,
}

/// Host-driven, non-blocking scroll-spy session.
pub struct StepSession {
    program: Program<ScrollSpy>,
    queue: VecDeque<HostEvent>,
    geometry: GeometryTable,
    outputs: WebOutputs,
    last_view: Option<SpyView>,
    initialized: bool,
    step_idx: u64,
}

impl Default for StepSession {
    fn default() -> Self {
        Self::new(ScrollSpy::default())
    }
}

impl StepSession {
    /// Wrap a model.
    #[must_use]
    pub fn new(spy: ScrollSpy) -> Self {
        Self {
            program: Program::new(spy),
            queue: VecDeque::new(),
            geometry: GeometryTable::new(),
            outputs: WebOutputs::default(),
            last_view: None,
            initialized: false,
            step_idx: 0,
        }
    }

    /// Build a session from page configuration.
    pub fn from_config(config: &SpyConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ScrollSpy::from_config(config)?))
    }

    /// Initialize the model and publish the first view.
    ///
    /// Later calls are ignored.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.program.init();
        self.collect_outputs();
    }

    /// Queue one host event.
    pub fn push_event(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Decode and queue a JSON object or array. Returns how many were queued.
    ///
    /// Nothing is queued if any element fails to decode.
    pub fn push_json(&mut self, json: &str) -> Result<usize, HostError> {
        let events = HostEvent::batch_from_json(json)?;
        let n = events.len();
        self.queue.extend(events);
        Ok(n)
    }

    /// Number of events waiting for the next step.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Process all queued events.
    pub fn step(&mut self) -> StepResult {
        if !self.initialized {
            self.init();
        }
        let span = debug_span!("step_session.step", step = self.step_idx);
        let _guard = span.enter();

        let mut processed = 0u32;
        let mut ignored = 0u32;
        while let Some(host_event) = self.queue.pop_front() {
            processed = processed.saturating_add(1);
            if !self.deliver(host_event) {
                ignored = ignored.saturating_add(1);
            }
        }
        self.outputs.ignored_events = self.outputs.ignored_events.saturating_add(ignored);

        let view_changed = self.collect_outputs();
        let result = StepResult {
            events_processed: processed,
            events_ignored: ignored,
            view_changed,
            step_idx: self.step_idx,
        };
        self.step_idx += 1;
        debug!(processed, ignored, view_changed, "step complete");
        result
    }

    /// Release every watch (page unmount). The stop changes land in the outputs.
    pub fn shutdown(&mut self) {
        self.program.shutdown();
        self.collect_outputs();
    }

    /// Drain outputs accumulated since the last call.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Outputs accumulated so far, without draining.
    pub fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    /// Current view.
    pub fn view(&self) -> SpyView {
        self.program.view()
    }

    /// Underlying program.
    pub fn program(&self) -> &Program<ScrollSpy> {
        &self.program
    }

    /// Known element geometry.
    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    /// Returns `false` when the event was skipped.
    fn deliver(&mut self, host_event: HostEvent) -> bool {
        match host_event {
            HostEvent::Unknown => {
                debug!("skipping unknown host event");
                false
            }
            HostEvent::Bounds { handle, bounds } => {
                self.geometry.update(handle, bounds);
                true
            }
            HostEvent::Scroll { offset } => {
                let watch = self.watch_sample();
                self.program.handle_event(Event::Scrolled { offset, watch });
                true
            }
            other => {
                if let HostEvent::Enter {
                    handle,
                    bounds: Some(bounds),
                    ..
                } = &other
                {
                    self.geometry.update(*handle, *bounds);
                }
                if let Some(event) = other.to_event() {
                    self.program.handle_event(event);
                }
                true
            }
        }
    }

    /// Geometry of the element under the running watch, if both are known.
    fn watch_sample(&self) -> Option<WatchSample> {
        let (_, watch) = self.program.subscriptions().active().next()?;
        let bounds = self.geometry.get(watch.handle)?;
        Some(WatchSample {
            color: watch.color.clone(),
            bounds,
        })
    }

    /// Move program effects into the outputs. Returns whether the view changed.
    fn collect_outputs(&mut self) -> bool {
        let effects = self.program.take_effects();
        for change in &effects.subscription_changes {
            if let SubscriptionChange::Stopped { id, watch } = change {
                debug!(sub_id = id, color = %watch.color, "watch released");
            }
        }
        self.outputs.scroll_requests.extend(effects.scroll_requests);
        self.outputs
            .subscription_changes
            .extend(effects.subscription_changes);
        self.outputs.logs.extend(effects.logs);

        let view = self.program.view();
        if self.last_view.as_ref() == Some(&view) {
            return false;
        }
        self.last_view = Some(view.clone());
        self.outputs.view = Some(view);
        true
    }
}
