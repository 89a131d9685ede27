#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] owns session state and reacts to messages; [`Program`] drives
//! it. Each dispatch runs `update`, executes the returned [`Cmd`] tree,
//! then reconciles the model's declared subscriptions. Side effects the host
//! must perform (scrolling, attaching or detaching listeners, logging) are
//! collected into [`Effects`] for the host to drain.
//!
//! Everything runs synchronously on the caller's thread: one message is fully
//! processed, including any follow-up messages it produces, before the next
//! is accepted.

use std::collections::VecDeque;

use scrollspy_core::event::Event;
use scrollspy_core::item::ElementHandle;
use tracing::{debug, debug_span, trace, warn};

use crate::subscription::{ScrollWatch, SubscriptionChange, SubscriptionManager};

/// Upper bound on follow-up messages produced by a single dispatch.
const MAX_CHAINED_MESSAGES: usize = 1024;

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Must be convertible from canonical host events.
    type Message: From<Event> + std::fmt::Debug;

    /// Snapshot handed to the presentation layer.
    type View;

    /// Initialize the model with startup commands.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the core state transition function. Returns commands for any
    /// side effects that should be executed.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Build the current view snapshot.
    fn view(&self) -> Self::View;

    /// Declare active scroll watches.
    ///
    /// Called after each `update()`. Returning an empty vec stops all watches.
    fn subscriptions(&self) -> Vec<ScrollWatch> {
        vec![]
    }
}

/// Commands returned from `update`.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Ask the host to scroll an element into view.
    ScrollTo(ElementHandle),
    /// Emit a log line to the host.
    Log(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::ScrollTo(h) => f.debug_tuple("ScrollTo").field(h).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a scroll-to command.
    #[inline]
    pub fn scroll_to(handle: ElementHandle) -> Self {
        Self::ScrollTo(handle)
    }

    /// Create a batch of commands.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Whether this is [`Cmd::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::ScrollTo(_) => "ScrollTo",
            Self::Log(_) => "Log",
        }
    }
}

/// Host-facing side effects accumulated since the last drain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effects {
    /// Elements the host should scroll into view, in order.
    pub scroll_requests: Vec<ElementHandle>,
    /// Listener changes, in order.
    pub subscription_changes: Vec<SubscriptionChange>,
    /// Log lines.
    pub logs: Vec<String>,
}

impl Effects {
    /// Whether nothing needs the host's attention.
    pub fn is_empty(&self) -> bool {
        self.scroll_requests.is_empty()
            && self.subscription_changes.is_empty()
            && self.logs.is_empty()
    }
}

/// Synchronous driver for a [`Model`].
#[derive(Debug)]
pub struct Program<M: Model> {
    model: M,
    subscriptions: SubscriptionManager,
    effects: Effects,
    initialized: bool,
    messages_processed: u64,
}

impl<M: Model> Program<M> {
    /// Wrap a model. Call [`Program::init`] before dispatching.
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            subscriptions: SubscriptionManager::new(),
            effects: Effects::default(),
            initialized: false,
            messages_processed: 0,
        }
    }

    /// Run `Model::init` and start the initial subscriptions.
    ///
    /// Later calls are ignored.
    pub fn init(&mut self) {
        if self.initialized {
            warn!("Program::init called twice; ignoring");
            return;
        }
        self.initialized = true;
        let cmd = self.model.init();
        self.run(cmd);
    }

    /// Deliver one message and everything it triggers.
    pub fn dispatch(&mut self, msg: M::Message) {
        let span = debug_span!("program.dispatch", seq = self.messages_processed);
        let _guard = span.enter();
        debug!(?msg, "dispatching message");
        self.messages_processed += 1;
        let cmd = self.model.update(msg);
        self.run(cmd);
    }

    /// Convert a host event and dispatch it.
    pub fn handle_event(&mut self, event: Event) {
        trace!(kind = event.kind(), "host event");
        self.dispatch(M::Message::from(event));
    }

    /// Stop all subscriptions (session teardown).
    pub fn shutdown(&mut self) {
        let changes = self.subscriptions.stop_all();
        self.effects.subscription_changes.extend(changes);
    }

    /// Current view snapshot.
    pub fn view(&self) -> M::View {
        self.model.view()
    }

    /// Read access to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Running subscriptions.
    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    /// Messages delivered through [`Program::dispatch`].
    pub fn messages_processed(&self) -> u64 {
        self.messages_processed
    }

    /// Drain accumulated side effects.
    pub fn take_effects(&mut self) -> Effects {
        std::mem::take(&mut self.effects)
    }

    /// Pending side effects without draining them.
    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    fn run(&mut self, cmd: Cmd<M::Message>) {
        let mut pending: VecDeque<M::Message> = VecDeque::new();
        self.execute_cmd(cmd, &mut pending);

        let mut chained = 0usize;
        while let Some(msg) = pending.pop_front() {
            chained += 1;
            if chained > MAX_CHAINED_MESSAGES {
                warn!(
                    dropped = pending.len() + 1,
                    "message chain limit reached; dropping follow-ups"
                );
                break;
            }
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd, &mut pending);
        }

        let changes = self.subscriptions.reconcile(self.model.subscriptions());
        self.effects.subscription_changes.extend(changes);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>, pending: &mut VecDeque<M::Message>) {
        if !cmd.is_none() {
            trace!(cmd = cmd.type_name(), "executing command");
        }
        match cmd {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute_cmd(cmd, pending);
                }
            }
            Cmd::Msg(msg) => pending.push_back(msg),
            Cmd::ScrollTo(handle) => {
                debug!(%handle, "scroll-to requested");
                self.effects.scroll_requests.push(handle);
            }
            Cmd::Log(line) => self.effects.logs.push(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollspy_core::item::Color;

    /// Minimal model: watches whatever color entered last.
    #[derive(Default)]
    struct Echo {
        last: Option<(Color, ElementHandle)>,
        updates: u32,
    }

    #[derive(Debug)]
    enum EchoMsg {
        Event(Event),
        Chain(u32),
    }

    impl From<Event> for EchoMsg {
        fn from(e: Event) -> Self {
            Self::Event(e)
        }
    }

    impl Model for Echo {
        type Message = EchoMsg;
        type View = u32;

        fn init(&mut self) -> Cmd<EchoMsg> {
            Cmd::log("ready")
        }

        fn update(&mut self, msg: EchoMsg) -> Cmd<EchoMsg> {
            self.updates += 1;
            match msg {
                EchoMsg::Event(Event::Entered { color, handle }) => {
                    self.last = Some((color, handle));
                    Cmd::none()
                }
                EchoMsg::Event(Event::MenuClicked { .. }) => Cmd::batch(vec![
                    Cmd::scroll_to(ElementHandle(9)),
                    Cmd::none(),
                    Cmd::log("clicked"),
                ]),
                EchoMsg::Event(_) => Cmd::none(),
                EchoMsg::Chain(0) => Cmd::none(),
                EchoMsg::Chain(n) => Cmd::msg(EchoMsg::Chain(n - 1)),
            }
        }

        fn view(&self) -> u32 {
            self.updates
        }

        fn subscriptions(&self) -> Vec<ScrollWatch> {
            self.last
                .iter()
                .map(|(color, handle)| ScrollWatch {
                    color: color.clone(),
                    handle: *handle,
                })
                .collect()
        }
    }

    #[test]
    fn init_collects_logs_once() {
        let mut program = Program::new(Echo::default());
        program.init();
        program.init();
        assert_eq!(program.take_effects().logs, vec!["ready".to_string()]);
    }

    #[test]
    fn subscriptions_follow_model() {
        let mut program = Program::new(Echo::default());
        program.init();
        program.handle_event(Event::Entered {
            color: Color::from("red"),
            handle: ElementHandle(1),
        });
        let effects = program.take_effects();
        assert_eq!(effects.subscription_changes.len(), 1);
        assert_eq!(program.subscriptions().active_count(), 1);

        program.handle_event(Event::Entered {
            color: Color::from("blue"),
            handle: ElementHandle(2),
        });
        let effects = program.take_effects();
        assert!(matches!(
            effects.subscription_changes[0],
            SubscriptionChange::Stopped { .. }
        ));
        assert!(matches!(
            effects.subscription_changes[1],
            SubscriptionChange::Started { .. }
        ));
    }

    #[test]
    fn batch_executes_in_order() {
        let mut program = Program::new(Echo::default());
        program.handle_event(Event::MenuClicked {
            color: Color::from("red"),
        });
        let effects = program.take_effects();
        assert_eq!(effects.scroll_requests, vec![ElementHandle(9)]);
        assert_eq!(effects.logs, vec!["clicked".to_string()]);
        assert!(program.take_effects().is_empty());
    }

    #[test]
    fn chained_messages_run_to_completion() {
        let mut program = Program::new(Echo::default());
        program.dispatch(EchoMsg::Chain(5));
        assert_eq!(program.view(), 6);
        assert_eq!(program.messages_processed(), 1);
    }

    #[test]
    fn chain_limit_stops_runaway() {
        let mut program = Program::new(Echo::default());
        program.dispatch(EchoMsg::Chain(u32::MAX));
        assert_eq!(program.view() as usize, MAX_CHAINED_MESSAGES + 1);
    }

    #[test]
    fn shutdown_stops_watches() {
        let mut program = Program::new(Echo::default());
        program.handle_event(Event::Entered {
            color: Color::from("red"),
            handle: ElementHandle(1),
        });
        program.take_effects();
        program.shutdown();
        let effects = program.take_effects();
        assert!(matches!(
            effects.subscription_changes.as_slice(),
            [SubscriptionChange::Stopped { id: 1, .. }]
        ));
    }

    #[test]
    fn batch_collapses_trivial_cases() {
        assert!(Cmd::<EchoMsg>::batch(vec![]).is_none());
        assert_eq!(
            Cmd::<EchoMsg>::batch(vec![Cmd::none(), Cmd::log("x")]).type_name(),
            "Log"
        );
    }
}
