//! End-to-end handoff scenarios driven through `Program<ScrollSpy>`.
//!
//! Each test feeds canonical events in host order and checks the store,
//! the view, and the subscription changes the host would have to apply.

use std::sync::{Arc, Mutex};

use scrollspy_core::config::Catalog;
use scrollspy_core::event::{Event, WatchSample};
use scrollspy_core::geometry::Bounds;
use scrollspy_core::item::{Color, ElementHandle};
use scrollspy_runtime::program::Program;
use scrollspy_runtime::resolver::ActiveItemResolver;
use scrollspy_runtime::spy::ScrollSpy;
use scrollspy_runtime::store::ItemStatus;
use scrollspy_runtime::subscription::SubscriptionChange;
use tracing_subscriber::layer::SubscriberExt;

const H1: ElementHandle = ElementHandle(1);
const H2: ElementHandle = ElementHandle(2);

fn red_blue_program() -> Program<ScrollSpy> {
    let catalog = Catalog::new(["red", "blue"], &[900.0, 900.0]).unwrap();
    let mut program = Program::new(ScrollSpy::new(&catalog, ActiveItemResolver::default()));
    program.init();
    program
}

fn entered(color: &str, handle: ElementHandle) -> Event {
    Event::Entered {
        color: Color::from(color),
        handle,
    }
}

fn scrolled(offset: f64, watch: Option<(&str, f64)>) -> Event {
    Event::Scrolled {
        offset,
        watch: watch.map(|(color, top)| WatchSample {
            color: Color::from(color),
            bounds: Bounds::new(top, 0.0, 1024.0, 900.0),
        }),
    }
}

#[test]
fn red_hands_off_to_blue_when_scrolling_down() {
    let mut program = red_blue_program();

    program.handle_event(entered("red", H1));
    let store = program.model().store();
    assert_eq!(store.queue().colors(), ["red"]);
    assert_eq!(store.item("red").unwrap().status, ItemStatus::InView);

    program.handle_event(entered("blue", H2));
    assert_eq!(program.model().store().queue().colors(), ["red", "blue"]);

    program.handle_event(scrolled(0.0, Some(("red", 0.0))));
    program.handle_event(scrolled(500.0, Some(("red", -500.0))));

    let store = program.model().store();
    assert_eq!(store.queue().colors(), ["blue"]);
    assert_eq!(store.item("red").unwrap().status, ItemStatus::NotInView);
    assert_eq!(
        program.view().active_entry().map(|e| e.color.as_str()),
        Some("blue")
    );
    assert_eq!(program.model().stats().demotions, 1);
    assert_eq!(program.take_effects().logs, vec!["demoted red".to_string()]);
}

#[test]
fn scrolling_up_keeps_red_active() {
    let mut program = red_blue_program();
    program.handle_event(entered("red", H1));
    program.handle_event(entered("blue", H2));

    program.handle_event(scrolled(900.0, None));
    program.handle_event(scrolled(500.0, Some(("red", -500.0))));

    assert_eq!(program.model().store().queue().colors(), ["red", "blue"]);
    assert_eq!(program.model().stats().demotions, 0);
}

#[test]
fn single_visible_item_is_never_demoted() {
    let mut program = red_blue_program();
    program.handle_event(entered("red", H1));
    program.handle_event(scrolled(0.0, None));
    program.handle_event(scrolled(500.0, Some(("red", -500.0))));
    assert_eq!(program.model().store().queue().colors(), ["red"]);
}

#[test]
fn demotion_moves_the_watch_to_the_new_head() {
    let mut program = red_blue_program();
    program.handle_event(entered("red", H1));
    program.handle_event(entered("blue", H2));
    let changes = program.take_effects().subscription_changes;
    assert_eq!(changes.len(), 1);
    let SubscriptionChange::Started { id: red_id, watch } = &changes[0] else {
        panic!("expected a start, got {changes:?}");
    };
    assert_eq!(watch.color.as_str(), "red");
    assert_eq!(watch.handle, H1);
    let red_id = *red_id;

    program.handle_event(scrolled(0.0, None));
    program.handle_event(scrolled(600.0, Some(("red", -600.0))));
    let changes = program.take_effects().subscription_changes;
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].id(), red_id);
    assert!(matches!(changes[0], SubscriptionChange::Stopped { .. }));
    match &changes[1] {
        SubscriptionChange::Started { watch, .. } => assert_eq!(watch.color.as_str(), "blue"),
        other => panic!("expected a start, got {other:?}"),
    }
    assert_eq!(program.subscriptions().active_count(), 1);
    assert!(!program.subscriptions().is_active(red_id));
}

#[test]
fn demoted_item_can_return_as_head() {
    let mut program = red_blue_program();
    program.handle_event(entered("red", H1));
    program.handle_event(entered("blue", H2));
    program.handle_event(scrolled(0.0, None));
    program.handle_event(scrolled(600.0, Some(("red", -600.0))));

    // Red physically leaves, then blue leaves and red comes back on its own.
    program.handle_event(Event::Left {
        color: Color::from("red"),
    });
    program.handle_event(Event::Left {
        color: Color::from("blue"),
    });
    program.take_effects();
    program.handle_event(entered("red", H1));

    let changes = program.take_effects().subscription_changes;
    assert!(matches!(
        changes.as_slice(),
        [SubscriptionChange::Started { watch, .. }] if watch.color.as_str() == "red"
    ));
    assert_eq!(
        program.view().active.as_ref().map(Color::as_str),
        Some("red")
    );
}

#[test]
fn menu_click_requests_scroll_only_with_handle() {
    let mut program = red_blue_program();
    program.handle_event(Event::Attached {
        color: Color::from("blue"),
        handle: H2,
    });
    program.handle_event(Event::MenuClicked {
        color: Color::from("blue"),
    });
    program.handle_event(Event::MenuClicked {
        color: Color::from("red"),
    });
    assert_eq!(program.take_effects().scroll_requests, vec![H2]);
}

#[test]
fn queue_empties_and_watch_stops() {
    let mut program = red_blue_program();
    program.handle_event(entered("red", H1));
    program.take_effects();
    program.handle_event(Event::Left {
        color: Color::from("red"),
    });
    let effects = program.take_effects();
    assert!(matches!(
        effects.subscription_changes.as_slice(),
        [SubscriptionChange::Stopped { .. }]
    ));
    assert!(program.view().active.is_none());
    assert_eq!(program.subscriptions().active_count(), 0);
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Collects event messages emitted while a test runs.
struct MessageCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor<'a>(&'a mut Option<String>);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.messages.lock().unwrap().push(message);
        }
    }
}

#[test]
fn demotion_is_logged() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(MessageCapture {
        messages: messages.clone(),
    });

    tracing::subscriber::with_default(subscriber, || {
        let mut program = red_blue_program();
        program.handle_event(entered("red", H1));
        program.handle_event(entered("blue", H2));
        program.handle_event(scrolled(0.0, None));
        program.handle_event(scrolled(600.0, Some(("red", -600.0))));
    });

    let messages = messages.lock().unwrap();
    assert!(
        messages.iter().any(|m| m.contains("demoting active item")),
        "captured: {messages:?}"
    );
    assert!(messages.iter().any(|m| m.contains("starting scroll watch")));
    assert!(messages.iter().any(|m| m.contains("stopping scroll watch")));
    assert!(messages.iter().any(|m| m.contains("host event")));
    assert!(messages.iter().any(|m| m.contains("executing command")));
}
