#![forbid(unsafe_code)]

//! Structured logging checks: swallowed failures must still be visible in
//! traces.

use std::sync::{Arc, Mutex};

use folio_nav::{
    ActivationEvent, ActivationReason, NavConfig, NavigationObserver, ObserverConfig, PageModel,
    PaneController, PaneId, RecordingSink, RecordingSurface, Location,
};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_owned(),
            message: visitor.0,
        });
    }
}

fn capture<F: FnOnce()>(run: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, run);
    let captured = events.lock().unwrap().clone();
    captured
}

fn snapshot() -> folio_nav::PageSnapshot {
    PageModel::new(Location::new("https://joeyoyong.com", "/").with_hash("#bio"), "Joey").snapshot()
}

#[test]
fn sink_failure_logs_warning() {
    let events = capture(|| {
        let mut observer = NavigationObserver::new(RecordingSink::new(), ObserverConfig::default());
        observer.sink_mut().fail_with("gtag threw");
        let event = ActivationEvent::new(PaneId::parse("bio").unwrap(), ActivationReason::Click);
        observer.on_activation(&event, &snapshot());
    });
    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN && e.target == "folio_nav::observer")
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].message.contains("analytics sink call failed"));
}

#[test]
fn ignored_activation_logs_debug_only() {
    let events = capture(|| {
        let page = PageModel::new(Location::default(), "t")
            .with_pane(PaneId::parse("home").unwrap(), true);
        let mut ctl = PaneController::new(page, RecordingSurface::new(), NavConfig::default());
        assert!(!ctl.activate("missing", ActivationReason::Click));
    });
    let ignored: Vec<_> = events
        .iter()
        .filter(|e| e.target == "folio_nav::controller")
        .collect();
    assert_eq!(ignored.len(), 1);
    assert_eq!(ignored[0].level, tracing::Level::DEBUG);
    assert!(ignored[0].message.contains("no such pane"));
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
}
