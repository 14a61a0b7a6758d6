#![forbid(unsafe_code)]

//! Synchronous activation bus.
//!
//! Handlers run inline, in subscription order, and all of them finish before
//! [`ActivationBus::emit`] returns. There is no queue: an activation and its
//! observers form one uninterrupted unit of work.

use core::fmt;

use crate::event::ActivationEvent;
use crate::page::PageSnapshot;

/// Handle returned by [`ActivationBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

type Handler = Box<dyn FnMut(&ActivationEvent, &PageSnapshot)>;

#[derive(Default)]
pub struct ActivationBus {
    next_id: u32,
    handlers: Vec<(SubscriptionId, Handler)>,
    emitted_total: u64,
}

impl fmt::Debug for ActivationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationBus")
            .field("subscribers", &self.handlers.len())
            .field("emitted_total", &self.emitted_total)
            .finish()
    }
}

impl ActivationBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ActivationEvent, &PageSnapshot) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &ActivationEvent, page: &PageSnapshot) {
        self.emitted_total = self.emitted_total.saturating_add(1);
        for (_, handler) in &mut self.handlers {
            handler(event, page);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn emitted_total(&self) -> u64 {
        self.emitted_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ActivationReason, PaneId};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn snapshot() -> PageSnapshot {
        PageSnapshot {
            title: String::new(),
            href: String::new(),
            pathname: "/".into(),
            hash: "#bio".into(),
            active_pane: PaneId::parse("bio"),
        }
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = ActivationBus::new();
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |event, _| {
                log.borrow_mut().push(format!("{tag}:{}", event.target));
            });
        }
        let event = ActivationEvent::new(PaneId::parse("bio").unwrap(), ActivationReason::Click);
        bus.emit(&event, &snapshot());
        assert_eq!(*log.borrow(), vec!["first:bio", "second:bio"]);
        assert_eq!(bus.emitted_total(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Rc::new(RefCell::new(0u32));
        let mut bus = ActivationBus::new();
        let id = {
            let hits = Rc::clone(&hits);
            bus.subscribe(move |_, _| *hits.borrow_mut() += 1)
        };
        let event = ActivationEvent::new(PaneId::parse("bio").unwrap(), ActivationReason::Click);
        bus.emit(&event, &snapshot());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&event, &snapshot());
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
