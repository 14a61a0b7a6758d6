#![forbid(unsafe_code)]

//! Analytics sink seam.
//!
//! The browser sink (`gtag`) may be missing entirely (blocked, not loaded
//! yet), so availability is a per-call question: callers check
//! [`AnalyticsSink::is_available`] before every [`AnalyticsSink::send`].

use core::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Analytics event names used by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    PageView,
    TabView,
    ProductDownloadClick,
    ProductScreenshotOpen,
    ProductVideoClick,
    ProductCtaContactClick,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::TabView => "tab_view",
            Self::ProductDownloadClick => "product_download_click",
            Self::ProductScreenshotOpen => "product_screenshot_open",
            Self::ProductVideoClick => "product_video_click",
            Self::ProductCtaContactClick => "product_cta_contact_click",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analytics call: `sink("event", name, params)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: EventName,
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    #[must_use]
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_owned(), Value::String(value.into()));
        self
    }

    /// String param lookup, for assertions and logging.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Failure reported by a sink call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("analytics sink rejected {event}: {message}")]
pub struct SinkError {
    pub event: EventName,
    pub message: String,
}

impl SinkError {
    #[must_use]
    pub fn new(event: EventName, message: impl Into<String>) -> Self {
        Self {
            event,
            message: message.into(),
        }
    }
}

pub trait AnalyticsSink {
    /// Whether the sink can take a call right now.
    fn is_available(&self) -> bool;

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError>;
}

impl<T: AnalyticsSink + ?Sized> AnalyticsSink for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        (**self).send(event)
    }
}

impl<T: AnalyticsSink> AnalyticsSink for Option<T> {
    fn is_available(&self) -> bool {
        self.as_ref().is_some_and(AnalyticsSink::is_available)
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        match self {
            Some(sink) => sink.send(event),
            None => Err(SinkError::new(event.name, "sink missing")),
        }
    }
}

/// Sink that is never available. Stands in for a blocked `gtag`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSink;

impl AnalyticsSink for MissingSink {
    fn is_available(&self) -> bool {
        false
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        Err(SinkError::new(event.name, "sink missing"))
    }
}

/// Sink that records calls in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    fail_with: Option<String>,
    events: Vec<AnalyticsEvent>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `send` fail with `message`.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.fail_with = Some(message.into());
    }

    #[must_use]
    pub fn events(&self) -> &[AnalyticsEvent] {
        &self.events
    }

    #[must_use]
    pub fn names(&self) -> Vec<EventName> {
        self.events.iter().map(|event| event.name).collect()
    }
}

impl AnalyticsSink for RecordingSink {
    fn is_available(&self) -> bool {
        true
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        if let Some(message) = &self.fail_with {
            return Err(SinkError::new(event.name, message.clone()));
        }
        self.events.push(event.clone());
        Ok(())
    }
}
