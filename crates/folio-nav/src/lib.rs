#![forbid(unsafe_code)]

//! `folio-nav` is the host-agnostic core of the folio site's single-page
//! navigation.
//!
//! Two components live here:
//! - [`PaneController`]: owns the pane set, keeps exactly one pane active,
//!   mirrors the active pane into the location hash and publishes one
//!   [`ActivationEvent`] per activation on a synchronous bus.
//! - [`NavigationObserver`]: subscribes to activations (and, on pages without
//!   a controller, to raw hash/click signals) and forwards a normalized view
//!   to an [`AnalyticsSink`].
//!
//! Nothing in this crate touches a browser. DOM effects go through the
//! [`PaneSurface`] trait and analytics through [`AnalyticsSink`]; the
//! `folio-web` crate implements both on top of `web-sys`.

pub mod bus;
pub mod config;
pub mod controller;
pub mod event;
pub mod interaction;
pub mod observer;
pub mod page;
pub mod sink;
pub mod surface;

pub use bus::{ActivationBus, SubscriptionId};
pub use config::{DefaultPanePolicy, FolioConfig, NavConfig, ObserverConfig};
pub use controller::PaneController;
pub use event::{ActivationEvent, ActivationReason, PaneId, TabChangedDetail};
pub use interaction::{ClickTarget, ProductInteraction};
pub use observer::{NavigationObserver, PageKind};
pub use page::{Location, NavigationLink, Pane, PageModel, PageSnapshot};
pub use sink::{AnalyticsEvent, AnalyticsSink, EventName, MissingSink, RecordingSink, SinkError};
pub use surface::{PaneSurface, RecordingSurface, SurfaceEffect};

/// Errors surfaced by `folio-nav` setup paths.
///
/// Navigation itself never fails: unresolvable targets are reported as
/// `false` returns, and analytics failures are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("host environment unavailable: {what}")]
    HostUnavailable { what: &'static str },

    #[error("host call failed: {message}")]
    Host { message: String },
}

impl NavError {
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
