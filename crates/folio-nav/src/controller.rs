#![forbid(unsafe_code)]

//! Pane controller: the single-active-pane state machine.
//!
//! Every transition (click, popstate, hashchange, initial load, programmatic
//! activation) funnels into [`PaneController::activate`], which
//! - clears every pane and link,
//! - activates the resolved pane and its first styled link,
//! - asks the surface to render and scroll, and
//! - publishes one [`ActivationEvent`] on the bus.
//!
//! Targets that do not resolve to a pane are ignored without side effects.

use tracing::{debug, trace};

use crate::bus::{ActivationBus, SubscriptionId};
use crate::config::{DefaultPanePolicy, NavConfig};
use crate::event::{ActivationEvent, ActivationReason, PaneId};
use crate::page::{NavigationLink, PageModel, PageSnapshot};
use crate::surface::PaneSurface;

pub struct PaneController<S: PaneSurface> {
    page: PageModel,
    surface: S,
    bus: ActivationBus,
    config: NavConfig,
    initialized: bool,
}

impl<S: PaneSurface + core::fmt::Debug> core::fmt::Debug for PaneController<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaneController")
            .field("page", &self.page)
            .field("surface", &self.surface)
            .field("bus", &self.bus)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<S: PaneSurface> PaneController<S> {
    /// Create a controller for `page` unconditionally.
    #[must_use]
    pub fn new(page: PageModel, surface: S, config: NavConfig) -> Self {
        Self {
            page,
            surface,
            bus: ActivationBus::new(),
            config,
            initialized: false,
        }
    }

    /// Create a controller only if the page has navigation triggers.
    ///
    /// Pages without triggers (the standalone product page, for one) get no
    /// controller, and the caller falls back to observer-only wiring.
    #[must_use]
    pub fn attach(page: PageModel, surface: S, config: NavConfig) -> Option<Self> {
        if !page.has_triggers() {
            debug!(
                target: "folio_nav::controller",
                panes = page.panes().len(),
                "no navigation triggers on page; controller not attached"
            );
            return None;
        }
        debug!(
            target: "folio_nav::controller",
            panes = page.panes().len(),
            triggers = page.links().len(),
            "controller attached"
        );
        Some(Self::new(page, surface, config))
    }

    /// Make `target` (`"bio"` or `"#bio"`) the active pane.
    ///
    /// Returns `false`, touching nothing and emitting nothing, when the
    /// target does not name an existing pane. Repeating a call leaves the
    /// same DOM state but emits again.
    pub fn activate(&mut self, target: &str, reason: ActivationReason) -> bool {
        let Some(id) = PaneId::parse(target) else {
            debug!(
                target: "folio_nav::controller",
                raw_target = target,
                reason = reason.as_str(),
                "ignored activation: malformed target"
            );
            return false;
        };
        let Some(pane) = self.page.pane_index(&id) else {
            debug!(
                target: "folio_nav::controller",
                pane = id.as_str(),
                reason = reason.as_str(),
                "ignored activation: no such pane"
            );
            return false;
        };

        let link = self.page.styled_link_for(&id);
        self.page.mark_active(pane, link);
        self.surface.show_pane(&id, link);
        self.surface.scroll_to_top();

        let event = ActivationEvent::new(id, reason);
        let snapshot = self.page.snapshot();
        trace!(
            target: "folio_nav::controller",
            pane = event.target.as_str(),
            reason = reason.as_str(),
            link = ?link,
            subscribers = self.bus.subscriber_count(),
            "pane activated"
        );
        self.bus.emit(&event, &snapshot);
        true
    }

    /// Click on a navigation trigger: push `#target` onto history, then
    /// activate with reason `click`.
    pub fn handle_trigger(&mut self, link: &NavigationLink) -> bool {
        let Some(id) = link.target_pane() else {
            debug!(
                target: "folio_nav::controller",
                raw_target = ?link.target,
                "ignored trigger: missing or malformed target"
            );
            return false;
        };
        self.navigate(&id, ActivationReason::Click)
    }

    /// Push `#id` onto history and activate it. The URL is left alone when
    /// `id` names no pane.
    fn navigate(&mut self, id: &PaneId, reason: ActivationReason) -> bool {
        if !self.page.contains(id) {
            debug!(
                target: "folio_nav::controller",
                pane = id.as_str(),
                reason = reason.as_str(),
                "ignored navigation: no such pane"
            );
            return false;
        }
        let hash = id.hash();
        self.surface.push_hash(&hash);
        self.page.location_mut().set_hash(hash);
        self.activate(id.as_str(), reason)
    }

    /// [`Self::handle_trigger`] for the trigger at `index` in the page's
    /// trigger list.
    pub fn handle_trigger_at(&mut self, index: usize) -> bool {
        match self.page.links().get(index).cloned() {
            Some(link) => self.handle_trigger(&link),
            None => false,
        }
    }

    /// Browser-driven hash change: activate the pane named by the current
    /// location hash. An empty hash is a no-op.
    pub fn handle_hash_change(&mut self, reason: ActivationReason) -> bool {
        let hash = self.page.location().hash.clone();
        if hash.is_empty() {
            return false;
        }
        self.activate(&hash, reason)
    }

    /// One-time page-load activation.
    ///
    /// A resolvable hash wins. Otherwise the [`DefaultPanePolicy`] decides:
    /// `Force` activates the markup's active pane or the fallback pane,
    /// `AnnounceOnly` emits an `initial_load` event for the markup's active
    /// pane without touching the DOM. Later calls return `false`.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            debug!(target: "folio_nav::controller", "initialize called twice; ignored");
            return false;
        }
        self.initialized = true;

        let hash = self.page.location().hash.clone();
        if !hash.is_empty() && self.activate(&hash, ActivationReason::InitialLoad) {
            return true;
        }

        match self.config.default_policy {
            DefaultPanePolicy::Force => {
                let target = self.page.active_pane().cloned().or_else(|| {
                    self.config
                        .fallback_pane
                        .as_deref()
                        .and_then(PaneId::parse)
                });
                match target {
                    Some(id) => self.activate(id.as_str(), ActivationReason::InitialLoad),
                    None => false,
                }
            }
            DefaultPanePolicy::AnnounceOnly => {
                let Some(id) = self.page.active_pane().cloned() else {
                    return false;
                };
                let event = ActivationEvent::new(id, ActivationReason::InitialLoad);
                let snapshot = self.page.snapshot();
                self.bus.emit(&event, &snapshot);
                true
            }
        }
    }

    /// Programmatic activation for other scripts (reason `activatePane`).
    ///
    /// Mirrors the pane into the URL like a click does, so the hash and the
    /// reported `page_path` always name the visible pane.
    pub fn activate_pane(&mut self, target: &str) -> bool {
        let Some(id) = PaneId::parse(target) else {
            debug!(
                target: "folio_nav::controller",
                raw_target = target,
                "ignored activatePane: malformed target"
            );
            return false;
        };
        self.navigate(&id, ActivationReason::ActivatePane)
    }

    /// Mirror a hash the browser already applied (typed URL, back/forward).
    pub fn set_location_hash(&mut self, hash: &str) {
        self.page.location_mut().set_hash(hash);
    }

    /// True when `hash` is both the mirrored location hash and the active
    /// pane. Hosts use it to skip a `hashchange` a `popstate` already served.
    #[must_use]
    pub fn hash_is_current(&self, hash: &str) -> bool {
        let Some(id) = PaneId::parse(hash) else {
            return self.page.location().hash.is_empty();
        };
        self.page.location().hash == id.hash() && self.page.active_pane() == Some(&id)
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ActivationEvent, &PageSnapshot) + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub fn active_pane(&self) -> Option<&PaneId> {
        self.page.active_pane()
    }

    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        self.page.snapshot()
    }

    #[must_use]
    pub fn page(&self) -> &PageModel {
        &self.page
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
