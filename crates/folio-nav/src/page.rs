#![forbid(unsafe_code)]

//! Owned page state: panes, navigation triggers, location and title.
//!
//! [`PageModel`] is the single mutable copy of everything the controller
//! reads from the document. Hosts build it once at startup (the web crate
//! scans the DOM; tests build it by hand) and hand ownership to the
//! controller.

use serde::Serialize;

use crate::event::PaneId;

/// A content region that can be the sole visible one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub id: PaneId,
    pub active: bool,
}

/// A clickable navigation trigger.
///
/// `target` is the raw attribute value (`"#bio"`), kept unparsed so a
/// malformed attribute stays a silent miss at click time. `styled` marks the
/// nav-bar links that carry the active style; plain buttons and CTA links
/// only navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    pub target: Option<String>,
    pub styled: bool,
    pub active: bool,
}

impl NavigationLink {
    #[must_use]
    pub fn new(target: impl Into<String>, styled: bool) -> Self {
        Self {
            target: Some(target.into()),
            styled,
            active: false,
        }
    }

    #[must_use]
    pub fn target_pane(&self) -> Option<PaneId> {
        self.target.as_deref().and_then(PaneId::parse)
    }
}

/// The parts of `window.location` the core cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub origin: String,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    #[must_use]
    pub fn new(origin: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            pathname: pathname.into(),
            search: String::new(),
            hash: String::new(),
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.set_hash(hash);
        self
    }

    /// Store a fragment, normalizing `"bio"` to `"#bio"` and `"#"` to empty.
    pub fn set_hash(&mut self, hash: impl Into<String>) {
        let hash = hash.into();
        let bare = hash.strip_prefix('#').unwrap_or(&hash);
        self.hash = if bare.is_empty() {
            String::new()
        } else {
            format!("#{bare}")
        };
    }

    #[must_use]
    pub fn href(&self) -> String {
        format!("{}{}{}{}", self.origin, self.pathname, self.search, self.hash)
    }
}

/// Read-only page view handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub title: String,
    pub href: String,
    pub pathname: String,
    pub hash: String,
    pub active_pane: Option<PaneId>,
}

impl PageSnapshot {
    #[must_use]
    pub fn virtual_path(&self) -> String {
        format!("{}{}", self.pathname, self.hash)
    }
}

/// Owned document state for one page.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    panes: Vec<Pane>,
    links: Vec<NavigationLink>,
    location: Location,
    title: String,
}

impl PageModel {
    #[must_use]
    pub fn new(location: Location, title: impl Into<String>) -> Self {
        Self {
            panes: Vec::new(),
            links: Vec::new(),
            location,
            title: title.into(),
        }
    }

    /// Register a pane. Duplicate ids are ignored; the first one wins, the
    /// same way `querySelector` resolves an id.
    #[must_use]
    pub fn with_pane(mut self, id: PaneId, active: bool) -> Self {
        self.push_pane(id, active);
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: NavigationLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn push_pane(&mut self, id: PaneId, active: bool) {
        if self.pane_index(&id).is_none() {
            self.panes.push(Pane { id, active });
        }
    }

    pub fn push_link(&mut self, link: NavigationLink) {
        self.links.push(link);
    }

    #[must_use]
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    #[must_use]
    pub fn links(&self) -> &[NavigationLink] {
        &self.links
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn has_triggers(&self) -> bool {
        !self.links.is_empty()
    }

    #[must_use]
    pub fn pane_index(&self, id: &PaneId) -> Option<usize> {
        self.panes.iter().position(|pane| &pane.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &PaneId) -> bool {
        self.pane_index(id).is_some()
    }

    /// First pane marked active, in document order.
    #[must_use]
    pub fn active_pane(&self) -> Option<&PaneId> {
        self.panes.iter().find(|pane| pane.active).map(|pane| &pane.id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.panes.iter().filter(|pane| pane.active).count()
    }

    /// Index of the active styled link, if any.
    #[must_use]
    pub fn active_link(&self) -> Option<usize> {
        self.links.iter().position(|link| link.active)
    }

    /// First styled link targeting `id`.
    #[must_use]
    pub fn styled_link_for(&self, id: &PaneId) -> Option<usize> {
        self.links
            .iter()
            .position(|link| link.styled && link.target_pane().as_ref() == Some(id))
    }

    pub(crate) fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    /// Clear every active marker, then mark `pane` (and `link`) active.
    pub(crate) fn mark_active(&mut self, pane: usize, link: Option<usize>) {
        for (idx, p) in self.panes.iter_mut().enumerate() {
            p.active = idx == pane;
        }
        for (idx, l) in self.links.iter_mut().enumerate() {
            l.active = Some(idx) == link;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            title: self.title.clone(),
            href: self.location.href(),
            pathname: self.location.pathname.clone(),
            hash: self.location.hash.clone(),
            active_pane: self.active_pane().cloned(),
        }
    }
}
