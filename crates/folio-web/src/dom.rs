#![forbid(unsafe_code)]

//! DOM-shape helpers shared by the wasm bindings.
//!
//! The bindings read raw strings out of the document (ids, `class`
//! attributes, `data-*` values) and hand them to the builders here, so the
//! mapping from markup to [`PageModel`] and [`ClickTarget`] stays testable
//! without a browser.

use folio_nav::interaction::{AnchorInfo, FrameInfo, ThumbnailInfo};
use folio_nav::{ClickTarget, Location, NavConfig, NavigationLink, ObserverConfig, PageModel, PaneId};
use serde::Serialize;

/// Result of `boot()`, returned to JS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachReport {
    /// Boot was postponed to `DOMContentLoaded`.
    pub deferred: bool,
    /// A pane controller attached (the page has navigation triggers).
    pub tabs: bool,
    /// The navigation observer attached.
    pub analytics: bool,
    /// Product-page click tracking attached.
    pub product_clicks: bool,
}

/// One pane element as read from the DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPane {
    pub id: String,
    pub class_name: String,
}

/// One trigger element as read from the DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTrigger {
    pub target: Option<String>,
    pub class_name: String,
}

#[must_use]
pub fn class_selector(class: &str) -> String {
    format!(".{class}")
}

#[must_use]
pub fn pane_selector(config: &NavConfig) -> String {
    class_selector(&config.pane_class)
}

#[must_use]
pub fn active_pane_selector(config: &NavConfig) -> String {
    format!(".{}.{}", config.pane_class, config.active_class)
}

#[must_use]
pub fn trigger_selector(config: &NavConfig) -> String {
    format!("[{}]", config.trigger_attribute)
}

#[must_use]
pub fn nav_link_selector(config: &NavConfig) -> String {
    class_selector(&config.nav_link_class)
}

#[must_use]
pub fn thumbnail_selector(config: &ObserverConfig) -> String {
    format!("img.{}", config.screenshot_class)
}

#[must_use]
pub fn has_class(class_name: &str, class: &str) -> bool {
    class_name.split_ascii_whitespace().any(|c| c == class)
}

/// Build the owned page model from scanned markup. Panes without a usable
/// id are skipped; they can never be targeted.
#[must_use]
pub fn page_from_parts(
    location: Location,
    title: &str,
    panes: &[RawPane],
    triggers: &[RawTrigger],
    config: &NavConfig,
) -> PageModel {
    let mut page = PageModel::new(location, title);
    for raw in panes {
        if let Some(id) = PaneId::parse(&raw.id) {
            page.push_pane(id, has_class(&raw.class_name, &config.active_class));
        }
    }
    for raw in triggers {
        page.push_link(NavigationLink {
            target: raw.target.clone(),
            styled: has_class(&raw.class_name, &config.nav_link_class),
            active: has_class(&raw.class_name, &config.active_class),
        });
    }
    page
}

/// Build a click description from the closest anchor, thumbnail and iframe
/// attributes.
#[must_use]
pub fn click_target(
    anchor: Option<(Option<String>, Option<String>, String)>,
    thumbnail: Option<(Option<String>, Option<String>)>,
    frame_src: Option<Option<String>>,
) -> ClickTarget {
    ClickTarget {
        anchor: anchor.map(|(href, text, class_name)| AnchorInfo {
            href: href.unwrap_or_default(),
            text: text.unwrap_or_default(),
            classes: class_name
                .split_ascii_whitespace()
                .map(str::to_owned)
                .collect(),
        }),
        thumbnail: thumbnail.map(|(full, caption)| ThumbnailInfo { full, caption }),
        frame: frame_src.map(|src| FrameInfo {
            src: src.unwrap_or_default(),
        }),
    }
}
