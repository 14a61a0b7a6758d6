#![forbid(unsafe_code)]

//! Navigation observer: activations and clicks in, analytics calls out.
//!
//! The observer holds no navigation state. Every call is computed from its
//! arguments and the page snapshot taken at call time, and the observer
//! never mutates the document.
//!
//! Two guarantees hold for every emission:
//! - the sink's availability is checked first, and an absent or failing
//!   sink never surfaces to the caller;
//! - params carry structural metadata only. Keys that could hold form input
//!   and values shaped like email addresses are dropped before sending.

use tracing::{trace, warn};

use crate::config::ObserverConfig;
use crate::event::{ActivationEvent, ActivationReason, PaneId, TabChangedDetail};
use crate::interaction::{ClickTarget, ProductInteraction, classify};
use crate::page::PageSnapshot;
use crate::sink::{AnalyticsEvent, AnalyticsSink, EventName};

const PII_KEYS: &[&str] = &["name", "email", "message", "subject", "phone"];

/// Which flavour of page the observer is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The tabbed main site (hash-routed panes).
    Main,
    /// The standalone product page (no hash routing).
    Product,
}

#[derive(Debug)]
pub struct NavigationObserver<K: AnalyticsSink> {
    sink: K,
    config: ObserverConfig,
    emitted_total: u64,
    skipped_total: u64,
}

impl<K: AnalyticsSink> NavigationObserver<K> {
    #[must_use]
    pub fn new(sink: K, config: ObserverConfig) -> Self {
        Self {
            sink,
            config,
            emitted_total: 0,
            skipped_total: 0,
        }
    }

    #[must_use]
    pub fn page_kind(&self, page: &PageSnapshot) -> PageKind {
        if !self.config.product_path_prefix.is_empty()
            && page.pathname.starts_with(&self.config.product_path_prefix)
        {
            PageKind::Product
        } else {
            PageKind::Main
        }
    }

    /// Forward one activation as `page_view` followed by `tab_view`.
    ///
    /// Ignored on the product page. Returns the number of calls delivered.
    pub fn on_activation(&mut self, event: &ActivationEvent, page: &PageSnapshot) -> usize {
        if self.page_kind(page) == PageKind::Product {
            return 0;
        }
        self.track_navigation(Some(&event.target), event.reason, page)
    }

    /// Forward a `tab:changed` payload from another script, normalizing
    /// either key spelling and falling back to the hash, then the active pane.
    pub fn on_tab_changed(&mut self, detail: &TabChangedDetail, page: &PageSnapshot) -> usize {
        if self.page_kind(page) == PageKind::Product {
            return 0;
        }
        let tab = detail.resolve_tab(page);
        self.track_navigation(tab.as_ref(), detail.resolve_reason(), page)
    }

    /// Page-load tracking for pages without a controller: one `page_view`
    /// everywhere, plus a `tab_view` on the main site.
    pub fn on_page_load(&mut self, page: &PageSnapshot) -> usize {
        match self.page_kind(page) {
            PageKind::Product => usize::from(self.track_page_view(ActivationReason::InitialLoad, page)),
            PageKind::Main => {
                let tab = Self::current_tab(page);
                self.track_navigation(tab.as_ref(), ActivationReason::InitialLoad, page)
            }
        }
    }

    /// Raw `hashchange` on a main-site page that has no controller.
    pub fn on_hash_change(&mut self, page: &PageSnapshot) -> usize {
        if self.page_kind(page) == PageKind::Product {
            return 0;
        }
        let tab = Self::current_tab(page);
        self.track_navigation(tab.as_ref(), ActivationReason::Hashchange, page)
    }

    /// Product-page click. Emits at most one event; returns the matched
    /// interaction when one was recognized.
    pub fn on_interaction(
        &mut self,
        target: &ClickTarget,
        page: &PageSnapshot,
    ) -> Option<ProductInteraction> {
        if self.page_kind(page) != PageKind::Product {
            return None;
        }
        let interaction = classify(target, &self.config)?;
        self.emit(interaction.to_event(&page.pathname));
        Some(interaction)
    }

    fn current_tab(page: &PageSnapshot) -> Option<PaneId> {
        PaneId::parse(&page.hash).or_else(|| page.active_pane.clone())
    }

    fn track_navigation(
        &mut self,
        tab: Option<&PaneId>,
        reason: ActivationReason,
        page: &PageSnapshot,
    ) -> usize {
        let path = page.virtual_path();
        let mut delivered = usize::from(self.track_page_view(reason, page));
        let tab_id = tab.map_or(self.config.no_tab_sentinel.as_str(), PaneId::as_str);
        let tab_view = AnalyticsEvent::new(EventName::TabView)
            .with("tab_id", tab_id)
            .with("page_path", path)
            .with("navigation_reason", reason.as_str());
        delivered += usize::from(self.emit(tab_view));
        delivered
    }

    fn track_page_view(&mut self, reason: ActivationReason, page: &PageSnapshot) -> bool {
        let page_view = AnalyticsEvent::new(EventName::PageView)
            .with("page_title", page.title.as_str())
            .with("page_location", page.href.as_str())
            .with("page_path", page.virtual_path())
            .with("navigation_reason", reason.as_str());
        self.emit(page_view)
    }

    fn emit(&mut self, event: AnalyticsEvent) -> bool {
        if !self.sink.is_available() {
            self.skipped_total = self.skipped_total.saturating_add(1);
            trace!(
                target: "folio_nav::observer",
                event = event.name.as_str(),
                "analytics sink unavailable; event skipped"
            );
            return false;
        }
        let event = scrub_pii(event);
        match self.sink.send(&event) {
            Ok(()) => {
                self.emitted_total = self.emitted_total.saturating_add(1);
                trace!(
                    target: "folio_nav::observer",
                    event = event.name.as_str(),
                    params = event.params.len(),
                    "analytics event sent"
                );
                true
            }
            Err(err) => {
                self.skipped_total = self.skipped_total.saturating_add(1);
                warn!(
                    target: "folio_nav::observer",
                    event = err.event.as_str(),
                    error = %err,
                    "analytics sink call failed"
                );
                false
            }
        }
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    #[must_use]
    pub fn emitted_total(&self) -> u64 {
        self.emitted_total
    }

    /// Emissions dropped because the sink was missing or failed.
    #[must_use]
    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }
}

fn is_pii_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    PII_KEYS.contains(&key.as_str()) || key.contains("email")
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim().trim_start_matches("mailto:");
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !value.contains('/')
        && !value.chars().any(char::is_whitespace)
}

/// Drop params that could carry user-entered contact details.
fn scrub_pii(mut event: AnalyticsEvent) -> AnalyticsEvent {
    let before = event.params.len();
    event.params.retain(|key, value| {
        !is_pii_key(key) && !value.as_str().is_some_and(looks_like_email)
    });
    let dropped = before - event.params.len();
    if dropped > 0 {
        warn!(
            target: "folio_nav::observer",
            event = event.name.as_str(),
            dropped,
            "dropped params that may contain personal data"
        );
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MissingSink, RecordingSink};
    use pretty_assertions::assert_eq;

    fn main_page(hash: &str, active: Option<&str>) -> PageSnapshot {
        PageSnapshot {
            title: "Joey Oyong".into(),
            href: format!("https://joeyoyong.com/{hash}"),
            pathname: "/".into(),
            hash: hash.into(),
            active_pane: active.and_then(PaneId::parse),
        }
    }

    fn product_page() -> PageSnapshot {
        PageSnapshot {
            title: "Artist Website System".into(),
            href: "https://joeyoyong.com/artist-website-system/".into(),
            pathname: "/artist-website-system/".into(),
            hash: String::new(),
            active_pane: None,
        }
    }

    fn observer() -> NavigationObserver<RecordingSink> {
        NavigationObserver::new(RecordingSink::new(), ObserverConfig::default())
    }

    fn activation(pane: &str, reason: ActivationReason) -> ActivationEvent {
        ActivationEvent::new(PaneId::parse(pane).unwrap(), reason)
    }

    #[test]
    fn activation_emits_page_view_then_tab_view() {
        let mut obs = observer();
        let page = main_page("#bio", Some("bio"));
        assert_eq!(obs.on_activation(&activation("bio", ActivationReason::Click), &page), 2);
        let events = obs.sink().events();
        assert_eq!(obs.sink().names(), vec![EventName::PageView, EventName::TabView]);
        assert_eq!(events[0].param("page_title"), Some("Joey Oyong"));
        assert_eq!(events[0].param("page_location"), Some("https://joeyoyong.com/#bio"));
        assert_eq!(events[0].param("page_path"), Some("/#bio"));
        assert_eq!(events[0].param("navigation_reason"), Some("click"));
        assert_eq!(events[1].param("tab_id"), Some("bio"));
        assert_eq!(events[1].param("page_path"), Some("/#bio"));
        assert_eq!(events[1].param("navigation_reason"), Some("click"));
    }

    #[test]
    fn product_page_ignores_navigation() {
        let mut obs = observer();
        assert_eq!(
            obs.on_activation(&activation("bio", ActivationReason::Click), &product_page()),
            0
        );
        assert_eq!(obs.on_hash_change(&product_page()), 0);
        assert!(obs.sink().events().is_empty());
    }

    #[test]
    fn page_load_on_product_page_is_page_view_only() {
        let mut obs = observer();
        assert_eq!(obs.on_page_load(&product_page()), 1);
        assert_eq!(obs.sink().names(), vec![EventName::PageView]);
    }

    #[test]
    fn page_load_on_main_site_prefers_hash_then_active_pane() {
        let mut obs = observer();
        assert_eq!(obs.on_page_load(&main_page("#fishing", Some("home"))), 2);
        assert_eq!(obs.on_page_load(&main_page("", Some("home"))), 2);
        let events = obs.sink().events();
        assert_eq!(
            obs.sink().names(),
            vec![
                EventName::PageView,
                EventName::TabView,
                EventName::PageView,
                EventName::TabView,
            ]
        );
        assert_eq!(events[1].param("tab_id"), Some("fishing"));
        assert_eq!(events[1].param("page_path"), Some("/#fishing"));
        assert_eq!(events[3].param("tab_id"), Some("home"));
        assert_eq!(events[3].param("page_path"), Some("/"));
        assert!(
            events
                .iter()
                .all(|e| e.param("navigation_reason") == Some("initial_load"))
        );
    }

    #[test]
    fn hash_change_reports_new_hash() {
        let mut obs = observer();
        assert_eq!(obs.on_hash_change(&main_page("#bio", Some("home"))), 2);
        let tab_view = &obs.sink().events()[1];
        assert_eq!(tab_view.param("tab_id"), Some("bio"));
        assert_eq!(tab_view.param("page_path"), Some("/#bio"));
        assert_eq!(tab_view.param("navigation_reason"), Some("hashchange"));
    }

    #[test]
    fn hash_change_without_tab_uses_sentinel() {
        let mut obs = observer();
        obs.on_hash_change(&main_page("", None));
        assert_eq!(obs.sink().events()[1].param("tab_id"), Some("(none)"));
        assert_eq!(obs.sink().events()[1].param("navigation_reason"), Some("hashchange"));
    }

    #[test]
    fn tab_changed_normalizes_legacy_payload() {
        let mut obs = observer();
        let detail =
            TabChangedDetail::from_json_str(r##"{"tab_id":"fishing","target_hash":"#fishing","reason":"initial_load_default"}"##)
                .unwrap();
        obs.on_tab_changed(&detail, &main_page("#fishing", Some("fishing")));
        let tab_view = &obs.sink().events()[1];
        assert_eq!(tab_view.param("tab_id"), Some("fishing"));
        assert_eq!(tab_view.param("navigation_reason"), Some("initial_load"));
    }

    #[test]
    fn missing_sink_is_silent() {
        let mut obs = NavigationObserver::new(MissingSink, ObserverConfig::default());
        assert_eq!(
            obs.on_activation(&activation("bio", ActivationReason::Click), &main_page("#bio", None)),
            0
        );
        assert_eq!(obs.skipped_total(), 2);
        let mut absent: NavigationObserver<Option<RecordingSink>> =
            NavigationObserver::new(None, ObserverConfig::default());
        assert_eq!(absent.on_page_load(&main_page("", None)), 0);
    }

    #[test]
    fn failing_sink_is_swallowed() {
        let mut obs = observer();
        obs.sink_mut().fail_with("gtag threw");
        assert_eq!(
            obs.on_activation(&activation("bio", ActivationReason::Click), &main_page("#bio", None)),
            0
        );
        assert_eq!(obs.emitted_total(), 0);
        assert_eq!(obs.skipped_total(), 2);
    }

    #[test]
    fn interaction_only_on_product_page() {
        let mut obs = observer();
        let cta = ClickTarget::anchor("/#contact", "Contact", &["contact-cta"]);
        assert_eq!(obs.on_interaction(&cta, &main_page("", None)), None);
        assert_eq!(
            obs.on_interaction(&cta, &product_page()),
            Some(ProductInteraction::ContactCta)
        );
        assert_eq!(obs.sink().names(), vec![EventName::ProductCtaContactClick]);
        assert_eq!(
            obs.sink().events()[0].param("page_path"),
            Some("/artist-website-system/")
        );
    }

    #[test]
    fn scrub_drops_contact_fields_and_addresses() {
        let event = AnalyticsEvent::new(EventName::PageView)
            .with("page_title", "hello")
            .with("Email", "a@b.co")
            .with("contact_email", "x")
            .with("link_url", "mailto:joey@example.com")
            .with("page_location", "https://joeyoyong.com/#contact");
        let scrubbed = scrub_pii(event);
        let mut keys: Vec<&str> = scrubbed.params.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["page_location", "page_title"]);
    }
}
