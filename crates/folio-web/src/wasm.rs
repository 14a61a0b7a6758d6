//! `wasm-bindgen` exports and DOM bindings.

use std::cell::RefCell;
use std::rc::Rc;

use folio_nav::{
    ActivationEvent, ActivationReason, AnalyticsEvent, AnalyticsSink, ClickTarget, FolioConfig,
    Location, NavConfig, NavError, NavigationObserver, PageKind, PageSnapshot, PaneController,
    PaneId, PaneSurface, SinkError, TabChangedDetail,
};
use js_sys::{Function, JSON, Object, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventTarget,
    ScrollBehavior, ScrollToOptions, Window,
};

use crate::dom::{self, AttachReport, RawPane, RawTrigger};
use crate::session::{initialize_with_load_tracking, with_exclusive};

type SharedController = Rc<RefCell<PaneController<DomSurface>>>;
type SharedObserver = Rc<RefCell<NavigationObserver<GtagSink>>>;

thread_local! {
    static CONTROLLER: RefCell<Option<SharedController>> = const { RefCell::new(None) };
}

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let global = js_sys::global();
            if let Ok(console) = Reflect::get(&global, &"console".into()) {
                if let Ok(error) = Reflect::get(&console, &"error".into()) {
                    if let Ok(f) = error.dyn_into::<Function>() {
                        let _ = f.call1(&console, &JsValue::from_str(&format!("{info}")));
                    }
                }
            }
        }));
    });
}

fn js_error(err: &NavError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn host_error(what: &str, err: &JsValue) -> NavError {
    NavError::host(format!("{what}: {err:?}"))
}

fn elements(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.get(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn listen<F>(target: &EventTarget, name: &str, handler: F) -> Result<(), NavError>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .map_err(|err| host_error("addEventListener", &err))?;
    // Listeners live for the page lifetime.
    closure.forget();
    Ok(())
}

fn read_location(window: &Window) -> Location {
    let loc = window.location();
    let mut location = Location::new(
        loc.origin().unwrap_or_default(),
        loc.pathname().unwrap_or_default(),
    );
    location.search = loc.search().unwrap_or_default();
    location.set_hash(loc.hash().unwrap_or_default());
    location
}

/// Snapshot built from the live document, for pages without a controller.
fn live_snapshot(window: &Window, document: &Document, config: &NavConfig) -> PageSnapshot {
    let location = read_location(window);
    let active_pane = document
        .query_selector(&dom::active_pane_selector(config))
        .ok()
        .flatten()
        .and_then(|el| PaneId::parse(&el.id()));
    PageSnapshot {
        title: document.title(),
        href: location.href(),
        pathname: location.pathname.clone(),
        hash: location.hash.clone(),
        active_pane,
    }
}

/// Browser implementation of the controller's effect seam.
pub(crate) struct DomSurface {
    window: Window,
    document: Document,
    triggers: Vec<Element>,
    config: NavConfig,
}

impl DomSurface {
    fn set_class(el: &Element, class: &str, on: bool) {
        let list = el.class_list();
        let result = if on { list.add_1(class) } else { list.remove_1(class) };
        if let Err(err) = result {
            debug!(target: "folio_web", class, error = ?err, "classList update failed");
        }
    }
}

impl PaneSurface for DomSurface {
    fn show_pane(&mut self, pane: &PaneId, link: Option<usize>) {
        let active = self.config.active_class.as_str();
        for el in elements(&self.document, &dom::pane_selector(&self.config)) {
            Self::set_class(&el, active, false);
        }
        for el in elements(&self.document, &dom::nav_link_selector(&self.config)) {
            Self::set_class(&el, active, false);
        }
        if let Some(el) = link.and_then(|idx| self.triggers.get(idx)) {
            Self::set_class(el, active, true);
        }
        if let Some(el) = self.document.get_element_by_id(pane.as_str()) {
            Self::set_class(&el, active, true);
        }
    }

    fn push_hash(&mut self, hash: &str) {
        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(hash)));
        if let Err(err) = pushed {
            warn!(target: "folio_web", hash, error = ?err, "history.pushState failed");
        }
    }

    fn scroll_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

/// Analytics sink backed by the global `gtag` function, resolved per call.
pub(crate) struct GtagSink {
    window: Window,
}

impl GtagSink {
    fn gtag(&self) -> Option<Function> {
        Reflect::get(&self.window, &JsValue::from_str("gtag"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    }
}

impl AnalyticsSink for GtagSink {
    fn is_available(&self) -> bool {
        self.gtag().is_some()
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        let Some(gtag) = self.gtag() else {
            return Err(SinkError::new(event.name, "gtag missing"));
        };
        let params = Object::new();
        for (key, value) in &event.params {
            let value = value
                .as_str()
                .map_or_else(|| JsValue::from_str(&value.to_string()), JsValue::from_str);
            Reflect::set(&params, &JsValue::from_str(key), &value)
                .map_err(|err| SinkError::new(event.name, format!("{err:?}")))?;
        }
        gtag.call3(
            &self.window,
            &JsValue::from_str("event"),
            &JsValue::from_str(event.name.as_str()),
            &params,
        )
        .map(|_| ())
        .map_err(|err| SinkError::new(event.name, format!("{err:?}")))
    }
}

fn scan_page(window: &Window, document: &Document, config: &NavConfig) -> folio_nav::PageModel {
    let panes: Vec<RawPane> = elements(document, &dom::pane_selector(config))
        .iter()
        .map(|el| RawPane {
            id: el.id(),
            class_name: el.class_name(),
        })
        .collect();
    let triggers: Vec<RawTrigger> = elements(document, &dom::trigger_selector(config))
        .iter()
        .map(|el| RawTrigger {
            target: el.get_attribute(&config.trigger_attribute),
            class_name: el.class_name(),
        })
        .collect();
    dom::page_from_parts(read_location(window), &document.title(), &panes, &triggers, config)
}

fn click_target_from(event: &Event, thumbnail_selector: &str) -> Option<ClickTarget> {
    let el = event.target()?.dyn_into::<Element>().ok()?;
    let closest = |selector: &str| el.closest(selector).ok().flatten();
    let anchor = closest("a").map(|a| (a.get_attribute("href"), a.text_content(), a.class_name()));
    let thumbnail = closest(thumbnail_selector)
        .map(|img| (img.get_attribute("data-full"), img.get_attribute("data-caption")));
    let frame = closest("iframe").map(|frame| frame.get_attribute("src"));
    Some(dom::click_target(anchor, thumbnail, frame))
}

fn dispatch_tab_changed(window: &Window, name: &str, event: &ActivationEvent) {
    let detail = match event.to_detail().to_json_string() {
        Ok(json) => JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(err) => {
            warn!(target: "folio_web", error = %err, "tab:changed detail encode failed");
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(custom) => {
            if let Err(err) = window.dispatch_event(&custom) {
                warn!(target: "folio_web", error = ?err, "tab:changed dispatch failed");
            }
        }
        Err(err) => warn!(target: "folio_web", error = ?err, "tab:changed construct failed"),
    }
}

fn detail_from(event: &Event) -> TabChangedDetail {
    let Some(custom) = event.dyn_ref::<CustomEvent>() else {
        return TabChangedDetail::default();
    };
    let detail = custom.detail();
    if detail.is_undefined() || detail.is_null() {
        return TabChangedDetail::default();
    }
    JSON::stringify(&detail)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| TabChangedDetail::from_json_str(&json).ok())
        .unwrap_or_default()
}

fn attach_controller(
    window: &Window,
    controller: &SharedController,
) -> Result<(), NavError> {
    let triggers = controller.borrow().surface().triggers.clone();
    for (idx, trigger) in triggers.iter().enumerate() {
        let ctl = Rc::clone(controller);
        listen(trigger, "click", move |event| {
            event.prevent_default();
            with_exclusive(&ctl, "trigger click", |ctl| ctl.handle_trigger_at(idx));
        })?;
    }

    let ctl = Rc::clone(controller);
    let win = window.clone();
    listen(window, "popstate", move |_| {
        let hash = win.location().hash().unwrap_or_default();
        with_exclusive(&ctl, "popstate", |ctl| {
            ctl.set_location_hash(&hash);
            ctl.handle_hash_change(ActivationReason::Popstate)
        });
    })?;

    let ctl = Rc::clone(controller);
    let win = window.clone();
    listen(window, "hashchange", move |_| {
        let hash = win.location().hash().unwrap_or_default();
        with_exclusive(&ctl, "hashchange", |ctl| {
            if ctl.hash_is_current(&hash) {
                return false;
            }
            ctl.set_location_hash(&hash);
            ctl.handle_hash_change(ActivationReason::Hashchange)
        });
    })
}

fn attach_observer_only(
    window: &Window,
    document: &Document,
    observer: &SharedObserver,
    config: &FolioConfig,
) -> Result<(), NavError> {
    let snapshot = live_snapshot(window, document, &config.nav);
    let kind = observer.borrow().page_kind(&snapshot);
    with_exclusive(observer, "on_page_load", |obs| obs.on_page_load(&snapshot));
    if kind == PageKind::Product {
        return Ok(());
    }

    let obs = Rc::clone(observer);
    let (win, doc, nav) = (window.clone(), document.clone(), config.nav.clone());
    listen(window, "hashchange", move |_| {
        let page = live_snapshot(&win, &doc, &nav);
        with_exclusive(&obs, "on_hash_change", |obs| obs.on_hash_change(&page));
    })?;

    let obs = Rc::clone(observer);
    let (win, doc, nav) = (window.clone(), document.clone(), config.nav.clone());
    listen(window, &config.nav.dom_event_name, move |event| {
        let detail = detail_from(&event);
        let page = live_snapshot(&win, &doc, &nav);
        with_exclusive(&obs, "on_tab_changed", |obs| obs.on_tab_changed(&detail, &page));
    })
}

fn attach_product_clicks(
    window: &Window,
    document: &Document,
    observer: &SharedObserver,
    config: &FolioConfig,
) -> Result<(), NavError> {
    let obs = Rc::clone(observer);
    let (win, doc, nav) = (window.clone(), document.clone(), config.nav.clone());
    let thumbnail_selector = dom::thumbnail_selector(&config.observer);
    listen(document, "click", move |event| {
        let Some(target) = click_target_from(&event, &thumbnail_selector) else {
            return;
        };
        let page = live_snapshot(&win, &doc, &nav);
        with_exclusive(&obs, "on_interaction", |obs| obs.on_interaction(&target, &page));
    })
}

fn start(config: &FolioConfig) -> Result<AttachReport, NavError> {
    let window = web_sys::window().ok_or(NavError::HostUnavailable { what: "window" })?;
    let document = window
        .document()
        .ok_or(NavError::HostUnavailable { what: "document" })?;

    let observer: SharedObserver = Rc::new(RefCell::new(NavigationObserver::new(
        GtagSink {
            window: window.clone(),
        },
        config.observer.clone(),
    )));
    let mut report = AttachReport {
        analytics: true,
        ..AttachReport::default()
    };

    let page = scan_page(&window, &document, &config.nav);
    let kind = observer.borrow().page_kind(&page.snapshot());
    let surface = DomSurface {
        window: window.clone(),
        document: document.clone(),
        triggers: elements(&document, &dom::trigger_selector(&config.nav)),
        config: config.nav.clone(),
    };

    match PaneController::attach(page, surface, config.nav.clone()) {
        Some(mut controller) => {
            let obs = Rc::clone(&observer);
            controller.subscribe(move |event, page| {
                with_exclusive(&obs, "on_activation", |obs| obs.on_activation(event, page));
            });
            if config.nav.dispatch_dom_event {
                let win = window.clone();
                let name = config.nav.dom_event_name.clone();
                controller.subscribe(move |event, _| dispatch_tab_changed(&win, &name, event));
            }
            let controller = Rc::new(RefCell::new(controller));
            attach_controller(&window, &controller)?;
            initialize_with_load_tracking(&controller, &observer);
            CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
            report.tabs = true;
        }
        None => attach_observer_only(&window, &document, &observer, config)?,
    }

    if kind == PageKind::Product {
        attach_product_clicks(&window, &document, &observer, config)?;
        report.product_clicks = true;
    }

    debug!(
        target: "folio_web",
        tabs = report.tabs,
        product_clicks = report.product_clicks,
        "folio booted"
    );
    Ok(report)
}

fn report_to_js(report: &AttachReport) -> JsValue {
    serde_json::to_string(report)
        .ok()
        .and_then(|json| JSON::parse(&json).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

/// Boot navigation and analytics for the current page.
///
/// `config_json` optionally overrides the defaults (see `FolioConfig`).
/// When the document is still loading, boot is deferred to
/// `DOMContentLoaded` and the report says so.
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let config = FolioConfig::from_json(config_json.as_deref().unwrap_or_default())
        .map_err(|err| js_error(&err))?;

    let window = web_sys::window()
        .ok_or_else(|| js_error(&NavError::HostUnavailable { what: "window" }))?;
    let document = window
        .document()
        .ok_or_else(|| js_error(&NavError::HostUnavailable { what: "document" }))?;

    if document.ready_state() == "loading" {
        listen(&document, "DOMContentLoaded", move |_| {
            if let Err(err) = start(&config) {
                warn!(target: "folio_web", error = %err, "deferred boot failed");
            }
        })
        .map_err(|err| js_error(&err))?;
        return Ok(report_to_js(&AttachReport {
            deferred: true,
            ..AttachReport::default()
        }));
    }

    let report = start(&config).map_err(|err| js_error(&err))?;
    Ok(report_to_js(&report))
}

/// Activate a pane from another script (reason `activatePane`).
///
/// Returns `false` when no controller is attached, the pane does not exist,
/// or an activation is already in progress.
#[wasm_bindgen(js_name = activatePane)]
pub fn activate_pane(id: &str) -> bool {
    CONTROLLER.with(|slot| {
        let slot = slot.borrow();
        let Some(controller) = slot.as_ref() else {
            return false;
        };
        with_exclusive(controller, "activatePane", |ctl| ctl.activate_pane(id)).unwrap_or(false)
    })
}

/// Id of the active pane, if a controller is attached.
#[wasm_bindgen(js_name = activePane)]
pub fn active_pane() -> Option<String> {
    CONTROLLER.with(|slot| {
        let slot = slot.borrow();
        let ctl = slot.as_ref()?.try_borrow().ok()?;
        ctl.active_pane().map(|id| id.as_str().to_owned())
    })
}
