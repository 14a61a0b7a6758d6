#![forbid(unsafe_code)]

//! Host wiring shared by the wasm listeners.
//!
//! DOM events can fire while an activation is still running (a
//! `tab:changed` listener clicking a trigger, for one). The controller and
//! observer live in `RefCell`s, so every listener goes through
//! [`with_exclusive`], which drops the nested call instead of panicking.

use std::cell::RefCell;

use folio_nav::{AnalyticsSink, NavigationObserver, PageKind, PaneController, PaneSurface};
use tracing::warn;

/// Run `f` on the cell's value unless it is already borrowed.
///
/// Returns `None` (and logs at `warn`) for a re-entrant call.
pub fn with_exclusive<T, R>(
    cell: &RefCell<T>,
    what: &'static str,
    f: impl FnOnce(&mut T) -> R,
) -> Option<R> {
    match cell.try_borrow_mut() {
        Ok(mut value) => Some(f(&mut value)),
        Err(_) => {
            warn!(target: "folio_web", call = what, "re-entrant call during activation ignored");
            None
        }
    }
}

/// Initialize the controller and make sure the load produces a `page_view`.
///
/// The controller's `initial_load` activation covers the main site. When it
/// announces nothing, or the page is the product page (where activations are
/// not tracked), the observer records the load directly.
pub fn initialize_with_load_tracking<S, K>(
    controller: &RefCell<PaneController<S>>,
    observer: &RefCell<NavigationObserver<K>>,
) -> bool
where
    S: PaneSurface,
    K: AnalyticsSink,
{
    let Some(announced) = with_exclusive(controller, "initialize", PaneController::initialize)
    else {
        return false;
    };
    let snapshot = controller.borrow().snapshot();
    let kind = observer.borrow().page_kind(&snapshot);
    if !announced || kind == PageKind::Product {
        with_exclusive(observer, "on_page_load", |obs| obs.on_page_load(&snapshot));
    }
    announced
}
