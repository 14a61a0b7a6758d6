#![forbid(unsafe_code)]

//! Browser front end for `folio-nav`.
//!
//! The JS host loads the module and calls `boot(configJson?)` once. Boot
//! scans the DOM into a [`folio_nav::PageModel`], attaches a pane controller
//! when the page has `[data-tab]` triggers, wires the navigation observer to
//! the global `gtag` function and installs the click/popstate/hashchange
//! listeners. Each part attaches only when its markup exists, so the same
//! bundle is safe on every page of the site.
//!
//! Everything that does not need a live browser lives in [`dom`] and
//! [`session`] and is tested natively.

pub mod dom;
pub mod session;

pub use dom::AttachReport;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{activate_pane, active_pane, boot};
