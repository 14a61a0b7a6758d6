#![forbid(unsafe_code)]

//! Activation events and the `tab:changed` wire payload.
//!
//! Inside the crate there is exactly one canonical shape,
//! [`ActivationEvent`]. The DOM-facing [`TabChangedDetail`] exists only at
//! the boundary: it serializes the canonical `{tabId, reason, targetHash}`
//! form and decodes both historical key spellings.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::page::PageSnapshot;

/// Normalized pane key (element id without the leading `#`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(String);

impl PaneId {
    /// Parse a pane id from either `"bio"` or `"#bio"`.
    ///
    /// Returns `None` for empty input (including a bare `"#"`) and for ids
    /// containing whitespace, which can never match an element id.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let id = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(id.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URL fragment for this pane (`"#" + id`).
    #[must_use]
    pub fn hash(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a pane became active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationReason {
    InitialLoad,
    Click,
    Popstate,
    Hashchange,
    #[serde(rename = "activatePane")]
    ActivatePane,
    Unknown,
}

impl ActivationReason {
    /// Wire spelling used in payloads and analytics params.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitialLoad => "initial_load",
            Self::Click => "click",
            Self::Popstate => "popstate",
            Self::Hashchange => "hashchange",
            Self::ActivatePane => "activatePane",
            Self::Unknown => "unknown",
        }
    }

    /// Lenient parse for reasons arriving from other scripts.
    ///
    /// `initial_load_default` (sent by older tab scripts when no hash was
    /// present) folds into [`Self::InitialLoad`]; anything unrecognized
    /// becomes [`Self::Unknown`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim() {
            "initial_load" | "initial_load_default" => Self::InitialLoad,
            "click" => Self::Click,
            "popstate" => Self::Popstate,
            "hashchange" => Self::Hashchange,
            "activatePane" | "activate_pane" => Self::ActivatePane,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ActivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed activation. Built at activation time, delivered to every
/// subscriber, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEvent {
    pub target: PaneId,
    pub reason: ActivationReason,
}

impl ActivationEvent {
    #[must_use]
    pub fn new(target: PaneId, reason: ActivationReason) -> Self {
        Self { target, reason }
    }

    #[must_use]
    pub fn target_hash(&self) -> String {
        self.target.hash()
    }

    /// Canonical wire payload for the `tab:changed` DOM event.
    #[must_use]
    pub fn to_detail(&self) -> TabChangedDetail {
        TabChangedDetail {
            tab_id: Some(self.target.as_str().to_owned()),
            reason: Some(self.reason.as_str().to_owned()),
            target_hash: Some(self.target_hash()),
        }
    }
}

/// `tab:changed` payload as seen on the DOM boundary.
///
/// Serializes as `{ "tabId", "reason", "targetHash" }`. Decoding accepts
/// `tab_id`/`tabId` and `target_hash`/`targetHash`; when both spellings of a
/// key are present the snake_case one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTabChangedDetail")]
pub struct TabChangedDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hash: Option<String>,
}

#[derive(Deserialize)]
struct RawTabChangedDetail {
    #[serde(default, rename = "tab_id")]
    tab_id_snake: Option<String>,
    #[serde(default, rename = "tabId")]
    tab_id_camel: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default, rename = "target_hash")]
    target_hash_snake: Option<String>,
    #[serde(default, rename = "targetHash")]
    target_hash_camel: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<RawTabChangedDetail> for TabChangedDetail {
    fn from(raw: RawTabChangedDetail) -> Self {
        Self {
            tab_id: non_empty(raw.tab_id_snake).or_else(|| non_empty(raw.tab_id_camel)),
            reason: non_empty(raw.reason),
            target_hash: non_empty(raw.target_hash_snake)
                .or_else(|| non_empty(raw.target_hash_camel)),
        }
    }
}

impl TabChangedDetail {
    /// Decode a detail object from JSON text. Anything that is not an object
    /// decodes to an empty detail.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Resolve the tab id: explicit id, then target hash, then the page's
    /// current hash, then the currently active pane.
    #[must_use]
    pub fn resolve_tab(&self, page: &PageSnapshot) -> Option<PaneId> {
        self.tab_id
            .as_deref()
            .and_then(PaneId::parse)
            .or_else(|| self.target_hash.as_deref().and_then(PaneId::parse))
            .or_else(|| PaneId::parse(&page.hash))
            .or_else(|| page.active_pane.clone())
    }

    #[must_use]
    pub fn resolve_reason(&self) -> ActivationReason {
        self.reason
            .as_deref()
            .map_or(ActivationReason::Unknown, ActivationReason::parse_lenient)
    }
}
