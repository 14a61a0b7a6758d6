#![forbid(unsafe_code)]

//! Configuration for the controller and observer.
//!
//! Defaults match the live site's markup. A host page can override any field
//! by passing a JSON object to `boot()`; missing keys keep their default.

use serde::{Deserialize, Serialize};

/// What `initialize` does when the URL carries no usable hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPanePolicy {
    /// Activate the pane already marked active in the markup, or the
    /// configured fallback pane when none is.
    #[default]
    Force,
    /// Leave the DOM alone and only announce the markup's active pane.
    AnnounceOnly,
}

/// Pane controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Attribute naming a trigger's target pane (`data-tab="#bio"`).
    pub trigger_attribute: String,
    /// Class shared by every pane.
    pub pane_class: String,
    /// Class of nav-bar links that receive the active style.
    pub nav_link_class: String,
    /// Active marker class for panes and links.
    pub active_class: String,
    /// Pane activated when neither the hash nor the markup names one.
    pub fallback_pane: Option<String>,
    pub default_policy: DefaultPanePolicy,
    /// Also publish every activation as a `tab:changed` DOM event.
    pub dispatch_dom_event: bool,
    pub dom_event_name: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            trigger_attribute: "data-tab".to_owned(),
            pane_class: "tab-pane".to_owned(),
            nav_link_class: "nav-link".to_owned(),
            active_class: "active".to_owned(),
            fallback_pane: Some("home".to_owned()),
            default_policy: DefaultPanePolicy::Force,
            dispatch_dom_event: true,
            dom_event_name: "tab:changed".to_owned(),
        }
    }
}

/// Navigation observer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Pathname prefix identifying the standalone product page.
    pub product_path_prefix: String,
    /// Substring identifying outbound download links.
    pub download_host: String,
    /// Substring identifying embedded video frames.
    pub video_host: String,
    /// Class and href identifying call-to-action links to the contact pane.
    pub contact_cta_class: String,
    pub contact_cta_href: String,
    /// Class of screenshot thumbnails.
    pub screenshot_class: String,
    /// `tab_id` sent when no tab can be resolved.
    pub no_tab_sentinel: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            product_path_prefix: "/artist-website-system".to_owned(),
            download_host: "1drv.ms/".to_owned(),
            video_host: "youtube.com/embed".to_owned(),
            contact_cta_class: "contact-cta".to_owned(),
            contact_cta_href: "/#contact".to_owned(),
            screenshot_class: "screenshot-thumb".to_owned(),
            no_tab_sentinel: "(none)".to_owned(),
        }
    }
}

/// Full configuration handed over by the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub nav: NavConfig,
    pub observer: ObserverConfig,
}

impl FolioConfig {
    /// Parse a JSON config. Empty or whitespace-only input yields defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NavError;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(FolioConfig::from_json("  ").unwrap(), FolioConfig::default());
        assert_eq!(FolioConfig::from_json("{}").unwrap(), FolioConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = FolioConfig::from_json(
            r#"{"nav":{"fallback_pane":"bio","default_policy":"announce_only"}}"#,
        )
        .unwrap();
        assert_eq!(config.nav.fallback_pane.as_deref(), Some("bio"));
        assert_eq!(config.nav.default_policy, DefaultPanePolicy::AnnounceOnly);
        assert_eq!(config.nav.pane_class, "tab-pane");
        assert_eq!(config.observer, ObserverConfig::default());
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = FolioConfig::from_json("{nav:").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
