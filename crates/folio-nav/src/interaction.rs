#![forbid(unsafe_code)]

//! Product-page click classification.
//!
//! The host resolves the clicked node's closest anchor, screenshot thumbnail
//! and iframe into a [`ClickTarget`]; [`classify`] picks at most one
//! [`ProductInteraction`]. Match order: download link, screenshot
//! thumbnail, video frame, contact CTA.

use crate::config::ObserverConfig;
use crate::sink::{AnalyticsEvent, EventName};

/// Closest `<a>` ancestor (or self) of the clicked node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorInfo {
    pub href: String,
    pub text: String,
    pub classes: Vec<String>,
}

impl AnchorInfo {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Closest screenshot thumbnail `<img>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailInfo {
    /// `data-full`: the full-size image URL.
    pub full: Option<String>,
    /// `data-caption`: static caption text.
    pub caption: Option<String>,
}

/// Closest `<iframe>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInfo {
    pub src: String,
}

/// Structural description of one click, free of any form content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    pub anchor: Option<AnchorInfo>,
    pub thumbnail: Option<ThumbnailInfo>,
    pub frame: Option<FrameInfo>,
}

impl ClickTarget {
    #[must_use]
    pub fn anchor(href: impl Into<String>, text: impl Into<String>, classes: &[&str]) -> Self {
        Self {
            anchor: Some(AnchorInfo {
                href: href.into(),
                text: text.into(),
                classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn thumbnail(full: Option<&str>, caption: Option<&str>) -> Self {
        Self {
            thumbnail: Some(ThumbnailInfo {
                full: full.map(str::to_owned),
                caption: caption.map(str::to_owned),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn frame(src: impl Into<String>) -> Self {
        Self {
            frame: Some(FrameInfo { src: src.into() }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductInteraction {
    Download { url: String, text: String },
    ScreenshotOpen { full: String, caption: String },
    VideoClick { url: String },
    ContactCta,
}

impl ProductInteraction {
    #[must_use]
    pub const fn event_name(&self) -> EventName {
        match self {
            Self::Download { .. } => EventName::ProductDownloadClick,
            Self::ScreenshotOpen { .. } => EventName::ProductScreenshotOpen,
            Self::VideoClick { .. } => EventName::ProductVideoClick,
            Self::ContactCta => EventName::ProductCtaContactClick,
        }
    }

    #[must_use]
    pub fn to_event(&self, page_path: &str) -> AnalyticsEvent {
        let event = AnalyticsEvent::new(self.event_name());
        let event = match self {
            Self::Download { url, text } => event.with("link_url", url).with("link_text", text),
            Self::ScreenshotOpen { full, caption } => event
                .with("image_full", full)
                .with("image_caption", caption),
            Self::VideoClick { url } => event.with("video_url", url),
            Self::ContactCta => event,
        };
        event.with("page_path", page_path)
    }
}

/// First matching interaction for `target`, if any.
#[must_use]
pub fn classify(target: &ClickTarget, config: &ObserverConfig) -> Option<ProductInteraction> {
    if let Some(anchor) = &target.anchor {
        if !config.download_host.is_empty() && anchor.href.contains(&config.download_host) {
            return Some(ProductInteraction::Download {
                url: anchor.href.clone(),
                text: anchor.text.trim().to_owned(),
            });
        }
    }

    if let Some(thumb) = &target.thumbnail {
        if let Some(full) = thumb.full.as_deref().filter(|f| !f.is_empty()) {
            return Some(ProductInteraction::ScreenshotOpen {
                full: full.to_owned(),
                caption: thumb.caption.clone().unwrap_or_default(),
            });
        }
    }

    if let Some(frame) = &target.frame {
        if !config.video_host.is_empty() && frame.src.contains(&config.video_host) {
            return Some(ProductInteraction::VideoClick {
                url: frame.src.clone(),
            });
        }
    }

    if let Some(anchor) = &target.anchor {
        if anchor.has_class(&config.contact_cta_class) && anchor.href == config.contact_cta_href {
            return Some(ProductInteraction::ContactCta);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ObserverConfig {
        ObserverConfig::default()
    }

    #[test]
    fn download_link_trims_text() {
        let target = ClickTarget::anchor("https://1drv.ms/b/s!guide", "  Download PDF \n", &[]);
        assert_eq!(
            classify(&target, &config()),
            Some(ProductInteraction::Download {
                url: "https://1drv.ms/b/s!guide".into(),
                text: "Download PDF".into(),
            })
        );
    }

    #[test]
    fn download_wins_over_thumbnail() {
        let mut target = ClickTarget::anchor("https://1drv.ms/x", "x", &[]);
        target.thumbnail = Some(ThumbnailInfo {
            full: Some("images/full.png".into()),
            caption: None,
        });
        assert_eq!(
            classify(&target, &config()).map(|i| i.event_name()),
            Some(EventName::ProductDownloadClick)
        );
    }

    #[test]
    fn thumbnail_requires_full_attribute() {
        let with_full = ClickTarget::thumbnail(Some("images/demo-home.png"), Some("Home page"));
        assert_eq!(
            classify(&with_full, &config()),
            Some(ProductInteraction::ScreenshotOpen {
                full: "images/demo-home.png".into(),
                caption: "Home page".into(),
            })
        );
        assert_eq!(classify(&ClickTarget::thumbnail(None, Some("c")), &config()), None);
        assert_eq!(classify(&ClickTarget::thumbnail(Some(""), None), &config()), None);
    }

    #[test]
    fn video_frame_matches_host() {
        let target = ClickTarget::frame("https://www.youtube.com/embed/abc123");
        assert_eq!(
            classify(&target, &config()).map(|i| i.event_name()),
            Some(EventName::ProductVideoClick)
        );
        assert_eq!(classify(&ClickTarget::frame("https://vimeo.com/1"), &config()), None);
    }

    #[test]
    fn contact_cta_needs_class_and_exact_href() {
        let cta = ClickTarget::anchor("/#contact", "Get in touch", &["btn", "contact-cta"]);
        assert_eq!(classify(&cta, &config()), Some(ProductInteraction::ContactCta));
        let wrong_href = ClickTarget::anchor("/#bio", "Bio", &["contact-cta"]);
        assert_eq!(classify(&wrong_href, &config()), None);
        let no_class = ClickTarget::anchor("/#contact", "Contact", &["btn"]);
        assert_eq!(classify(&no_class, &config()), None);
    }

    #[test]
    fn event_params_per_interaction() {
        let event = ProductInteraction::ScreenshotOpen {
            full: "a.png".into(),
            caption: "A".into(),
        }
        .to_event("/artist-website-system/");
        assert_eq!(event.name, EventName::ProductScreenshotOpen);
        assert_eq!(event.param("image_full"), Some("a.png"));
        assert_eq!(event.param("image_caption"), Some("A"));
        assert_eq!(event.param("page_path"), Some("/artist-website-system/"));

        let cta = ProductInteraction::ContactCta.to_event("/p");
        assert_eq!(cta.params.len(), 1);
    }
}
