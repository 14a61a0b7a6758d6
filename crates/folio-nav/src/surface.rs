#![forbid(unsafe_code)]

//! DOM-effect seam driven by the controller.

use crate::event::PaneId;

/// Side effects the controller asks the host document to perform.
///
/// Implementations must not call back into the controller. Every method is
/// best effort: a host that cannot perform an effect simply skips it.
pub trait PaneSurface {
    /// Make `pane` the only visible pane. `link` is the index (into the
    /// page's trigger list) of the styled link to highlight, if any; every
    /// other link loses its active style.
    fn show_pane(&mut self, pane: &PaneId, link: Option<usize>);

    /// Push a history entry whose URL fragment is `hash`, without reloading.
    fn push_hash(&mut self, hash: &str);

    /// Smooth-scroll the viewport to the top.
    fn scroll_to_top(&mut self);
}

/// One effect captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEffect {
    ShowPane { pane: String, link: Option<usize> },
    PushHash(String),
    ScrollToTop,
}

/// Surface that records effects in order, for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    effects: Vec<SurfaceEffect>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn effects(&self) -> &[SurfaceEffect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<SurfaceEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Hashes pushed so far, oldest first.
    #[must_use]
    pub fn pushed_hashes(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                SurfaceEffect::PushHash(hash) => Some(hash.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PaneSurface for RecordingSurface {
    fn show_pane(&mut self, pane: &PaneId, link: Option<usize>) {
        self.effects.push(SurfaceEffect::ShowPane {
            pane: pane.as_str().to_owned(),
            link,
        });
    }

    fn push_hash(&mut self, hash: &str) {
        self.effects.push(SurfaceEffect::PushHash(hash.to_owned()));
    }

    fn scroll_to_top(&mut self) {
        self.effects.push(SurfaceEffect::ScrollToTop);
    }
}
