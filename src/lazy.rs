//! Viewport-driven deferred image loading.
//!
//! Images carrying `data-src` are observed; once one comes within
//! [`ROOT_MARGIN`] of the viewport its real source is swapped in and it is
//! unobserved, so each image loads at most once.

use rustc_hash::FxHashSet;

use crate::dom::{Document, DomError, NodeId};
use crate::marker::{self, Marker};
use crate::platform::{Layout, Viewport};

/// Look-ahead distance in CSS pixels.
pub const ROOT_MARGIN: f64 = 50.0;

pub const LOADED_CLASS: &str = "uac-loaded";

#[derive(Debug, Default)]
pub struct LazyLoadController {
    observed: Vec<NodeId>,
    seen: FxHashSet<NodeId>,
    connected: bool,
}

impl LazyLoadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self) {
        self.connected = true;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn observed(&self) -> &[NodeId] {
        &self.observed
    }

    /// Observe deferred images among `images`. Already observed or already
    /// loaded images are skipped. Returns how many were added.
    ///
    /// `seen` mirrors `observed`; both drop an image once it is promoted or
    /// detached.
    pub fn register(&mut self, doc: &Document, images: impl IntoIterator<Item = NodeId>) -> usize {
        if !self.connected {
            return 0;
        }
        let mut added = 0;
        for img in images {
            let eligible = doc.tag(img) == Some("img")
                && doc.has_attr(img, "data-src")
                && !marker::has(doc, img, Marker::Loaded);
            if eligible && self.seen.insert(img) {
                self.observed.push(img);
                added += 1;
            }
        }
        added
    }

    /// Promote every observed image intersecting the margin-extended viewport.
    /// Returns the promoted images.
    pub fn check(
        &mut self,
        doc: &mut Document,
        viewport: &Viewport,
        layout: &Layout,
    ) -> Result<Vec<NodeId>, DomError> {
        if !self.connected {
            return Ok(Vec::new());
        }

        let view_top = viewport.scroll_y - ROOT_MARGIN;
        let view_bottom = viewport.scroll_y + f64::from(viewport.height) + ROOT_MARGIN;

        let mut promoted = Vec::new();
        let mut keep = Vec::with_capacity(self.observed.len());
        for &img in &self.observed {
            // Detached: forget it, a re-insertion registers it again
            if !doc.is_connected(img) {
                self.seen.remove(&img);
                continue;
            }
            let visible = layout
                .rect(img)
                .is_some_and(|r| r.top <= view_bottom && r.bottom() >= view_top);
            if !visible {
                keep.push(img);
                continue;
            }

            self.seen.remove(&img);
            if Self::promote(doc, img)? {
                promoted.push(img);
            }
        }
        self.observed = keep;
        Ok(promoted)
    }

    fn promote(doc: &mut Document, img: NodeId) -> Result<bool, DomError> {
        let Some(src) = doc.attr(img, "data-src").map(str::to_string) else {
            return Ok(false);
        };
        if src.is_empty() || marker::has(doc, img, Marker::Loaded) {
            return Ok(false);
        }
        doc.set_attr(img, "src", &src)?;
        marker::set(doc, img, Marker::Loaded)?;
        doc.add_class(img, LOADED_CLASS)?;
        Ok(true)
    }

    /// Stop observing everything.
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.seen.clear();
        self.connected = false;
    }
}
