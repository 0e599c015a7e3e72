//! Phase 4: performance optimization.

use crate::dom::NodeId;
use crate::engine::{Engine, EngineError};
use crate::marker::{self, Marker};

/// Leading classic scripts that always run in order.
const CRITICAL_SCRIPTS: usize = 3;

const DEFERRABLE_SCRIPTS: &str = r#"script:not([defer]):not([async]):not([type="module"])"#;

pub const REDUCED_MOTION_CLASS: &str = "uac-reduced-motion";

const UNSIZED_IMAGES: &str = "img:not([width]):not([height])";

impl Engine {
    pub(in crate::engine) fn optimize(&mut self) -> Result<(), EngineError> {
        if self.options.lazy_load {
            self.start_lazy_loading()?;
        }
        self.defer_scripts()?;

        let html = self.doc.document_element();
        self.doc.toggle_class(
            html,
            REDUCED_MOTION_CLASS,
            Some(self.env.prefers_reduced_motion),
        )?;

        self.reserve_image_space()
    }

    fn start_lazy_loading(&mut self) -> Result<(), EngineError> {
        self.lazy.connect();
        let images = self.doc.query_all(self.doc.root(), "img[data-src]");
        let registered = self.lazy.register(&self.doc, images);
        if registered > 0 {
            crate::debug!("enhance"; "observing {} deferred images", registered);
        }
        self.check_lazy()
    }

    /// Defer external classic scripts after the first few, unless marked
    /// `data-critical`.
    fn defer_scripts(&mut self) -> Result<(), EngineError> {
        let scripts = self.doc.query_all(self.doc.root(), DEFERRABLE_SCRIPTS);
        let deferrable: Vec<NodeId> = scripts
            .into_iter()
            .enumerate()
            .filter(|&(index, script)| {
                index >= CRITICAL_SCRIPTS
                    && !self.doc.has_attr(script, "data-critical")
                    && self.doc.has_attr(script, "src")
            })
            .map(|(_, script)| script)
            .collect();

        for &script in &deferrable {
            self.doc.set_attr(script, "defer", "")?;
        }
        if !deferrable.is_empty() {
            crate::debug!("enhance"; "deferred {} scripts", deferrable.len());
        }
        Ok(())
    }

    /// Hold space for images without explicit dimensions.
    fn reserve_image_space(&mut self) -> Result<(), EngineError> {
        for img in self.doc.query_all(self.doc.root(), UNSIZED_IMAGES) {
            if marker::has(&self.doc, img, Marker::Generated)
                || self.doc.style(img, "width").is_some()
            {
                continue;
            }
            self.doc.set_styles(
                img,
                &[("width", "100%"), ("height", "auto"), ("min-height", "50px")],
            )?;
        }
        Ok(())
    }
}
