//! Phase 1: critical setup.

use crate::embed::css::{self, STYLE_ID};
use crate::engine::{Engine, EngineError};
use crate::debug;

const VIEWPORT_CONTENT: &str = "width=device-width, initial-scale=1, maximum-scale=5";

pub const MOBILE_CLASS: &str = "uac-is-mobile";
pub const DESKTOP_CLASS: &str = "uac-is-desktop";

impl Engine {
    pub(in crate::engine) fn setup(&mut self) -> Result<(), EngineError> {
        self.inject_styles()?;
        if self.options.responsive {
            self.ensure_viewport()?;
        }
        self.detect();
        if self.options.responsive {
            self.apply_breakpoint_classes()?;
        }
        Ok(())
    }

    /// Append the baseline `<style>` block once.
    fn inject_styles(&mut self) -> Result<(), EngineError> {
        if self.doc.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let head = self.doc.head();
        let style = self.build(head, "style", &[("id", STYLE_ID)], &[])?;
        self.doc.set_text(style, &css::essential(self.options.minify))?;
        debug!("enhance"; "essential styles injected");
        Ok(())
    }

    /// Insert a viewport directive as the first child of `<head>`.
    fn ensure_viewport(&mut self) -> Result<(), EngineError> {
        if self.doc.query(self.doc.head(), r#"meta[name="viewport"]"#).is_some() {
            return Ok(());
        }
        let meta = self
            .doc
            .create_element_with("meta", &[("name", "viewport"), ("content", VIEWPORT_CONTENT)]);
        let head = self.doc.head();
        self.doc.prepend_child(head, meta)?;
        debug!("enhance"; "viewport meta added");
        Ok(())
    }

    pub(in crate::engine) fn apply_breakpoint_classes(&mut self) -> Result<(), EngineError> {
        let html = self.doc.document_element();
        self.is_mobile = self.env.viewport.is_mobile();
        self.doc.toggle_class(html, MOBILE_CLASS, Some(self.is_mobile))?;
        self.doc.toggle_class(html, DESKTOP_CLASS, Some(!self.is_mobile))?;
        Ok(())
    }
}
