//! Phase 3: UI enhancement.
//!
//! Sub-passes share one shape: collect targets in the scope, skip anything
//! already marked or generated by the engine, apply, mark last. The scope is
//! the document root for `init`/`refresh` and an added subtree for mutation
//! batches; nothing else differs.

use percent_encoding::percent_decode_str;

use super::in_generated;
use crate::classify::{StructuralRole, classify_control, classify_role};
use crate::dom::{Listener, NodeId};
use crate::engine::{Action, Engine, EngineError, EventKind};
use crate::marker::{self, Marker};
use crate::watch::{BUTTON_SELECTOR, PassSet};

pub const ENHANCED_CLASS: &str = "uac-enhanced";
pub const CARD_CLASS: &str = "uac-card";
pub const LABEL_CLASS: &str = "uac-label";

const CARD_SELECTOR: &str = r#".card, [class*="card"], article"#;

/// Fields that can carry a label and a required value.
pub const FIELD_SELECTOR: &str = concat!(
    r#"input:not([type="hidden"]):not([type="checkbox"]):not([type="radio"])"#,
    r#":not([type="submit"]):not([type="button"]):not([type="reset"]):not([type="image"]), "#,
    "textarea, select"
);

const TABLE_BORDER: &str = "#e5e7eb";
const TABLE_STRIPE: &str = "#f9fafb";

/// Images further down than this many viewport heights load lazily.
const LAZY_THRESHOLD: f64 = 1.5;

const DEFAULT_MENU: &str = "main-menu";

impl Engine {
    /// Run the selected UI sub-passes over `root`'s inclusive subtree.
    pub(in crate::engine) fn enhance_scoped(
        &mut self,
        root: NodeId,
        passes: PassSet,
    ) -> Result<(), EngineError> {
        if passes.buttons {
            self.enhance_buttons(root)?;
        }
        if passes.cards {
            self.enhance_cards(root)?;
        }
        if passes.forms && self.options.form_validation {
            self.enhance_forms(root)?;
        }
        if passes.tables {
            self.enhance_tables(root)?;
        }
        if passes.images {
            self.enhance_images(root)?;
        }
        if passes.anchors {
            self.enhance_anchors(root)?;
        }
        if passes.toggles && self.options.auto_enhance {
            self.enhance_toggles(root)?;
        }
        Ok(())
    }

    /// Matches in `root`'s inclusive subtree outside generated elements.
    fn targets(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.doc
            .query_all_inclusive(root, selector)
            .into_iter()
            .filter(|&node| !in_generated(&self.doc, node))
            .collect()
    }

    /// Attach `listener` unless an identical one is already bound.
    pub(in crate::engine) fn bind_once(
        &mut self,
        node: NodeId,
        listener: Listener,
    ) -> Result<bool, EngineError> {
        if self.doc.listeners(node).contains(&listener) {
            return Ok(false);
        }
        self.doc.add_listener(node, listener)?;
        Ok(true)
    }

    // ========================================================================
    // Controls and cards
    // ========================================================================

    fn enhance_buttons(&mut self, root: NodeId) -> Result<(), EngineError> {
        let mut styled = 0;
        for button in self.targets(root, BUTTON_SELECTOR) {
            if marker::has(&self.doc, button, Marker::Styled) {
                continue;
            }
            let Some(el) = self.doc.element(button) else {
                continue;
            };
            let intent = classify_control(&self.options.rules, el);

            self.doc.add_class(button, &intent.class())?;
            self.doc.add_class(button, ENHANCED_CLASS)?;
            self.doc.set_styles(
                button,
                &[("background-color", intent.background()), ("color", "white")],
            )?;
            marker::set(&mut self.doc, button, Marker::Styled)?;
            styled += 1;
        }
        if styled > 0 {
            crate::debug!("enhance"; "styled {} controls", styled);
        }
        Ok(())
    }

    fn enhance_cards(&mut self, root: NodeId) -> Result<(), EngineError> {
        for card in self.targets(root, CARD_SELECTOR) {
            if marker::has(&self.doc, card, Marker::Styled) {
                continue;
            }
            let is_card = self
                .doc
                .element(card)
                .is_some_and(|el| classify_role(el) == StructuralRole::Card);
            if !is_card {
                continue;
            }
            self.doc.add_class(card, CARD_CLASS)?;
            marker::set(&mut self.doc, card, Marker::Styled)?;
        }
        Ok(())
    }

    // ========================================================================
    // Forms
    // ========================================================================

    /// Forms inside the scope, plus the form the scope itself sits in.
    fn enhance_forms(&mut self, root: NodeId) -> Result<(), EngineError> {
        let mut forms = self.targets(root, "form");
        if let Some(outer) = self.doc.closest(root, "form")
            && !forms.contains(&outer)
            && !in_generated(&self.doc, outer)
        {
            forms.push(outer);
        }
        for form in forms {
            self.enhance_form(form)?;
        }
        Ok(())
    }

    fn enhance_form(&mut self, form: NodeId) -> Result<(), EngineError> {
        for field in self.doc.query_all(form, FIELD_SELECTOR) {
            if marker::has(&self.doc, field, Marker::Enhanced) {
                continue;
            }
            self.label_field(form, field)?;
            marker::set(&mut self.doc, field, Marker::Enhanced)?;
        }

        if !marker::has(&self.doc, form, Marker::Validated) {
            self.bind_once(form, Listener::new(EventKind::Submit, Action::ValidateOnSubmit))?;
            marker::set(&mut self.doc, form, Marker::Validated)?;
        }
        marker::set(&mut self.doc, form, Marker::Enhanced)?;
        Ok(())
    }

    /// Give `field` an id, and a preceding label from its placeholder when
    /// nothing labels it yet.
    fn label_field(&mut self, form: NodeId, field: NodeId) -> Result<(), EngineError> {
        let id = match self.doc.attr(field, "id").filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = self.unique_id("uac-field", 1);
                self.doc.set_attr(field, "id", &id)?;
                id
            }
        };

        if self.doc.closest(field, "label").is_some() {
            return Ok(());
        }
        let labelled = self
            .doc
            .query_all(form, "label")
            .into_iter()
            .any(|label| self.doc.attr(label, "for") == Some(id.as_str()));
        if labelled {
            return Ok(());
        }

        let Some(text) = self
            .doc
            .attr(field, "placeholder")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
        else {
            return Ok(());
        };
        let Some(parent) = self.doc.parent(field) else {
            return Ok(());
        };

        let label = self
            .doc
            .create_element_with("label", &[("for", id.as_str()), ("class", LABEL_CLASS)]);
        let content = self.doc.create_text(&text);
        self.doc.append_child(label, content)?;
        self.doc.insert_before(parent, label, field)?;
        Ok(())
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn enhance_tables(&mut self, root: NodeId) -> Result<(), EngineError> {
        for table in self.targets(root, "table") {
            if marker::has(&self.doc, table, Marker::Enhanced) {
                continue;
            }
            self.doc.set_styles(
                table,
                &[("width", "100%"), ("border-collapse", "collapse")],
            )?;

            let header_border = format!("2px solid {TABLE_BORDER}");
            for th in self.doc.query_all(table, "th") {
                self.doc.set_styles(
                    th,
                    &[
                        ("padding", "12px"),
                        ("text-align", "left"),
                        ("border-bottom", header_border.as_str()),
                        ("background", TABLE_STRIPE),
                    ],
                )?;
            }
            let cell_border = format!("1px solid {TABLE_BORDER}");
            for td in self.doc.query_all(table, "td") {
                self.doc.set_styles(
                    td,
                    &[("padding", "12px"), ("border-bottom", cell_border.as_str())],
                )?;
            }
            for (index, row) in self.doc.query_all(table, "tr").into_iter().enumerate() {
                if index % 2 == 1 {
                    self.doc.set_style(row, "background", TABLE_STRIPE)?;
                }
            }
            marker::set(&mut self.doc, table, Marker::Enhanced)?;
        }
        Ok(())
    }

    // ========================================================================
    // Images
    // ========================================================================

    fn enhance_images(&mut self, root: NodeId) -> Result<(), EngineError> {
        let images = self.targets(root, "img");
        let layout = self.options.lazy_load.then(|| self.layout());
        let threshold = f64::from(self.env.viewport.height) * LAZY_THRESHOLD;

        for &img in &images {
            if marker::has(&self.doc, img, Marker::Enhanced) {
                continue;
            }
            self.ensure_alt(img)?;
            if self.options.responsive {
                self.doc
                    .set_styles(img, &[("max-width", "100%"), ("height", "auto")])?;
            }

            let below_fold = layout
                .as_ref()
                .and_then(|layout| layout.rect(img))
                .is_some_and(|rect| rect.top > threshold);
            if below_fold
                && !self.doc.has_attr(img, "loading")
                && !self.doc.has_attr(img, "data-src")
            {
                self.doc.set_attr(img, "loading", "lazy")?;
            }
            marker::set(&mut self.doc, img, Marker::Enhanced)?;
        }

        if self.lazy.is_connected() {
            self.lazy.register(&self.doc, images);
            self.check_lazy()?;
        }
        Ok(())
    }

    fn ensure_alt(&mut self, img: NodeId) -> Result<(), EngineError> {
        let decorative = self.doc.attr(img, "aria-hidden") == Some("true")
            || self.doc.attr(img, "role") == Some("presentation");
        let has_alt = self
            .doc
            .attr(img, "alt")
            .is_some_and(|alt| !alt.trim().is_empty());
        if decorative || has_alt {
            return Ok(());
        }
        let src = self
            .doc
            .attr(img, "src")
            .or_else(|| self.doc.attr(img, "data-src"))
            .unwrap_or_default();
        let alt = alt_from_src(src);
        self.doc.set_attr(img, "alt", &alt)?;
        Ok(())
    }

    // ========================================================================
    // Anchors and toggles
    // ========================================================================

    fn enhance_anchors(&mut self, root: NodeId) -> Result<(), EngineError> {
        for anchor in self.targets(root, r##"a[href^="#"]"##) {
            self.bind_once(anchor, Listener::new(EventKind::Click, Action::SmoothScroll))?;
            marker::set(&mut self.doc, anchor, Marker::Enhanced)?;
        }
        Ok(())
    }

    fn enhance_toggles(&mut self, root: NodeId) -> Result<(), EngineError> {
        for trigger in self.targets(root, r#"[data-toggle="modal"][data-target]"#) {
            let Some(target) = self.doc.attr(trigger, "data-target").and_then(target_id) else {
                continue;
            };
            self.bind_once(
                trigger,
                Listener::new(EventKind::Click, Action::ToggleModal { target }),
            )?;
            marker::set(&mut self.doc, trigger, Marker::Enhanced)?;
        }

        for trigger in self.targets(root, r#"[data-toggle="menu"]"#) {
            let target = self
                .doc
                .attr(trigger, "data-target")
                .and_then(target_id)
                .unwrap_or_else(|| DEFAULT_MENU.to_string());
            self.bind_once(
                trigger,
                Listener::new(EventKind::Click, Action::ToggleMenu { target }),
            )?;
            marker::set(&mut self.doc, trigger, Marker::Enhanced)?;
        }
        Ok(())
    }
}

/// `#modal` / `modal` → `modal`.
fn target_id(raw: &str) -> Option<String> {
    let id = raw.trim().trim_start_matches('#');
    (!id.is_empty()).then(|| id.to_string())
}

/// Readable alt text from an image URL: the decoded file stem with
/// separators turned into spaces, or `Image`.
pub fn alt_from_src(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next().unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let decoded = percent_decode_str(stem).decode_utf8_lossy();
    let words: Vec<&str> = decoded
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        "Image".to_string()
    } else {
        words.join(" ")
    }
}
