//! Submit-time form validation.

use crate::dom::{Document, Listener, NodeId};
use crate::engine::phases::FIELD_SELECTOR;
use crate::engine::{Action, Engine, EngineError, EventKind};
use crate::marker::{self, Marker};

pub const INVALID_CLASS: &str = "uac-invalid";
pub const ERROR_CLASS: &str = "uac-form-error";

const ERROR_MESSAGE: &str = "Please fill all required fields";
const INVALID_BORDER: &str = "#ef4444";
const INVALID_SHADOW: &str = "0 0 0 3px rgba(239, 68, 68, 0.1)";

/// Current value of a form field as the browser would report it.
pub fn field_value(doc: &Document, field: NodeId) -> String {
    match doc.tag(field) {
        Some("textarea") => doc.text_content(field),
        Some("select") => {
            let options = doc.query_all(field, "option");
            options
                .iter()
                .copied()
                .find(|&o| doc.has_attr(o, "selected"))
                .or_else(|| options.first().copied())
                .map(|o| match doc.attr(o, "value") {
                    Some(value) => value.to_string(),
                    None => doc.text_content(o),
                })
                .unwrap_or_default()
        }
        _ => doc.attr(field, "value").unwrap_or_default().to_string(),
    }
}

impl Engine {
    /// Check every required field. Returns whether the form may submit.
    pub(in crate::engine) fn validate_form(&mut self, form: NodeId) -> Result<bool, EngineError> {
        let required: Vec<NodeId> = self
            .doc
            .query_all(form, FIELD_SELECTOR)
            .into_iter()
            .filter(|&field| self.doc.has_attr(field, "required"))
            .collect();

        let mut invalid = 0;
        for field in required {
            if field_value(&self.doc, field).trim().is_empty() {
                self.mark_invalid(field)?;
                invalid += 1;
            } else {
                self.clear_invalid(field)?;
            }
        }

        self.set_error_notice(form, invalid > 0)?;
        if invalid > 0 {
            crate::debug!("validate"; "blocked submit, {} empty required fields", invalid);
        }
        Ok(invalid == 0)
    }

    fn mark_invalid(&mut self, field: NodeId) -> Result<(), EngineError> {
        self.doc.add_class(field, INVALID_CLASS)?;
        self.doc.set_attr(field, "aria-invalid", "true")?;
        self.doc.set_styles(
            field,
            &[("border-color", INVALID_BORDER), ("box-shadow", INVALID_SHADOW)],
        )?;
        self.bind_once(field, Listener::new(EventKind::Input, Action::ClearInvalidOnInput))?;
        Ok(())
    }

    fn clear_invalid(&mut self, field: NodeId) -> Result<(), EngineError> {
        if !self.doc.has_class(field, INVALID_CLASS) {
            return Ok(());
        }
        self.doc.remove_class(field, INVALID_CLASS)?;
        self.doc.remove_attr(field, "aria-invalid");
        self.doc
            .set_styles(field, &[("border-color", ""), ("box-shadow", "")])?;
        Ok(())
    }

    /// Input on a marked field: clear it once it holds a value.
    pub(in crate::engine) fn revalidate_field(&mut self, field: NodeId) -> Result<(), EngineError> {
        if field_value(&self.doc, field).trim().is_empty() {
            return Ok(());
        }
        self.clear_invalid(field)
    }

    /// Show or drop the single error notice at the top of the form.
    fn set_error_notice(&mut self, form: NodeId, show: bool) -> Result<(), EngineError> {
        let existing = self
            .doc
            .element_children(form)
            .find(|&child| self.doc.has_class(child, ERROR_CLASS));

        match (existing, show) {
            (None, true) => {
                let notice = self
                    .doc
                    .create_element_with("div", &[("class", ERROR_CLASS), ("role", "alert")]);
                let text = self.doc.create_text(ERROR_MESSAGE);
                self.doc.append_child(notice, text)?;
                marker::set(&mut self.doc, notice, Marker::Generated)?;
                self.doc.prepend_child(form, notice)?;
            }
            (Some(notice), false) => self.doc.remove(notice)?,
            _ => {}
        }
        Ok(())
    }
}
