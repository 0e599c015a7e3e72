//! Heuristic classification of controls and structural blocks.
//!
//! Pure functions: nothing here touches the document. The engine decides what
//! to do with the result and guards it with a marker.

use serde::{Deserialize, Serialize};

use crate::config::RuleTable;
use crate::dom::ElementRef;

/// Semantic intent of an actionable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlIntent {
    Primary,
    Danger,
    Warning,
    Secondary,
}

impl ControlIntent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Secondary => "secondary",
        }
    }

    /// Class applied to styled controls, e.g. `uac-btn-primary`.
    pub fn class(self) -> String {
        format!("uac-btn-{}", self.name())
    }

    /// Inline background colour.
    pub const fn background(self) -> &'static str {
        match self {
            Self::Primary => "#3b82f6",
            Self::Danger => "#ef4444",
            Self::Warning => "#f59e0b",
            Self::Secondary => "#6b7280",
        }
    }
}

/// Structural role of a block element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralRole {
    Card,
    Table,
    Form,
    Plain,
}

/// Text the rules are matched against: visible text, then `value`, then
/// `aria-label`, lowercased.
fn control_text(el: &ElementRef<'_>) -> String {
    let text = el.text();
    let text = text.trim();
    if !text.is_empty() {
        return text.to_lowercase();
    }
    [el.attr("value"), el.attr("aria-label")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// First matching rule wins; unmatched controls are secondary.
pub fn classify_control(rules: &RuleTable, el: ElementRef<'_>) -> ControlIntent {
    rules
        .classify(&control_text(&el))
        .unwrap_or(ControlIntent::Secondary)
}

pub fn classify_role(el: ElementRef<'_>) -> StructuralRole {
    match el.tag() {
        "table" => StructuralRole::Table,
        "form" => StructuralRole::Form,
        "article" => StructuralRole::Card,
        _ if el.classes().any(|c| c.contains("card")) => StructuralRole::Card,
        _ => StructuralRole::Plain,
    }
}
