//! Control classification vocabulary.
//!
//! ```toml
//! [[rules]]
//! intent = "primary"
//! keywords = ["save", "submit"]
//!
//! [[rules]]
//! intent = "danger"
//! keywords = ["delete"]
//! ```
//!
//! Rules are evaluated top to bottom; the first rule with a keyword contained
//! in the control's text wins.

use serde::{Deserialize, Serialize};

use crate::classify::ControlIntent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRule {
    pub intent: ControlIntent,
    pub keywords: Vec<String>,
}

impl ControlRule {
    pub fn new(intent: ControlIntent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Whether any keyword occurs in `text` (already lowercased).
    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
    }
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable(Vec<ControlRule>);

impl RuleTable {
    pub fn new(rules: Vec<ControlRule>) -> Self {
        Self(rules)
    }

    pub fn rules(&self) -> &[ControlRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First matching intent, if any.
    pub fn classify(&self, text: &str) -> Option<ControlIntent> {
        self.0.iter().find(|rule| rule.matches(text)).map(|rule| rule.intent)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self(vec![
            ControlRule::new(
                ControlIntent::Primary,
                &["save", "submit", "confirm", "buy", "order", "sign up"],
            ),
            ControlRule::new(
                ControlIntent::Danger,
                &["delete", "remove", "cancel", "reset"],
            ),
            ControlRule::new(
                ControlIntent::Warning,
                &["edit", "update", "modify", "warning", "caution"],
            ),
        ])
    }
}
