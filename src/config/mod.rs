//! Engine options and `uac.toml` handling.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── rules.rs   # Control classification rule table
//! ├── types/     # Utility types
//! │   ├── error  # ConfigError, ConfigDiagnostics
//! │   ├── field  # FieldPath
//! │   └── handle # Global options handle
//! └── mod.rs     # Options, PartialOptions (this file)
//! ```
//!
//! # Keys
//!
//! | Key                | Default | Purpose                                   |
//! |--------------------|---------|-------------------------------------------|
//! | `autoStyle`        | true    | UI enhancement phase                      |
//! | `autoEnhance`      | true    | Toggle triggers, parallax                 |
//! | `autoOptimize`     | true    | Performance phase                         |
//! | `createHeader`     | false   | Generated header                          |
//! | `createSidebar`    | false   | Generated sidebar                         |
//! | `createNavigation` | false   | Navigation built from headings            |
//! | `createScrollTop`  | true    | Scroll-to-top control                     |
//! | `darkMode`         | auto    | auto, light, dark, system, off            |
//! | `responsive`       | true    | Viewport meta, breakpoint classes, images |
//! | `lazyLoad`         | true    | Deferred image loading                    |
//! | `formValidation`   | true    | Form labels and submit validation         |
//! | `debug`            | false   | Verbose logging                           |
//! | `minify`           | true    | Minify the injected style block           |
//! | `[[rules]]`        | builtin | Control classification vocabulary         |

mod rules;
pub mod types;

pub use rules::{ControlRule, RuleTable};
pub use types::{
    ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath, Severity, cfg, init_config,
};

use crate::log;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ============================================================================
// DarkMode
// ============================================================================

/// How the light/dark decision is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    /// System preference, or night hours (18:00 to 06:00).
    #[default]
    Auto,
    Light,
    Dark,
    /// Follow the system preference.
    System,
    /// Leave the document's theme alone.
    Off,
}

impl DarkMode {
    /// Whether live preference changes re-resolve the theme.
    pub const fn follows_system(self) -> bool {
        matches!(self, Self::Auto | Self::System)
    }
}

// ============================================================================
// Options
// ============================================================================

/// Resolved engine options. Never mutated in place: [`Options::merge`]
/// produces a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub auto_style: bool,
    pub auto_enhance: bool,
    pub auto_optimize: bool,

    pub create_header: bool,
    pub create_sidebar: bool,
    pub create_navigation: bool,
    pub create_scroll_top: bool,

    pub dark_mode: DarkMode,
    pub responsive: bool,
    pub lazy_load: bool,
    pub form_validation: bool,

    pub debug: bool,
    pub minify: bool,

    /// Ordered control classification rules.
    pub rules: RuleTable,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_style: true,
            auto_enhance: true,
            auto_optimize: true,
            create_header: false,
            create_sidebar: false,
            create_navigation: false,
            create_scroll_top: true,
            dark_mode: DarkMode::Auto,
            responsive: true,
            lazy_load: true,
            form_validation: true,
            debug: false,
            minify: true,
            rules: RuleTable::default(),
        }
    }
}

/// Caller-supplied overrides; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialOptions {
    pub auto_style: Option<bool>,
    pub auto_enhance: Option<bool>,
    pub auto_optimize: Option<bool>,
    pub create_header: Option<bool>,
    pub create_sidebar: Option<bool>,
    pub create_navigation: Option<bool>,
    pub create_scroll_top: Option<bool>,
    pub dark_mode: Option<DarkMode>,
    pub responsive: Option<bool>,
    pub lazy_load: Option<bool>,
    pub form_validation: Option<bool>,
    pub debug: Option<bool>,
    pub minify: Option<bool>,
    pub rules: Option<RuleTable>,
}

impl Options {
    /// New record with every `Some` field of `partial` applied.
    pub fn merge(&self, partial: &PartialOptions) -> Self {
        let mut next = self.clone();
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = &partial.$field {
                    next.$field = value.clone();
                })*
            };
        }
        apply!(
            auto_style,
            auto_enhance,
            auto_optimize,
            create_header,
            create_sidebar,
            create_navigation,
            create_scroll_top,
            dark_mode,
            responsive,
            lazy_load,
            form_validation,
            debug,
            minify,
            rules
        );
        next
    }

    /// Parse options from TOML. Unknown keys are ignored silently.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a file, warning about unknown keys.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (options, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        options.validate()?;
        Ok(options)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((options, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Check the rule table; warnings are printed, errors returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        for (i, rule) in self.rules.rules().iter().enumerate() {
            if rule.keywords.is_empty() {
                diag.error_with_hint(
                    FieldPath::index("rules", i, "keywords"),
                    format!("rule for `{:?}` has no keywords", rule.intent),
                    "add at least one keyword or remove the rule",
                );
            }
            for keyword in &rule.keywords {
                if keyword.trim().is_empty() {
                    diag.error(
                        FieldPath::index("rules", i, "keywords"),
                        "blank keyword never matches",
                    );
                }
            }
        }
        if self.rules.is_empty() {
            diag.warn(
                FieldPath::new("rules"),
                "empty rule table, every control is secondary",
            );
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Default options as a commented TOML template.
    pub fn template() -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            "# uac.toml - options for `uac enhance`\n\
             # darkMode: auto | light | dark | system | off\n\n{body}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ControlIntent;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.create_scroll_top);
        assert!(!options.create_header);
        assert_eq!(options.dark_mode, DarkMode::Auto);
        assert_eq!(options.rules.rules().len(), 3);
    }

    #[test]
    fn test_from_str_camel_case_and_defaults() {
        let options = Options::from_str(
            r#"
            darkMode = "system"
            createNavigation = true
            lazyLoad = false
            "#,
        )
        .unwrap();
        assert_eq!(options.dark_mode, DarkMode::System);
        assert!(options.create_navigation);
        assert!(!options.lazy_load);
        assert!(options.auto_style);
    }

    #[test]
    fn test_parse_with_ignored_reports_unknown_keys() {
        let (options, ignored) =
            Options::parse_with_ignored("autoStyle = false\nsparkles = true\n").unwrap();
        assert!(!options.auto_style);
        assert_eq!(ignored, vec!["sparkles".to_string()]);
    }

    #[test]
    fn test_custom_rules() {
        let options = Options::from_str(
            r#"
            [[rules]]
            intent = "danger"
            keywords = ["purge"]
            "#,
        )
        .unwrap();
        assert_eq!(options.rules.classify("purge cache"), Some(ControlIntent::Danger));
        assert_eq!(options.rules.classify("save"), None);
    }

    #[test]
    fn test_merge_produces_new_record() {
        let base = Options::default();
        let next = base.merge(&PartialOptions {
            dark_mode: Some(DarkMode::Dark),
            create_header: Some(true),
            ..Default::default()
        });
        assert_eq!(base.dark_mode, DarkMode::Auto);
        assert_eq!(next.dark_mode, DarkMode::Dark);
        assert!(next.create_header);
        assert_eq!(next.rules, base.rules);
    }

    #[test]
    fn test_validate_rejects_blank_keywords() {
        let options = Options {
            rules: RuleTable::new(vec![ControlRule::new(ControlIntent::Primary, &[" "])]),
            ..Default::default()
        };
        let Err(ConfigError::Diagnostics(diag)) = options.validate() else {
            panic!("expected diagnostics");
        };
        let first = diag.errors().next().unwrap();
        assert_eq!(first.field.as_str(), "rules[0].keywords");
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("uac.toml");
        fs::write(&path, "minify = false\n").unwrap();
        assert!(!Options::from_path(&path).unwrap().minify);

        let missing = Options::from_path(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_template_parses_back() {
        let template = Options::template().unwrap();
        assert_eq!(Options::from_str(&template).unwrap(), Options::default());
    }
}
