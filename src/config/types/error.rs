//! Errors raised while loading or checking options.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid options file")]
    Toml(#[from] toml::de::Error),

    #[error("cannot render options as TOML")]
    Serialize(#[from] toml::ser::Error),

    // Not #[from]: the diagnostics print themselves, a source() would repeat them
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Printed, options still accepted.
    Warning,
    /// Options rejected.
    Error,
}

/// One finding against a field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {hint}", "hint:".yellow())?;
        }
        Ok(())
    }
}

/// Findings collected by [`Options::validate`](crate::Options::validate).
#[derive(Debug, Default)]
pub struct ConfigDiagnostics(Vec<ConfigDiagnostic>);

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: FieldPath, message: String, hint: Option<String>) {
        self.0.push(ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    /// Findings that reject the options.
    pub fn errors(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn print_warnings(&self) {
        for warning in self.0.iter().filter(|d| d.severity == Severity::Warning) {
            crate::log!("warning"; "[{}] {}", warning.field.as_str(), warning.message);
        }
    }

    /// `Err` with only the errors kept when any were recorded.
    pub fn into_result(self) -> Result<(), Self> {
        let errors: Vec<_> = self
            .0
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "invalid options:".red().bold())?;
        for diagnostic in self.errors() {
            write!(f, "\n{} {diagnostic}", "→".red())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_the_file() {
        let err = ConfigError::Io(
            PathBuf::from("uac.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(err.to_string(), "cannot read `uac.toml`");
    }

    #[test]
    fn test_warnings_do_not_reject() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("rules"), "only a warning");
        assert!(diag.into_result().is_ok());

        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("rules"), "only a warning");
        diag.error_with_hint(FieldPath::index("rules", 1, "keywords"), "empty", "add one");
        let err = diag.into_result().unwrap_err();
        let errors: Vec<_> = err.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_str(), "rules[1].keywords");
        assert_eq!(errors[0].hint.as_deref(), Some("add one"));
    }
}
