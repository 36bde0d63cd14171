//! Diagnostics reported back to the host.
//!
//! Mapping code never fails with a panic or a bare string: it collects
//! [`Diagnostic`]s so that every problem in a configuration is reported at once.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The request did not complete.
    Error,
    Warning,
}

/// One message for the host, optionally pinned to an attribute path such
/// as `settings.mysql_source.connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, summary: String) -> Self {
        Self {
            severity,
            summary,
            detail: None,
            attribute: None,
        }
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, summary.into())
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, summary.into())
    }

    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    pub fn with_attribute(self, attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..self
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)?;
        match (&self.detail, &self.attribute) {
            (Some(detail), Some(path)) => write!(f, ": {} (at {})", detail, path),
            (Some(detail), None) => write!(f, ": {}", detail),
            (None, Some(path)) => write!(f, " (at {})", path),
            (None, None) => Ok(()),
        }
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error with summary and detail.
    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic::error(summary).with_detail(detail));
    }

    /// Add a warning with summary and detail.
    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic::warning(summary).with_detail(detail));
    }

    /// Add a single diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Move all diagnostics of `other` into this collection.
    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Whether any diagnostic is an error.
    pub fn has_error(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Number of diagnostics collected.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Return `value` unless an error was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.has_error() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl From<Diagnostics> for Vec<Diagnostic> {
    fn from(diagnostics: Diagnostics) -> Self {
        diagnostics.0
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail_and_path() {
        let err = Diagnostic::error("unknown connection")
            .with_detail("required on_premise block")
            .with_attribute("settings.mysql_target.connection");
        assert!(err.is_error());
        assert_eq!(
            err.to_string(),
            "unknown connection: required on_premise block (at settings.mysql_target.connection)"
        );

        let bare = Diagnostic::warning("provider already configured").with_attribute("endpoint");
        assert!(!bare.is_error());
        assert_eq!(bare.to_string(), "provider already configured (at endpoint)");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut diags = Diagnostics::new();
        diags.warning("deprecated", "use settings instead");
        assert!(!diags.has_error());
        assert!(diags.clone().into_result(1).is_ok());

        diags.error("unknown connection", "required on_premise block");
        assert!(diags.has_error());
        assert_eq!(diags.len(), 2);
        assert!(diags.into_result(1).is_err());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut first = Diagnostics::new();
        first.error("a", "");
        let mut second = Diagnostics::new();
        second.error("b", "");
        first.append(second);

        let summaries: Vec<_> = first.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["a", "b"]);
    }
}
