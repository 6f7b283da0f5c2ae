//! Diagnostic types for lint results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use restyle_tree::{Location, Span};

/// Severity level for diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
}

/// A diagnostic message reported by a plugin in lint mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The plugin that reported this diagnostic.
    ///
    /// Plugins may leave this empty; the pipeline fills in the plugin name.
    pub rule: String,

    /// The diagnostic message.
    pub message: String,

    /// Byte span in the source.
    pub span: Span,

    /// Line/column location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,

    /// Severity level.
    #[serde(default)]
    pub severity: Severity,

    /// File the diagnostic belongs to. Unset when linting a bare string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            rule: String::new(),
            message: message.into(),
            span,
            loc: None,
            severity: Severity::Error,
            filename: None,
        }
    }

    /// Sets the rule name.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, loc: Location) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Sets the filename.
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Fills `loc` from the span if the plugin did not set it.
    pub(crate) fn resolve_location(&mut self, source: &str) {
        if self.loc.is_none() {
            self.loc = Some(Location::from_span(source, self.span));
        }
    }

    /// Returns the filename, if any.
    pub fn file(&self) -> Option<&Path> {
        self.filename.as_deref()
    }
}
