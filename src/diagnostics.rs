//! Accumulating diagnostic sink.
//!
//! The driver never writes to stderr itself. Every user-visible problem is
//! recorded here and rendered by whoever owns the engine (the `swift-driver`
//! binary, or a test asserting on messages).

use std::{cell::RefCell, fmt};
use yansi::Paint;

/// How severe a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub const fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rendered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => Paint::red(self.severity.as_str()).bold(),
            Severity::Warning => Paint::yellow(self.severity.as_str()).bold(),
            Severity::Note => Paint::new(self.severity.as_str()).bold(),
        };
        write!(f, "{label}: {}", self.message)
    }
}

/// Collects [`Diagnostic`]s emitted while resolving the configuration and
/// planning the build.
///
/// Planning is single threaded (the whole plan is produced eagerly on one
/// thread), so interior mutability via [`RefCell`] is sufficient and lets
/// read-only driver methods emit diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, severity: Severity, message: impl Into<String>) {
        let diag = Diagnostic { severity, message: message.into() };
        trace!(severity = %diag.severity, "{}", diag.message);
        self.diagnostics.borrow_mut().push(diag);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    pub fn note(&self, message: impl Into<String>) {
        self.emit(Severity::Note, message);
    }

    /// Whether any error-severity diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.severity.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_tracks_errors() {
        let engine = DiagnosticEngine::new();
        assert!(!engine.has_errors());

        engine.warning("first");
        engine.error("second");

        let diags = engine.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[1].message, "second");
        assert!(engine.has_errors());
    }
}
