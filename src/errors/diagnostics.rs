use std::{cell::RefCell, fmt::Display};

use tracing::trace;

use crate::Span;

use super::errors::DiagnosticKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl Diagnostic {
    /// Builds a diagnostic whose severity follows from its kind.
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        let severity = if kind.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };

        Diagnostic {
            severity,
            kind,
            span,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `<file>:<line>:<col>: <severity>: <message>`
    pub fn format_with_file(&self, file: &str) -> String {
        format!("{}:{}", file, self)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.span.line,
            self.span.column,
            self.severity,
            self.kind
        )
    }
}

/// Ordered sink for the diagnostics of one compilation unit.
///
/// Shared by `&` between stages; entries are only ever appended.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn record(&self, diagnostic: Diagnostic) {
        trace!(
            kind = diagnostic.kind.get_error_name(),
            line = diagnostic.span.line,
            column = diagnostic.span.column,
            "recorded diagnostic"
        );
        self.entries.borrow_mut().push(diagnostic);
    }

    /// Records `kind` at `span` with the severity implied by the kind.
    pub fn report(&self, kind: DiagnosticKind, span: Span) {
        self.record(Diagnostic::new(kind, span));
    }

    /// All diagnostics in emission order.
    pub fn all(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// All diagnostics ordered by source position; ties keep emission order.
    pub fn sorted_by_position(&self) -> Vec<Diagnostic> {
        let mut sorted = self.all();
        sorted.sort_by_key(|diagnostic| diagnostic.span.start);
        sorted
    }

    pub fn has_errors(&self) -> bool {
        self.entries.borrow().iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.entries.borrow().iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.borrow().iter().filter(|d| !d.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries.into_inner()
    }
}
