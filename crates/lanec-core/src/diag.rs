//! The diagnostics sink.
//!
//! All semantic passes report through a [`Diagnostics`] collector rather than
//! printing directly. The sink retains messages in emission order so a driver
//! (or a test) can render or inspect them afterwards, and tracks error and
//! warning counts separately.
//!
//! The sink uses interior mutability so it can be threaded through the
//! read-only semantic context; the front end is single-threaded by contract,
//! and the sink is `!Sync` by construction.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::error::CompileError;
use crate::span::Span;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The construct is invalid; compilation of it is abandoned.
    Error,
    /// Suspicious but accepted.
    Warning,
    /// Accepted, but likely to compile to slow code.
    PerformanceWarning,
    /// An internal invariant was violated. Not expected on well-formed input.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::PerformanceWarning => write!(f, "performance warning"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single reported message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_known() {
            write!(f, "{}: {}: {}", self.span, self.severity, self.message)
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}

/// Collects diagnostics emitted during a compilation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
    errors: Cell<u32>,
    warnings: Cell<u32>,
    fatal: Cell<bool>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error at `span`.
    pub fn error(&self, span: Span, message: impl Into<String>) {
        self.errors.set(self.errors.get() + 1);
        self.push(Severity::Error, span, message.into());
    }

    /// Report a structured error.
    pub fn report(&self, err: &CompileError) {
        self.error(err.span(), err.to_string());
    }

    /// Report a warning at `span`. Warnings never fail a pass.
    pub fn warning(&self, span: Span, message: impl Into<String>) {
        self.warnings.set(self.warnings.get() + 1);
        self.push(Severity::Warning, span, message.into());
    }

    /// Report a performance warning at `span`.
    pub fn performance_warning(&self, span: Span, message: impl Into<String>) {
        self.warnings.set(self.warnings.get() + 1);
        self.push(Severity::PerformanceWarning, span, message.into());
    }

    /// Report a violated internal invariant.
    pub fn fatal(&self, message: impl Into<String>) {
        self.fatal.set(true);
        self.push(Severity::Fatal, Span::default(), message.into());
    }

    fn push(&self, severity: Severity, span: Span, message: String) {
        self.entries.borrow_mut().push(Diagnostic {
            severity,
            span,
            message,
        });
    }

    /// Number of errors reported so far.
    pub fn error_count(&self) -> u32 {
        self.errors.get()
    }

    /// Number of warnings (including performance warnings) reported so far.
    pub fn warning_count(&self) -> u32 {
        self.warnings.get()
    }

    /// Whether any error (or fatal) has been reported.
    pub fn has_errors(&self) -> bool {
        self.errors.get() > 0 || self.fatal.get()
    }

    /// Whether a fatal internal error has been reported.
    pub fn is_fatal(&self) -> bool {
        self.fatal.get()
    }

    /// Snapshot of all messages in emission order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Drain all messages, resetting the sink.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.errors.set(0);
        self.warnings.set(0);
        self.fatal.set(false);
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let diags = Diagnostics::new();
        diags.error(Span::new(1, 1), "bad");
        diags.warning(Span::new(2, 1), "iffy");
        diags.performance_warning(Span::new(3, 1), "slow");

        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 2);
        assert!(diags.has_errors());
        assert!(!diags.is_fatal());
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let diags = Diagnostics::new();
        diags.warning(Span::new(1, 1), "iffy");
        assert!(!diags.has_errors());
    }

    #[test]
    fn fatal_marks_sink() {
        let diags = Diagnostics::new();
        diags.fatal("logic error");
        assert!(diags.has_errors());
        assert!(diags.is_fatal());
    }

    #[test]
    fn entries_keep_emission_order() {
        let diags = Diagnostics::new();
        diags.error(Span::new(1, 1), "first");
        diags.warning(Span::new(1, 2), "second");
        let entries = diags.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
    }

    #[test]
    fn take_resets_counts() {
        let diags = Diagnostics::new();
        diags.error(Span::new(1, 1), "bad");
        let drained = diags.take();
        assert_eq!(drained.len(), 1);
        assert_eq!(diags.error_count(), 0);
        assert!(diags.entries().is_empty());
    }

    #[test]
    fn display_includes_span_when_known() {
        let diags = Diagnostics::new();
        diags.error(Span::new(4, 9), "bad thing");
        let rendered = format!("{}", diags.entries()[0]);
        assert_eq!(rendered, "4:9: error: bad thing");
    }
}
