//! Diagnostic reporting (spec.md §6.2, §7).
//!
//! Each compiler phase owns a [`Handler`] that accumulates [`Diagnostic`]s
//! and prints them immediately in the fixed wire format
//! `<filename:lLINE:cCOLUMN> <phase>: <message>`, with the location prefix
//! dropped for file-less/global messages. The driver checks
//! [`Handler::has_errors`] after each phase and stops the pipeline if it is
//! set (spec.md §5, §7).

use std::fmt;

use crate::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// Which phase raised a diagnostic; used for the `<phase>:` label
/// (spec.md §6.2: "Scanning error", "Parsing error", "Semantic analysis
/// error", "Code Generation").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Parsing,
    Semantic,
    CodeGen,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Scanning => "Scanning error",
            Phase::Parsing => "Parsing error",
            Phase::Semantic => "Semantic analysis error",
            Phase::CodeGen => "Code Generation",
        };
        write!(f, "{label}")
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub phase: Phase,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(phase: Phase, message: impl Into<String>, span: Span) -> Self {
        Self { level: Level::Error, phase, message: message.into(), span: Some(span) }
    }

    /// A diagnostic with no source location (spec.md §6.2's "global
    /// messages"), e.g. "missing main function".
    pub fn global_error(phase: Phase, message: impl Into<String>) -> Self {
        Self { level: Level::Error, phase, message: message.into(), span: None }
    }
}

/// Accumulates diagnostics for one phase of one file and renders them to
/// stderr as they are reported. Tracks a sticky error flag so later phases
/// (or the driver) can bail without inspecting every diagnostic.
pub struct Handler {
    filename: String,
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl Handler {
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), diagnostics: Vec::new(), has_errors: false }
    }

    pub fn report(&mut self, diag: Diagnostic) {
        self.print(&diag);
        if diag.level == Level::Error {
            self.has_errors = true;
        }
        self.diagnostics.push(diag);
    }

    fn print(&self, diag: &Diagnostic) {
        match diag.span {
            Some(span) => eprintln!(
                "<{}:l{}:c{}> {}: {}",
                self.filename, span.line, span.column, diag.phase, diag.message
            ),
            None => eprintln!("<{}> {}: {}", self.filename, diag.phase, diag.message),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporting_an_error_sets_sticky_flag() {
        let mut handler = Handler::new("test.stoc");
        assert!(!handler.has_errors());
        handler.report(Diagnostic::error(Phase::Scanning, "bad byte", Span::new(0, 1, 1, 1)));
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics().len(), 1);
    }

    #[test]
    fn global_error_has_no_span() {
        let diag = Diagnostic::global_error(Phase::Semantic, "missing main function");
        assert!(diag.span.is_none());
    }
}
