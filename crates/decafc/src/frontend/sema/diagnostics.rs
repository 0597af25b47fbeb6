//! Semantic diagnostics and the sink that collects them

use std::fmt;
use crate::common::Span;

/// Category of a semantic diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticErrorCode {
    DuplicateDeclaration,
    /// `void` variable or zero-length array
    InvalidDeclaration,
    UnresolvedSymbol,
    TypeMismatch,
    MissingMain,
    MalformedMain,
    MultipleReturns,
    InvalidReturnUsage,
    /// `break`/`continue` outside a while-loop body
    InvalidLoopControl,
}

impl SemanticErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticErrorCode::DuplicateDeclaration => "E0001",
            SemanticErrorCode::InvalidDeclaration => "E0002",
            SemanticErrorCode::UnresolvedSymbol => "E0003",
            SemanticErrorCode::TypeMismatch => "E0004",
            SemanticErrorCode::MissingMain => "E0005",
            SemanticErrorCode::MalformedMain => "E0006",
            SemanticErrorCode::MultipleReturns => "E0007",
            SemanticErrorCode::InvalidReturnUsage => "E0008",
            SemanticErrorCode::InvalidLoopControl => "E0009",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SemanticErrorCode::DuplicateDeclaration => "duplicate declaration",
            SemanticErrorCode::InvalidDeclaration => "invalid declaration",
            SemanticErrorCode::UnresolvedSymbol => "unresolved symbol",
            SemanticErrorCode::TypeMismatch => "type mismatch",
            SemanticErrorCode::MissingMain => "missing main function",
            SemanticErrorCode::MalformedMain => "malformed main function",
            SemanticErrorCode::MultipleReturns => "multiple return statements",
            SemanticErrorCode::InvalidReturnUsage => "invalid return",
            SemanticErrorCode::InvalidLoopControl => "loop control outside of loop",
        }
    }
}

impl fmt::Display for SemanticErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One semantic problem, tied to the offending node's span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticDiagnostic {
    pub code: SemanticErrorCode,
    pub message: String,
    pub span: Span,
}

impl SemanticDiagnostic {
    pub fn new(code: SemanticErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for SemanticDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] at {}: {}", self.code, self.code.as_str(), self.span, self.message)
    }
}

/// Ordered diagnostics of one analysis run
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<SemanticDiagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, code: SemanticErrorCode, message: impl Into<String>, span: Span) {
        self.diagnostics.push(SemanticDiagnostic::new(code, message, span));
    }

    /// Forget everything collected so far, before starting a new run
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[SemanticDiagnostic] {
        &self.diagnostics
    }

    pub fn count(&self, code: SemanticErrorCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }

    pub fn has(&self, code: SemanticErrorCode) -> bool {
        self.count(code) > 0
    }

    pub fn codes(&self) -> Vec<SemanticErrorCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn into_vec(self) -> Vec<SemanticDiagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticSink {
    type Item = &'a SemanticDiagnostic;
    type IntoIter = std::slice::Iter<'a, SemanticDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
