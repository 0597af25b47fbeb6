//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;
use crate::frontend::sema::SemanticDiagnostic;

/// Errors that stop the pipeline.
///
/// Semantic problems in a well-formed program are not errors; they are
/// collected as [`SemanticDiagnostic`]s and the passes keep going.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("Malformed AST: {message}")]
    MalformedAst { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn malformed_ast(message: impl Into<String>) -> Self {
        Self::MalformedAst {
            message: message.into(),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = Self::error_diagnostic(file_id, error);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    pub fn report_semantic(&self, file_id: usize, diag: &SemanticDiagnostic) {
        let diagnostic = Self::semantic_diagnostic(file_id, diag);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    /// Render a semantic diagnostic without colors, as it would appear on stderr
    pub fn render_semantic(&self, file_id: usize, diag: &SemanticDiagnostic) -> String {
        let mut buffer = Buffer::no_color();
        self.emit(&mut buffer, &Self::semantic_diagnostic(file_id, diag));
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }

    fn emit(&self, writer: &mut dyn WriteColor, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit(writer, &self.config, &self.files, diagnostic);
    }

    fn error_diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexer { message, span } => Diagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::Parser { message, span } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::MalformedAst { message } => {
                Diagnostic::bug().with_message(format!("malformed AST: {}", message))
            }

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {}", err))
            }
        }
    }

    fn semantic_diagnostic(file_id: usize, diag: &SemanticDiagnostic) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(diag.code.description())
            .with_code(diag.code.as_str())
            .with_labels(vec![
                Label::primary(file_id, diag.span.range()).with_message(&diag.message)
            ])
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
