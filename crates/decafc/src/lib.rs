//! Decaf compiler - semantic analysis for the Decaf teaching language
//!
//! This library parses Decaf programs and checks them for semantic errors:
//! scoping, declarations, types, `main` presence and loop control.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): Lexer, parser, AST and the semantic passes
//! - **Common** (`common/`): Shared infrastructure (errors, spans, reporting)

pub mod common;
pub mod frontend;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use frontend::{analyze, check_source, Analysis, AnalysisConfig, CompileContext, DecafFrontend};
pub use frontend::sema::{DiagnosticSink, SemanticDiagnostic, SemanticErrorCode, SemanticPolicy};
