//! Semantic analysis module
//!
//! Two passes run over a parsed [`Ast`](crate::frontend::ast::Ast):
//! [`ScopeBuilder`] attaches a symbol table to every scope-opening node, then
//! [`TypeChecker`] infers expression types and validates every construct.
//! Both record problems in a [`DiagnosticSink`] and always visit the whole tree.

mod diagnostics;
mod scope_builder;
mod symbol;
mod table;
mod type_checker;
mod types;

pub use diagnostics::{DiagnosticSink, SemanticDiagnostic, SemanticErrorCode};
pub use scope_builder::ScopeBuilder;
pub use symbol::{StorageClass, Symbol, SymbolKind};
pub use table::{ScopeError, SymbolTable, SymbolTables, TableId, TableRef};
pub use type_checker::TypeChecker;
pub use types::Type;

/// Optional language rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SemanticPolicy {
    /// Reject arrays declared inside functions
    pub arrays_global_only: bool,
}
