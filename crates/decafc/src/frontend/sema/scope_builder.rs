//! Symbol table construction
//!
//! Walks the tree once, opening a table for every Program, Function and
//! Block node and recording each declaration in the innermost open table.
//! Tables are attached to their node before its children are visited, so a
//! name is visible to the whole scope it is declared in.

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::{Ast, DataType, NodeId, NodeKind, Parameter};
use super::diagnostics::{DiagnosticSink, SemanticErrorCode};
use super::symbol::{StorageClass, Symbol};
use super::table::TableId;
use super::SemanticPolicy;

/// First semantic pass: builds and attaches symbol tables
pub struct ScopeBuilder {
    stack: Vec<TableId>,
    policy: SemanticPolicy,
}

impl ScopeBuilder {
    pub fn new() -> Self {
        Self::with_policy(SemanticPolicy::default())
    }

    pub fn with_policy(policy: SemanticPolicy) -> Self {
        Self {
            stack: Vec::new(),
            policy,
        }
    }

    /// Build tables for the whole tree, reporting problems to `sink`
    pub fn build(&mut self, ast: &mut Ast, sink: &mut DiagnosticSink) -> CompileResult<()> {
        let root = ast
            .root()
            .ok_or_else(|| CompileError::malformed_ast("AST has no root node"))?;
        self.stack.clear();
        self.visit(ast, root, sink)
    }

    fn visit(&mut self, ast: &mut Ast, id: NodeId, sink: &mut DiagnosticSink) -> CompileResult<()> {
        let span = ast.span(id);
        match ast.kind(id).clone() {
            NodeKind::Program { .. } | NodeKind::Block { .. } => {
                self.open_scope(ast, id);
                self.visit_children(ast, id, sink)?;
                self.close_scope();
            }
            NodeKind::Function { name, return_type, parameters, body } => {
                self.declare_function(ast, &name, return_type, &parameters, span, sink)?;
                self.open_scope(ast, id);
                for param in &parameters {
                    self.declare_parameter(ast, param, sink)?;
                }
                self.visit(ast, body, sink)?;
                self.close_scope();
            }
            NodeKind::Variable { name, ty, array_length } => {
                self.declare_variable(ast, &name, ty, array_length, span, sink)?;
            }
            NodeKind::Assignment { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::WhileLoop { .. }
            | NodeKind::Return { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::VoidFunctionCall { .. }
            | NodeKind::BinaryExpr { .. }
            | NodeKind::UnaryExpr { .. }
            | NodeKind::FunctionCall { .. }
            | NodeKind::Location { .. }
            | NodeKind::Literal(_) => {
                self.visit_children(ast, id, sink)?;
            }
        }
        Ok(())
    }

    fn visit_children(&mut self, ast: &mut Ast, id: NodeId, sink: &mut DiagnosticSink) -> CompileResult<()> {
        for child in ast.children(id) {
            self.visit(ast, child, sink)?;
        }
        Ok(())
    }

    // =========================================================================
    // Scope stack
    // =========================================================================

    fn open_scope(&mut self, ast: &mut Ast, id: NodeId) {
        let parent = self.stack.last().copied();
        let table = ast.tables_mut().new_scope(parent);
        ast.attach_table(id, table);
        self.stack.push(table);
    }

    fn close_scope(&mut self) {
        self.stack.pop();
    }

    fn current(&self, span: Span) -> CompileResult<TableId> {
        self.stack.last().copied().ok_or_else(|| {
            CompileError::malformed_ast(format!("declaration at {} is outside of any scope", span))
        })
    }

    fn at_global_scope(&self) -> bool {
        self.stack.len() == 1
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declare_variable(
        &mut self,
        ast: &mut Ast,
        name: &str,
        ty: DataType,
        array_length: u32,
        span: Span,
        sink: &mut DiagnosticSink,
    ) -> CompileResult<()> {
        let table = self.current(span)?;

        if ty == DataType::Void {
            sink.report(
                SemanticErrorCode::InvalidDeclaration,
                format!("variable '{}' cannot have type void", name),
                span,
            );
            return Ok(());
        }
        if array_length == 0 {
            sink.report(
                SemanticErrorCode::InvalidDeclaration,
                format!("array '{}' must have non-zero length", name),
                span,
            );
            return Ok(());
        }

        let storage = if self.at_global_scope() {
            StorageClass::Global
        } else {
            StorageClass::Local
        };
        if self.policy.arrays_global_only && storage == StorageClass::Local && array_length > 1 {
            sink.report(
                SemanticErrorCode::InvalidDeclaration,
                format!("array '{}' may only be declared in global scope", name),
                span,
            );
            return Ok(());
        }

        let symbol = Symbol::variable(name, ty, array_length, storage, span);
        if let Err(e) = ast.tables_mut().insert(table, symbol) {
            sink.report(SemanticErrorCode::DuplicateDeclaration, e.to_string(), span);
        }
        Ok(())
    }

    fn declare_function(
        &mut self,
        ast: &mut Ast,
        name: &str,
        return_type: DataType,
        parameters: &[Parameter],
        span: Span,
        sink: &mut DiagnosticSink,
    ) -> CompileResult<()> {
        let table = self.current(span)?;
        let parameter_types = parameters.iter().map(|p| p.ty).collect();
        let symbol = Symbol::function(name, return_type, parameter_types, span);
        if let Err(e) = ast.tables_mut().insert(table, symbol) {
            sink.report(SemanticErrorCode::DuplicateDeclaration, e.to_string(), span);
        }
        Ok(())
    }

    fn declare_parameter(
        &mut self,
        ast: &mut Ast,
        param: &Parameter,
        sink: &mut DiagnosticSink,
    ) -> CompileResult<()> {
        let table = self.current(param.span)?;
        let symbol = Symbol::parameter(&param.name, param.ty, param.span);
        if let Err(e) = ast.tables_mut().insert(table, symbol) {
            sink.report(SemanticErrorCode::DuplicateDeclaration, e.to_string(), param.span);
        }
        Ok(())
    }
}

impl Default for ScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::sema::SymbolKind;
    use pretty_assertions::assert_eq;

    fn build(source: &str) -> (Ast, DiagnosticSink) {
        build_with(source, SemanticPolicy::default())
    }

    fn build_with(source: &str, policy: SemanticPolicy) -> (Ast, DiagnosticSink) {
        let mut ast = Parser::new(source).unwrap().parse().unwrap();
        let mut sink = DiagnosticSink::new();
        ScopeBuilder::with_policy(policy).build(&mut ast, &mut sink).unwrap();
        (ast, sink)
    }

    fn find(ast: &Ast, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        ast.ids().filter(|&id| pred(ast.kind(id))).collect()
    }

    #[test]
    fn test_tables_attached_to_scope_nodes() {
        let (ast, sink) = build("int g; def int main() { int x; if (true) { int y; } return 0; }");
        assert!(sink.is_empty());

        for id in ast.ids() {
            assert_eq!(ast.table_of(id).is_some(), ast.kind(id).opens_scope(), "{:?}", ast.kind(id));
        }
        // program, function, function body, if block
        assert_eq!(ast.tables().len(), 4);
    }

    #[test]
    fn test_function_symbol_lives_in_program_scope() {
        let (ast, _) = build("def int add(int a, int b) { return a + b; }");
        let program = ast.root().unwrap();
        let func = find(&ast, |k| matches!(k, NodeKind::Function { .. }))[0];

        let root = ast.symbol_table(program).unwrap();
        let add = root.lookup_local("add").unwrap();
        assert_eq!(add.parameter_types(), &[DataType::Int, DataType::Int]);
        assert_eq!(add.return_type(), Some(DataType::Int));

        let own = ast.symbol_table(func).unwrap();
        assert!(own.lookup_local("add").is_none());
        assert_eq!(own.lookup_local("a").unwrap().kind, SymbolKind::Parameter);
        assert_eq!(own.parent().map(|p| p.id()), Some(root.id()));
    }

    #[test]
    fn test_storage_classes() {
        let (ast, _) = build("int g[4]; def int main() { int l; return 0; }");
        let g = ast.resolve(ast.root().unwrap(), "g").unwrap();
        assert_eq!(g.storage(), Some(StorageClass::Global));
        assert_eq!(g.array_length(), 4);

        let body = find(&ast, |k| matches!(k, NodeKind::Block { .. }))[0];
        let l = ast.resolve(body, "l").unwrap();
        assert_eq!(l.storage(), Some(StorageClass::Local));
    }

    #[test]
    fn test_duplicate_global() {
        let (_, sink) = build("int a; int a;");
        assert_eq!(sink.codes(), vec![SemanticErrorCode::DuplicateDeclaration]);
    }

    #[test]
    fn test_duplicate_parameter() {
        let (_, sink) = build("def void f(int a, bool a) { }");
        assert_eq!(sink.codes(), vec![SemanticErrorCode::DuplicateDeclaration]);
    }

    #[test]
    fn test_shadowing_is_not_duplicate() {
        let (_, sink) = build("int x; def void f(int x) { bool x; while (true) { int x; } }");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_declarations_are_not_inserted() {
        let (ast, sink) = build("void v; int z[0]; int ok;");
        assert_eq!(
            sink.codes(),
            vec![SemanticErrorCode::InvalidDeclaration, SemanticErrorCode::InvalidDeclaration]
        );
        let root = ast.symbol_table(ast.root().unwrap()).unwrap();
        assert!(root.lookup_local("v").is_none());
        assert!(root.lookup_local("z").is_none());
        assert!(root.lookup_local("ok").is_some());
    }

    #[test]
    fn test_declaration_order_within_scope() {
        // main is declared before foo textually but both land in one table
        let (ast, _) = build("def int main() { foo(); return 0; } def void foo() { }");
        let call = find(&ast, |k| matches!(k, NodeKind::VoidFunctionCall { .. }))[0];
        assert!(ast.resolve(call, "foo").unwrap().is_function());
    }

    #[test]
    fn test_global_arrays_only_policy() {
        let source = "int g[8]; def int main() { int l[8]; int s; return 0; }";

        let (_, sink) = build(source);
        assert!(sink.is_empty());

        let (_, sink) = build_with(source, SemanticPolicy { arrays_global_only: true });
        assert_eq!(sink.codes(), vec![SemanticErrorCode::InvalidDeclaration]);
        assert!(sink.as_slice()[0].message.contains("'l'"));
    }

    #[test]
    fn test_dump_symbols() {
        let (ast, _) = build("int g; def void f(bool b) { }");
        let dump = ast.dump_symbols();

        assert!(dump.contains("TableId(0) (program, parent: none)"));
        assert!(dump.contains("    global int g"));
        assert!(dump.contains("    def void f(bool)"));
        assert!(dump.contains("TableId(1) (function 'f', parent: TableId(0))"));
        assert!(dump.contains("    param bool b"));
    }

    #[test]
    fn test_missing_root_is_malformed() {
        let mut ast = Ast::new();
        let mut sink = DiagnosticSink::new();
        let err = ScopeBuilder::new().build(&mut ast, &mut sink).unwrap_err();
        assert!(matches!(err, CompileError::MalformedAst { .. }));
    }
}
