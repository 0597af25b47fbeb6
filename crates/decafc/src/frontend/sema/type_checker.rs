//! Type checking
//!
//! Runs after scope building. The walk is strictly post-order: every
//! expression's type is inferred once, after its operands, and cached so the
//! statement checks above it reuse the same result.

use std::collections::HashMap;
use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::{Ast, BinaryOp, DataType, NodeId, NodeKind, UnaryOp};
use super::diagnostics::{DiagnosticSink, SemanticErrorCode};
use super::table::TableId;
use super::types::Type;

/// Second semantic pass: infers expression types and validates constructs
pub struct TypeChecker {
    types: HashMap<NodeId, Type>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Check the whole tree, reporting problems to `sink`
    pub fn check(&mut self, ast: &Ast, sink: &mut DiagnosticSink) -> CompileResult<()> {
        let root = ast
            .root()
            .ok_or_else(|| CompileError::malformed_ast("AST has no root node"))?;
        self.types.clear();
        self.visit(ast, root, sink)
    }

    /// Type inferred for an expression node during the last check
    pub fn type_of(&self, id: NodeId) -> Option<Type> {
        self.types.get(&id).copied()
    }

    fn expr_type(&self, id: NodeId) -> Type {
        self.type_of(id).unwrap_or(Type::Error)
    }

    fn visit(&mut self, ast: &Ast, id: NodeId, sink: &mut DiagnosticSink) -> CompileResult<()> {
        for child in ast.children(id) {
            self.visit(ast, child, sink)?;
        }

        let span = ast.span(id);
        match ast.kind(id) {
            NodeKind::Program { functions, .. } => {
                self.check_program(ast, functions, span, sink);
            }
            NodeKind::Function { name, return_type, body, .. } => {
                self.check_function(ast, id, name, *return_type, *body, sink)?;
            }
            NodeKind::Block { .. } | NodeKind::Variable { .. } | NodeKind::Return { .. } => {
                // returns are checked against their function
            }
            NodeKind::Assignment { location, value } => {
                let target = self.expr_type(*location);
                let value = self.expr_type(*value);
                if !target.same_as(value) {
                    sink.report(
                        SemanticErrorCode::TypeMismatch,
                        format!("cannot assign a value of type {} to a location of type {}", value, target),
                        span,
                    );
                }
            }
            NodeKind::Conditional { condition, .. } => {
                self.expect_bool(ast, *condition, "if condition", sink);
            }
            NodeKind::WhileLoop { guard, .. } => {
                self.expect_bool(ast, *guard, "while guard", sink);
            }
            NodeKind::Break => self.check_loop_control(ast, id, "break", sink),
            NodeKind::Continue => self.check_loop_control(ast, id, "continue", sink),
            NodeKind::VoidFunctionCall { name, arguments } => {
                self.check_call(ast, id, name, arguments, sink)?;
            }
            NodeKind::BinaryExpr { op, left, right } => {
                let ty = self.binary_type(*op, self.expr_type(*left), self.expr_type(*right), span, sink);
                self.types.insert(id, ty);
            }
            NodeKind::UnaryExpr { op, operand } => {
                let ty = self.unary_type(*op, self.expr_type(*operand), span, sink);
                self.types.insert(id, ty);
            }
            NodeKind::FunctionCall { name, arguments } => {
                let ty = self.check_call(ast, id, name, arguments, sink)?;
                self.types.insert(id, ty);
            }
            NodeKind::Location { name, index } => {
                let ty = self.location_type(ast, id, name, *index, sink)?;
                self.types.insert(id, ty);
            }
            NodeKind::Literal(lit) => {
                self.types.insert(id, lit.data_type().into());
            }
        }
        Ok(())
    }

    fn scope_of(&self, ast: &Ast, id: NodeId) -> CompileResult<TableId> {
        ast.nearest_table(id).ok_or_else(|| {
            CompileError::malformed_ast(format!(
                "no symbol table reachable from {} at {}",
                ast.kind(id).name(),
                ast.span(id)
            ))
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn location_type(
        &mut self,
        ast: &Ast,
        id: NodeId,
        name: &str,
        index: Option<NodeId>,
        sink: &mut DiagnosticSink,
    ) -> CompileResult<Type> {
        let span = ast.span(id);
        let table = self.scope_of(ast, id)?;
        let symbol = match ast.tables().lookup(table, name) {
            Ok(symbol) => symbol,
            Err(e) => {
                sink.report(SemanticErrorCode::UnresolvedSymbol, e.to_string(), span);
                return Ok(Type::Error);
            }
        };

        if let Some(index) = index {
            let index_ty = self.expr_type(index);
            if !index_ty.is(DataType::Int) {
                sink.report(
                    SemanticErrorCode::TypeMismatch,
                    format!("array index must be int, found {}", index_ty),
                    ast.span(index),
                );
            } else if symbol.array_length() == 0 {
                sink.report(
                    SemanticErrorCode::TypeMismatch,
                    format!("'{}' cannot be indexed", name),
                    span,
                );
            }
        }

        Ok(symbol.ty.into())
    }

    fn unary_type(&self, op: UnaryOp, operand: Type, span: Span, sink: &mut DiagnosticSink) -> Type {
        let (required, verb) = match op {
            UnaryOp::Neg => (DataType::Int, "negate"),
            UnaryOp::Not => (DataType::Bool, "apply '!' to"),
        };
        if !operand.is(required) {
            sink.report(
                SemanticErrorCode::TypeMismatch,
                format!("cannot {} a value of type {}", verb, operand),
                span,
            );
        }
        operand
    }

    fn binary_type(
        &self,
        op: BinaryOp,
        left: Type,
        right: Type,
        span: Span,
        sink: &mut DiagnosticSink,
    ) -> Type {
        if !left.same_as(right) {
            sink.report(
                SemanticErrorCode::TypeMismatch,
                format!("operands of '{}' must have the same type, found {} and {}", op, left, right),
                span,
            );
            return Type::Error;
        }

        let int_operands = |result: Type, sink: &mut DiagnosticSink| {
            if left.is(DataType::Int) {
                result
            } else {
                sink.report(
                    SemanticErrorCode::TypeMismatch,
                    format!("operator '{}' requires int operands, found {}", op, left),
                    span,
                );
                Type::Error
            }
        };

        match op {
            BinaryOp::And | BinaryOp::Or => Type::Bool,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                int_operands(Type::Int, sink)
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                int_operands(Type::Bool, sink)
            }
            BinaryOp::Eq | BinaryOp::Ne => Type::Bool,
        }
    }

    /// Shared by value and statement calls; returns the call's result type
    fn check_call(
        &mut self,
        ast: &Ast,
        id: NodeId,
        name: &str,
        arguments: &[NodeId],
        sink: &mut DiagnosticSink,
    ) -> CompileResult<Type> {
        let span = ast.span(id);
        let program_scope = ast.tables().root_of(self.scope_of(ast, id)?);
        let callee = match ast.tables().get(program_scope).lookup_local(name) {
            Some(symbol) if symbol.is_function() => symbol,
            Some(_) => {
                sink.report(
                    SemanticErrorCode::UnresolvedSymbol,
                    format!("'{}' is not a function", name),
                    span,
                );
                return Ok(Type::Error);
            }
            None => {
                sink.report(
                    SemanticErrorCode::UnresolvedSymbol,
                    format!("call to undeclared function '{}'", name),
                    span,
                );
                return Ok(Type::Error);
            }
        };

        let params = callee.parameter_types();
        if params.len() != arguments.len() {
            sink.report(
                SemanticErrorCode::TypeMismatch,
                format!(
                    "function '{}' takes {} argument(s) but {} were supplied",
                    name,
                    params.len(),
                    arguments.len()
                ),
                span,
            );
        }
        for (position, (&arg, &param)) in arguments.iter().zip(params).enumerate() {
            let arg_ty = self.expr_type(arg);
            if !arg_ty.is(param) {
                sink.report(
                    SemanticErrorCode::TypeMismatch,
                    format!(
                        "argument {} of '{}' must be {}, found {}",
                        position + 1,
                        name,
                        param,
                        arg_ty
                    ),
                    ast.span(arg),
                );
            }
        }

        Ok(callee.ty.into())
    }

    // =========================================================================
    // Statements and declarations
    // =========================================================================

    fn expect_bool(&self, ast: &Ast, expr: NodeId, what: &str, sink: &mut DiagnosticSink) {
        let ty = self.expr_type(expr);
        if !ty.is(DataType::Bool) {
            sink.report(
                SemanticErrorCode::TypeMismatch,
                format!("{} must be bool, found {}", what, ty),
                ast.span(expr),
            );
        }
    }

    /// Only valid as a direct statement of a while-loop body
    fn check_loop_control(&self, ast: &Ast, id: NodeId, keyword: &str, sink: &mut DiagnosticSink) {
        let in_loop_body = ast
            .parent(id)
            .filter(|&block| matches!(ast.kind(block), NodeKind::Block { .. }))
            .and_then(|block| ast.parent(block))
            .is_some_and(|outer| matches!(ast.kind(outer), NodeKind::WhileLoop { .. }));

        if !in_loop_body {
            sink.report(
                SemanticErrorCode::InvalidLoopControl,
                format!("'{}' must appear directly inside a while loop body", keyword),
                ast.span(id),
            );
        }
    }

    fn check_program(&self, ast: &Ast, functions: &[NodeId], span: Span, sink: &mut DiagnosticSink) {
        let mut has_main = false;
        for &func in functions {
            let NodeKind::Function { name, return_type, parameters, .. } = ast.kind(func) else {
                continue;
            };
            if name != "main" {
                continue;
            }
            has_main = true;
            if *return_type != DataType::Int {
                sink.report(
                    SemanticErrorCode::MalformedMain,
                    format!("'main' must return int, found {}", return_type),
                    ast.span(func),
                );
            }
            if !parameters.is_empty() {
                sink.report(
                    SemanticErrorCode::MalformedMain,
                    "'main' must not take parameters",
                    ast.span(func),
                );
            }
        }

        if !has_main {
            sink.report(
                SemanticErrorCode::MissingMain,
                "program must define a 'main' function",
                span,
            );
        }
    }

    fn check_function(
        &self,
        ast: &Ast,
        id: NodeId,
        name: &str,
        return_type: DataType,
        body: NodeId,
        sink: &mut DiagnosticSink,
    ) -> CompileResult<()> {
        let span = ast.span(id);

        // The function's own table holds its parameters; its symbol lives one level up
        let enclosing = ast
            .symbol_table(id)
            .and_then(|own| own.parent())
            .ok_or_else(|| {
                CompileError::malformed_ast(format!("function '{}' has no enclosing scope", name))
            })?;
        if !enclosing.lookup(name).is_ok_and(|symbol| symbol.is_function()) {
            sink.report(
                SemanticErrorCode::DuplicateDeclaration,
                format!("function '{}' conflicts with another declaration of the same name", name),
                span,
            );
        }

        let NodeKind::Block { statements, .. } = ast.kind(body) else {
            return Err(CompileError::malformed_ast(format!(
                "body of function '{}' is not a block",
                name
            )));
        };

        let mut returns = 0;
        for &stmt in statements {
            let NodeKind::Return { value } = ast.kind(stmt) else {
                continue;
            };
            let stmt_span = ast.span(stmt);
            returns += 1;
            if returns > 1 {
                sink.report(
                    SemanticErrorCode::MultipleReturns,
                    format!("function '{}' has more than one top-level return statement", name),
                    stmt_span,
                );
            }

            match (return_type, *value) {
                (DataType::Void, Some(_)) => {
                    sink.report(
                        SemanticErrorCode::InvalidReturnUsage,
                        format!("void function '{}' cannot return a value", name),
                        stmt_span,
                    );
                }
                (DataType::Void, None) => {}
                (expected, value) => {
                    let found = match value {
                        Some(v) => self.expr_type(v),
                        None => Type::Void,
                    };
                    if !found.is(expected) {
                        sink.report(
                            SemanticErrorCode::TypeMismatch,
                            format!("function '{}' must return {}, found {}", name, expected, found),
                            stmt_span,
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
