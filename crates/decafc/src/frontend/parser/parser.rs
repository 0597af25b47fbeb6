//! Recursive descent parser for Decaf

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for Decaf
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Span of the most recently consumed token
    previous: Span,
    ast: Ast,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous: Span::default(),
            ast: Ast::new(),
        })
    }

    /// Parse a complete program and wire up parent links
    pub fn parse(&mut self) -> CompileResult<Ast> {
        let start_span = self.current.span;
        let mut variables = Vec::new();
        let mut functions = Vec::new();

        while !self.at_end() {
            if self.check(&TokenKind::Def) {
                functions.push(self.parse_function()?);
            } else if self.current.kind.is_type() {
                variables.push(self.parse_variable()?);
            } else {
                return Err(CompileError::parser(
                    format!("expected declaration, found {}", self.current.kind),
                    self.current.span,
                ));
            }
        }

        let span = start_span.merge(self.previous);
        let program = self.ast.add(NodeKind::Program { variables, functions }, span);
        self.ast.set_root(program);
        self.ast.link_parents();
        Ok(std::mem::take(&mut self.ast))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        self.previous = prev.span;
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(CompileError::parser(
                format!("expected {}, found {}", kind, self.current.kind),
                self.current.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(CompileError::parser(
                format!("expected identifier, found {}", other),
                token.span,
            )),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_type(&mut self) -> CompileResult<DataType> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Int => Ok(DataType::Int),
            TokenKind::Bool => Ok(DataType::Bool),
            TokenKind::Void => Ok(DataType::Void),
            other => Err(CompileError::parser(
                format!("expected type, found {}", other),
                token.span,
            )),
        }
    }

    /// type name ['[' length ']'] ';'
    fn parse_variable(&mut self) -> CompileResult<NodeId> {
        let start_span = self.current.span;
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;

        let mut array_length = 1;
        if self.match_token(&TokenKind::LBracket)? {
            let token = self.advance()?;
            let value = match &token.kind {
                TokenKind::IntLiteral(s) | TokenKind::HexLiteral(s) => {
                    self.parse_int_literal(s, token.span)?
                }
                other => {
                    return Err(CompileError::parser(
                        format!("expected array length, found {}", other),
                        token.span,
                    ));
                }
            };
            array_length = u32::try_from(value).map_err(|_| {
                CompileError::parser(format!("array length {} is too large", value), token.span)
            })?;
            self.expect(TokenKind::RBracket)?;
        }
        self.expect(TokenKind::Semi)?;

        let span = start_span.merge(self.previous);
        Ok(self.ast.add(NodeKind::Variable { name, ty, array_length }, span))
    }

    /// def type name '(' params ')' block
    fn parse_function(&mut self) -> CompileResult<NodeId> {
        let start_span = self.current.span;
        self.expect(TokenKind::Def)?;
        let return_type = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_start = self.current.span;
                let ty = self.parse_type()?;
                let (param_name, name_span) = self.expect_identifier()?;
                parameters.push(Parameter::new(param_name, ty, param_start.merge(name_span)));
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start_span.merge(self.previous);
        Ok(self.ast.add(
            NodeKind::Function { name, return_type, parameters, body },
            span,
        ))
    }

    /// '{' variable* statement* '}'
    fn parse_block(&mut self) -> CompileResult<NodeId> {
        let start_span = self.current.span;
        self.expect(TokenKind::LBrace)?;

        let mut variables = Vec::new();
        while self.current.kind.is_type() {
            variables.push(self.parse_variable()?);
        }

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;

        let span = start_span.merge(self.previous);
        Ok(self.ast.add(NodeKind::Block { variables, statements }, span))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<NodeId> {
        let start_span = self.current.span;

        let kind = match &self.current.kind {
            TokenKind::Identifier(_) => return self.parse_assignment_or_call(),
            TokenKind::If => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let then_block = self.parse_block()?;
                let else_block = if self.match_token(&TokenKind::Else)? {
                    Some(self.parse_block()?)
                } else {
                    None
                };
                NodeKind::Conditional { condition, then_block, else_block }
            }
            TokenKind::While => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let guard = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_block()?;
                NodeKind::WhileLoop { guard, body }
            }
            TokenKind::Return => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semi)?;
                NodeKind::Return { value }
            }
            TokenKind::Break => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                NodeKind::Break
            }
            TokenKind::Continue => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                NodeKind::Continue
            }
            other => {
                return Err(CompileError::parser(
                    format!("expected statement, found {}", other),
                    start_span,
                ));
            }
        };

        let span = start_span.merge(self.previous);
        Ok(self.ast.add(kind, span))
    }

    /// name '(' args ')' ';'  |  location '=' expr ';'
    fn parse_assignment_or_call(&mut self) -> CompileResult<NodeId> {
        let (name, name_span) = self.expect_identifier()?;

        if self.check(&TokenKind::LParen) {
            let arguments = self.parse_arguments()?;
            self.expect(TokenKind::Semi)?;
            let span = name_span.merge(self.previous);
            return Ok(self.ast.add(NodeKind::VoidFunctionCall { name, arguments }, span));
        }

        let location = self.parse_location_rest(name, name_span)?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        let span = name_span.merge(self.previous);
        Ok(self.ast.add(NodeKind::Assignment { location, value }, span))
    }

    /// Optional '[' expr ']' after an already consumed name
    fn parse_location_rest(&mut self, name: String, name_span: Span) -> CompileResult<NodeId> {
        let index = if self.match_token(&TokenKind::LBracket)? {
            let index = self.parse_expression()?;
            self.expect(TokenKind::RBracket)?;
            Some(index)
        } else {
            None
        };
        let span = name_span.merge(self.previous);
        Ok(self.ast.add(NodeKind::Location { name, index }, span))
    }

    fn parse_arguments(&mut self) -> CompileResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(arguments)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<NodeId> {
        self.parse_logical_or_expression()
    }

    fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let span = self.ast.span(left).merge(self.ast.span(right));
        self.ast.add(NodeKind::BinaryExpr { op, left, right }, span)
    }

    fn parse_logical_or_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_logical_and_expression()?;

        while self.match_token(&TokenKind::PipePipe)? {
            let right = self.parse_logical_and_expression()?;
            left = self.binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    fn parse_logical_and_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_equality_expression()?;

        while self.match_token(&TokenKind::AmpAmp)? {
            let right = self.parse_equality_expression()?;
            left = self.binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_relational_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_relational_expression()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_additive_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_additive_expression()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative_expression()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary_expression()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> CompileResult<NodeId> {
        let start_span = self.current.span;
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary_expression(),
        };
        self.advance()?;
        let operand = self.parse_unary_expression()?;
        let span = start_span.merge(self.ast.span(operand));
        Ok(self.ast.add(NodeKind::UnaryExpr { op, operand }, span))
    }

    fn parse_primary_expression(&mut self) -> CompileResult<NodeId> {
        let span = self.current.span;

        match &self.current.kind {
            TokenKind::IntLiteral(s) | TokenKind::HexLiteral(s) => {
                let value = self.parse_int_literal(s, span)?;
                self.advance()?;
                Ok(self.ast.add(NodeKind::Literal(Literal::Int(value)), span))
            }
            TokenKind::True => {
                self.advance()?;
                Ok(self.ast.add(NodeKind::Literal(Literal::Bool(true)), span))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(self.ast.add(NodeKind::Literal(Literal::Bool(false)), span))
            }
            TokenKind::Identifier(_) => {
                let (name, name_span) = self.expect_identifier()?;
                if self.check(&TokenKind::LParen) {
                    let arguments = self.parse_arguments()?;
                    let span = name_span.merge(self.previous);
                    Ok(self.ast.add(NodeKind::FunctionCall { name, arguments }, span))
                } else {
                    self.parse_location_rest(name, name_span)
                }
            }
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(CompileError::parser(
                format!("unexpected token in expression: {}", self.current.kind),
                span,
            )),
        }
    }

    // =========================================================================
    // Literal parsing helpers
    // =========================================================================

    fn parse_int_literal(&self, s: &str, span: Span) -> CompileResult<i64> {
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed.map_err(|_| CompileError::parser(format!("invalid integer literal: {}", s), span))
    }
}
