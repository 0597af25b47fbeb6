//! AST node definitions

use std::fmt;
use super::{BinaryOp, DataType, Literal, Parameter, UnaryOp};
use crate::common::Span;
use crate::frontend::sema::TableId;

/// Index of a node in its [`Ast`](super::Ast) arena
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A node together with its position in the tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Enclosing node; `None` for the root
    pub parent: Option<NodeId>,
    /// Symbol table attached by scope building (Program, Function and Block only)
    pub table: Option<TableId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            parent: None,
            table: None,
        }
    }
}

/// Node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Whole program: global variables and function definitions
    Program {
        variables: Vec<NodeId>,
        functions: Vec<NodeId>,
    },

    /// Function definition: def type name(params) block
    Function {
        name: String,
        return_type: DataType,
        parameters: Vec<Parameter>,
        body: NodeId,
    },

    /// Block: { declarations statements }
    Block {
        variables: Vec<NodeId>,
        statements: Vec<NodeId>,
    },

    /// Variable declaration; scalars have length 1
    Variable {
        name: String,
        ty: DataType,
        array_length: u32,
    },

    /// Assignment: loc = expr;
    Assignment {
        location: NodeId,
        value: NodeId,
    },

    /// Conditional: if (cond) block [else block]
    Conditional {
        condition: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    },

    /// While loop: while (guard) block
    WhileLoop {
        guard: NodeId,
        body: NodeId,
    },

    /// Return statement: return [expr];
    Return {
        value: Option<NodeId>,
    },

    Break,

    Continue,

    /// Call in statement position: name(args);
    VoidFunctionCall {
        name: String,
        arguments: Vec<NodeId>,
    },

    /// Binary operation: a + b, x < y
    BinaryExpr {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },

    /// Unary operation: -x, !flag
    UnaryExpr {
        op: UnaryOp,
        operand: NodeId,
    },

    /// Call in expression position: name(args)
    FunctionCall {
        name: String,
        arguments: Vec<NodeId>,
    },

    /// Variable reference, optionally indexed: x, a[i]
    Location {
        name: String,
        index: Option<NodeId>,
    },

    Literal(Literal),
}

impl NodeKind {
    /// Children in traversal order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { variables, functions } => {
                variables.iter().chain(functions).copied().collect()
            }
            NodeKind::Function { body, .. } => vec![*body],
            NodeKind::Block { variables, statements } => {
                variables.iter().chain(statements).copied().collect()
            }
            NodeKind::Assignment { location, value } => vec![*location, *value],
            NodeKind::Conditional { condition, then_block, else_block } => {
                let mut children = vec![*condition, *then_block];
                children.extend(*else_block);
                children
            }
            NodeKind::WhileLoop { guard, body } => vec![*guard, *body],
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::VoidFunctionCall { arguments, .. }
            | NodeKind::FunctionCall { arguments, .. } => arguments.clone(),
            NodeKind::BinaryExpr { left, right, .. } => vec![*left, *right],
            NodeKind::UnaryExpr { operand, .. } => vec![*operand],
            NodeKind::Location { index, .. } => index.iter().copied().collect(),
            NodeKind::Variable { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Literal(_) => Vec::new(),
        }
    }

    /// Whether this node opens a new scope
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Program { .. } | NodeKind::Function { .. } | NodeKind::Block { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "program",
            NodeKind::Function { .. } => "function",
            NodeKind::Block { .. } => "block",
            NodeKind::Variable { .. } => "variable",
            NodeKind::Assignment { .. } => "assignment",
            NodeKind::Conditional { .. } => "conditional",
            NodeKind::WhileLoop { .. } => "while loop",
            NodeKind::Return { .. } => "return",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::VoidFunctionCall { .. } => "void function call",
            NodeKind::BinaryExpr { .. } => "binary expression",
            NodeKind::UnaryExpr { .. } => "unary expression",
            NodeKind::FunctionCall { .. } => "function call",
            NodeKind::Location { .. } => "location",
            NodeKind::Literal(_) => "literal",
        }
    }
}
