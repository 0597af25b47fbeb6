//! Symbols recorded in symbol tables

use std::fmt;
use crate::common::Span;
use crate::frontend::ast::DataType;

/// Where a variable's storage lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    /// Declared in the program's root scope
    Global,
    /// Declared inside a function
    Local,
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable {
        array_length: u32,
        storage: StorageClass,
    },
    Parameter,
    Function {
        parameter_types: Vec<DataType>,
    },
}

/// A declared name
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type; the return type for functions
    pub ty: DataType,
    /// Declaration site
    pub span: Span,
}

impl Symbol {
    /// Callers must reject `void` variables and zero-length arrays first
    pub fn variable(
        name: impl Into<String>,
        ty: DataType,
        array_length: u32,
        storage: StorageClass,
        span: Span,
    ) -> Self {
        debug_assert!(ty != DataType::Void && array_length > 0);
        Self {
            name: name.into(),
            kind: SymbolKind::Variable { array_length, storage },
            ty,
            span,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: DataType, span: Span) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            ty,
            span,
        }
    }

    pub fn function(
        name: impl Into<String>,
        return_type: DataType,
        parameter_types: Vec<DataType>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function { parameter_types },
            ty: return_type,
            span,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function { .. })
    }

    /// Number of addressable elements; functions are not addressable
    pub fn array_length(&self) -> u32 {
        match &self.kind {
            SymbolKind::Variable { array_length, .. } => *array_length,
            SymbolKind::Parameter => 1,
            SymbolKind::Function { .. } => 0,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_length() > 1
    }

    pub fn storage(&self) -> Option<StorageClass> {
        match &self.kind {
            SymbolKind::Variable { storage, .. } => Some(*storage),
            SymbolKind::Parameter => Some(StorageClass::Local),
            SymbolKind::Function { .. } => None,
        }
    }

    pub fn return_type(&self) -> Option<DataType> {
        self.is_function().then_some(self.ty)
    }

    /// Positional parameter types; empty for non-functions
    pub fn parameter_types(&self) -> &[DataType] {
        match &self.kind {
            SymbolKind::Function { parameter_types } => parameter_types,
            _ => &[],
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SymbolKind::Variable { array_length, storage } => {
                let storage = match storage {
                    StorageClass::Global => "global",
                    StorageClass::Local => "local",
                };
                if *array_length > 1 {
                    write!(f, "{} {} {}[{}]", storage, self.ty, self.name, array_length)
                } else {
                    write!(f, "{} {} {}", storage, self.ty, self.name)
                }
            }
            SymbolKind::Parameter => write!(f, "param {} {}", self.ty, self.name),
            SymbolKind::Function { parameter_types } => {
                write!(f, "def {} {}(", self.ty, self.name)?;
                for (i, ty) in parameter_types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
        }
    }
}
