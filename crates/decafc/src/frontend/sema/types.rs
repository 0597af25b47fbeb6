//! Inferred expression types

use std::fmt;
use crate::frontend::ast::DataType;

/// Type computed for an expression during checking.
///
/// `Error` marks an expression whose type could not be determined. It is
/// never compatible with anything, itself included, so checks above it
/// keep running and report their own mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
    Void,
    Error,
}

impl Type {
    /// Same known type on both sides
    pub fn same_as(self, other: Type) -> bool {
        self != Type::Error && self == other
    }

    /// Whether this is exactly the declared type `ty`
    pub fn is(self, ty: DataType) -> bool {
        self.same_as(ty.into())
    }

    pub fn is_error(self) -> bool {
        self == Type::Error
    }
}

impl From<DataType> for Type {
    fn from(ty: DataType) -> Self {
        match ty {
            DataType::Int => Type::Int,
            DataType::Bool => Type::Bool,
            DataType::Void => Type::Void,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_matches_nothing() {
        assert!(!Type::Error.same_as(Type::Error));
        assert!(!Type::Error.same_as(Type::Int));
        assert!(!Type::Int.same_as(Type::Error));
        assert!(!Type::Error.is(DataType::Bool));
    }

    #[test]
    fn test_known_types() {
        assert!(Type::Int.same_as(Type::Int));
        assert!(!Type::Int.same_as(Type::Bool));
        assert!(Type::Void.is(DataType::Void));
        assert_eq!(Type::from(DataType::Bool), Type::Bool);
    }
}
