use std::fmt::Display;

use crate::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Bool,
}

/// A type written in source, e.g. the `int` of `let x: int = 1;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub name: TypeName,
    pub span: Span,
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Bool => write!(f, "bool"),
        }
    }
}
