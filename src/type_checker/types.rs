use std::fmt::Display;

use crate::ast::types::TypeName;

/// Static type of an expression or symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    /// Result of a function without a return annotation.
    Unit,
    Function { params: Vec<Type>, ret: Box<Type> },
    /// Not known yet, e.g. a variable whose initializer failed.
    Unknown,
    /// Already reported; suppresses further diagnostics.
    Error,
}

impl Type {
    pub fn from_annotation(name: TypeName) -> Type {
        match name {
            TypeName::Int => Type::Int,
            TypeName::Bool => Type::Bool,
        }
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// `Error` and `Unknown` both silence follow-up diagnostics.
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error | Type::Unknown)
    }

    /// Types a variable can hold.
    pub fn is_value(&self) -> bool {
        matches!(self, Type::Int | Type::Bool)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Unit => write!(f, "unit"),
            Type::Function { params, ret } => {
                write!(f, "fn(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Unknown => write!(f, "unknown"),
            Type::Error => write!(f, "<error>"),
        }
    }
}
