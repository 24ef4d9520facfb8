use thiserror::Error;

use crate::Span;

/// Broad classification of a diagnostic, mirroring the compiler stage that
/// detected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Resolution,
    Type,
    Cancellation,
    Lint,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    // Lexical
    #[error("illegal character {character:?}")]
    IllegalCharacter { character: char },
    #[error("integer literal `{literal}` is out of range")]
    IntegerOverflow { literal: String },

    // Syntax
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken { expected: String, found: String },
    #[error("unterminated {construct}")]
    UnterminatedConstruct { construct: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("function `{name}` must be declared at the top level")]
    NestedFunction { name: String },

    // Resolution
    #[error("undeclared identifier `{name}`")]
    UndeclaredIdentifier { name: String },
    #[error("`{name}` is already declared in this scope")]
    Redeclaration { name: String },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,

    // Type
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error("function `{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{name}`: expected `{expected}`, found `{found}`")]
    ArgumentTypeMismatch {
        name: String,
        position: usize,
        expected: String,
        found: String,
    },
    #[error("`{name}` is not a function")]
    NotCallable { name: String },
    #[error("cannot assign to function `{name}`")]
    NotAssignable { name: String },
    #[error("function `{name}` cannot be used as a value")]
    FunctionAsValue { name: String },
    #[error("expression of type `unit` cannot initialize `{name}`")]
    UnitValue { name: String },
    #[error("function `{name}` does not return a value on every path")]
    MissingReturn { name: String },
    #[error("operator `{operator}` cannot be applied to `{operands}`")]
    InvalidOperands { operator: String, operands: String },

    #[error("compilation cancelled")]
    Cancelled,

    // Warnings
    #[error("division by zero")]
    DivisionByZero,
    #[error("unreachable statement")]
    UnreachableCode,
}

impl DiagnosticKind {
    pub fn get_error_name(&self) -> &'static str {
        match self {
            DiagnosticKind::IllegalCharacter { .. } => "IllegalCharacter",
            DiagnosticKind::IntegerOverflow { .. } => "IntegerOverflow",
            DiagnosticKind::UnexpectedToken { .. } => "UnexpectedToken",
            DiagnosticKind::UnterminatedConstruct { .. } => "UnterminatedConstruct",
            DiagnosticKind::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            DiagnosticKind::NestedFunction { .. } => "NestedFunction",
            DiagnosticKind::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            DiagnosticKind::Redeclaration { .. } => "Redeclaration",
            DiagnosticKind::ReturnOutsideFunction => "ReturnOutsideFunction",
            DiagnosticKind::TypeMismatch { .. } => "TypeMismatch",
            DiagnosticKind::ArityMismatch { .. } => "ArityMismatch",
            DiagnosticKind::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            DiagnosticKind::NotCallable { .. } => "NotCallable",
            DiagnosticKind::NotAssignable { .. } => "NotAssignable",
            DiagnosticKind::FunctionAsValue { .. } => "FunctionAsValue",
            DiagnosticKind::UnitValue { .. } => "UnitValue",
            DiagnosticKind::MissingReturn { .. } => "MissingReturn",
            DiagnosticKind::InvalidOperands { .. } => "InvalidOperands",
            DiagnosticKind::Cancelled => "Cancelled",
            DiagnosticKind::DivisionByZero => "DivisionByZero",
            DiagnosticKind::UnreachableCode => "UnreachableCode",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DiagnosticKind::IllegalCharacter { .. } | DiagnosticKind::IntegerOverflow { .. } => {
                ErrorCategory::Lexical
            }
            DiagnosticKind::UnexpectedToken { .. }
            | DiagnosticKind::UnterminatedConstruct { .. }
            | DiagnosticKind::InvalidAssignmentTarget
            | DiagnosticKind::NestedFunction { .. } => ErrorCategory::Syntax,
            DiagnosticKind::UndeclaredIdentifier { .. }
            | DiagnosticKind::Redeclaration { .. }
            | DiagnosticKind::ReturnOutsideFunction => ErrorCategory::Resolution,
            DiagnosticKind::TypeMismatch { .. }
            | DiagnosticKind::ArityMismatch { .. }
            | DiagnosticKind::ArgumentTypeMismatch { .. }
            | DiagnosticKind::NotCallable { .. }
            | DiagnosticKind::NotAssignable { .. }
            | DiagnosticKind::FunctionAsValue { .. }
            | DiagnosticKind::UnitValue { .. }
            | DiagnosticKind::MissingReturn { .. }
            | DiagnosticKind::InvalidOperands { .. } => ErrorCategory::Type,
            DiagnosticKind::Cancelled => ErrorCategory::Cancellation,
            DiagnosticKind::DivisionByZero | DiagnosticKind::UnreachableCode => {
                ErrorCategory::Lint
            }
        }
    }

    /// Whether this kind is reported as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        self.category() == ErrorCategory::Lint
    }
}

/// A broken pipeline invariant. Never shown to users as a normal diagnostic:
/// it signals a defect in the compiler itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("internal error: error placeholder reached code generation at {span}")]
    ErrorNode { span: Span },
    #[error("internal error: identifier `{name}` at {span} has no resolved symbol")]
    UnresolvedIdentifier { name: String, span: Span },
    #[error("internal error: expression at {span} has an error type")]
    ErrorType { span: Span },
    #[error("internal error: node has an invalid span {span:?}")]
    InvalidSpan { span: Span },
    #[error("internal error: worker compiling `{unit}` panicked")]
    WorkerPanicked { unit: String },
}
