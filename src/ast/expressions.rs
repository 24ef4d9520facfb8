use crate::Span;

use super::ast::{BinaryOp, NodeId, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

/// Expression node. Owns its children.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    /// A reference to a variable or parameter.
    Identifier(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `callee(arguments...)`; `callee_span` locates the name.
    Call {
        callee: String,
        callee_span: Span,
        arguments: Vec<Expr>,
    },
    /// `target = value`; assignment is right associative.
    Assignment {
        target: String,
        target_span: Span,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Expr { id, kind, span }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(_))
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}
