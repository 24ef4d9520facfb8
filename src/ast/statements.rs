use std::slice::Iter;

use crate::Span;

use super::{ast::NodeId, expressions::Expr, types::TypeAnnotation};

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `let name [: ty] = value;`
    VarDecl {
        id: NodeId,
        name: String,
        name_span: Span,
        declared_type: Option<TypeAnnotation>,
        value: Expr,
    },
    /// `if (condition) { ... } [else { ... } | else if ...]`
    ///
    /// An `else if` chain is stored as an `else_branch` holding another `If`.
    If {
        condition: Expr,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Block(Block),
    Expression(Expr),
    FunctionDecl(FunctionDecl),
    Return(Option<Expr>),
    /// Placeholder for a statement that failed to parse.
    Error,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub id: NodeId,
    pub span: Span,
}

impl Block {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    /// `None` means the function returns no value.
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
}

/// Root of the tree: the top-level statements of one compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDecl(function) => Some(function),
            _ => None,
        })
    }
}
