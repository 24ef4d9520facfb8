//! Typed Abstract Syntax Tree definitions.
//!
//! The typed AST mirrors the untyped one, but every expression carries its
//! type and every name carries the symbol it resolved to (`None` when
//! resolution failed). It owns a copy of the scope tree so the code
//! generator needs nothing else.

use crate::{
    ast::{
        ast::{BinaryOp, NodeId, UnaryOp},
        expressions::Literal,
    },
    resolver::scope::{ScopeId, ScopeTree, SymbolRef},
    Span,
};

use super::types::Type;

#[derive(Debug, Clone)]
pub struct TypedExpr {
    pub id: NodeId,
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedExprKind {
    Literal(Literal),
    Variable {
        name: String,
        symbol: Option<SymbolRef>,
    },
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Call {
        callee: String,
        symbol: Option<SymbolRef>,
        arguments: Vec<TypedExpr>,
    },
    Assignment {
        target: String,
        symbol: Option<SymbolRef>,
        value: Box<TypedExpr>,
    },
}

impl TypedExpr {
    pub fn as_literal(&self) -> Option<Literal> {
        match self.kind {
            TypedExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypedStmt {
    pub kind: TypedStmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedStmtKind {
    VarDecl {
        name: String,
        symbol: Option<SymbolRef>,
        ty: Type,
        value: TypedExpr,
    },
    If {
        condition: TypedExpr,
        then_block: TypedBlock,
        else_branch: Option<Box<TypedStmt>>,
    },
    While {
        condition: TypedExpr,
        body: TypedBlock,
    },
    Block(TypedBlock),
    Expression(TypedExpr),
    FunctionDecl(TypedFunction),
    Return(Option<TypedExpr>),
    Error,
}

#[derive(Debug, Clone)]
pub struct TypedBlock {
    pub body: Vec<TypedStmt>,
    pub scope: Option<ScopeId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedParam {
    pub name: String,
    pub symbol: Option<SymbolRef>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TypedFunction {
    pub name: String,
    pub symbol: Option<SymbolRef>,
    pub params: Vec<TypedParam>,
    pub return_type: Type,
    pub body: TypedBlock,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedProgram {
    pub body: Vec<TypedStmt>,
    pub scopes: ScopeTree,
    pub span: Span,
}

impl TypedProgram {
    pub fn functions(&self) -> impl Iterator<Item = &TypedFunction> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            TypedStmtKind::FunctionDecl(function) => Some(function),
            _ => None,
        })
    }
}
