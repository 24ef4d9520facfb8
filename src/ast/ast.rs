use std::fmt::Display;

use crate::lexer::tokens::TokenKind;

use super::{
    expressions::{Expr, ExprKind},
    statements::{Block, Program, Stmt, StmtKind},
};

/// Identity of an AST node, unique within one parse. Later stages key their
/// side tables (resolutions, types) on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Dash => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Equals => BinaryOp::Eq,
            TokenKind::NotEquals => BinaryOp::Ne,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEquals => BinaryOp::Le,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEquals => BinaryOp::Ge,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Calls `f` on `expr` and every expression below it, parents first.
pub fn walk_expr<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    f(expr);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, f);
            walk_expr(right, f);
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand, f),
        ExprKind::Call { arguments, .. } => {
            for argument in arguments {
                walk_expr(argument, f);
            }
        }
        ExprKind::Assignment { value, .. } => walk_expr(value, f),
    }
}

/// Calls `f` on `stmt` and every statement nested in it, parents first.
pub fn walk_stmt<'a>(stmt: &'a Stmt, f: &mut impl FnMut(&'a Stmt)) {
    f(stmt);
    match &stmt.kind {
        StmtKind::If {
            then_block,
            else_branch,
            ..
        } => {
            walk_block(then_block, f);
            if let Some(else_branch) = else_branch {
                walk_stmt(else_branch, f);
            }
        }
        StmtKind::While { body, .. } => walk_block(body, f),
        StmtKind::Block(block) => walk_block(block, f),
        StmtKind::FunctionDecl(function) => walk_block(&function.body, f),
        StmtKind::VarDecl { .. }
        | StmtKind::Expression(_)
        | StmtKind::Return(_)
        | StmtKind::Error => {}
    }
}

fn walk_block<'a>(block: &'a Block, f: &mut impl FnMut(&'a Stmt)) {
    for stmt in &block.body {
        walk_stmt(stmt, f);
    }
}

/// The expressions held directly by `stmt` (not those of nested statements).
pub fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    match &stmt.kind {
        StmtKind::VarDecl { value, .. } => vec![value],
        StmtKind::If { condition, .. } | StmtKind::While { condition, .. } => vec![condition],
        StmtKind::Expression(expr) => vec![expr],
        StmtKind::Return(Some(value)) => vec![value],
        StmtKind::Return(None)
        | StmtKind::Block(_)
        | StmtKind::FunctionDecl(_)
        | StmtKind::Error => vec![],
    }
}

/// Whether any statement of `program` is an error placeholder. Recovery
/// always replaces a whole statement, so expressions never hold one.
pub fn contains_error_nodes(program: &Program) -> bool {
    let mut found = false;
    for stmt in &program.body {
        walk_stmt(stmt, &mut |stmt| {
            if matches!(stmt.kind, StmtKind::Error) {
                found = true;
            }
        });
    }
    found
}
