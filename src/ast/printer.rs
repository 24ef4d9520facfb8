//! Turns an AST back into source text.
//!
//! The output is canonical: every binary, unary and assignment expression is
//! parenthesised, so re-parsing the text rebuilds the same tree shape.

use super::{
    expressions::{Expr, ExprKind, Literal},
    statements::{Block, FunctionDecl, Program, Stmt, StmtKind},
};

const INDENT: &str = "    ";

pub fn to_source(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.body {
        print_stmt(&mut out, stmt, 0);
    }
    out
}

pub fn expr_to_source(expr: &Expr) -> String {
    let mut out = String::new();
    print_expr(&mut out, expr);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    print_stmt_inline(out, stmt, depth);
    out.push('\n');
}

fn print_stmt_inline(out: &mut String, stmt: &Stmt, depth: usize) {
    match &stmt.kind {
        StmtKind::VarDecl {
            name,
            declared_type,
            value,
            ..
        } => {
            out.push_str("let ");
            out.push_str(name);
            if let Some(ty) = declared_type {
                out.push_str(": ");
                out.push_str(&ty.name.to_string());
            }
            out.push_str(" = ");
            print_expr(out, value);
            out.push(';');
        }
        StmtKind::If {
            condition,
            then_block,
            else_branch,
        } => {
            out.push_str("if (");
            print_expr(out, condition);
            out.push_str(") ");
            print_block(out, then_block, depth);
            if let Some(else_branch) = else_branch {
                out.push_str(" else ");
                print_stmt_inline(out, else_branch, depth);
            }
        }
        StmtKind::While { condition, body } => {
            out.push_str("while (");
            print_expr(out, condition);
            out.push_str(") ");
            print_block(out, body, depth);
        }
        StmtKind::Block(block) => print_block(out, block, depth),
        StmtKind::Expression(expr) => {
            print_expr(out, expr);
            out.push(';');
        }
        StmtKind::FunctionDecl(function) => print_function(out, function, depth),
        StmtKind::Return(value) => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                print_expr(out, value);
            }
            out.push(';');
        }
        StmtKind::Error => out.push_str("<error>;"),
    }
}

fn print_function(out: &mut String, function: &FunctionDecl, depth: usize) {
    out.push_str("fn ");
    out.push_str(&function.name);
    out.push('(');
    let params = function
        .params
        .iter()
        .map(|param| format!("{}: {}", param.name, param.ty.name))
        .collect::<Vec<_>>();
    out.push_str(&params.join(", "));
    out.push(')');
    if let Some(return_type) = function.return_type {
        out.push_str(" -> ");
        out.push_str(&return_type.name.to_string());
    }
    out.push(' ');
    print_block(out, &function.body, depth);
}

fn print_block(out: &mut String, block: &Block, depth: usize) {
    if block.body.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for stmt in &block.body {
        print_stmt(out, stmt, depth + 1);
    }
    indent(out, depth);
    out.push('}');
}

fn print_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(value)) => out.push_str(&value.to_string()),
        ExprKind::Literal(Literal::Bool(value)) => out.push_str(&value.to_string()),
        ExprKind::Identifier(name) => out.push_str(name),
        ExprKind::Binary { op, left, right } => {
            out.push('(');
            print_expr(out, left);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            print_expr(out, right);
            out.push(')');
        }
        ExprKind::Unary { op, operand } => {
            out.push('(');
            out.push_str(op.symbol());
            print_expr(out, operand);
            out.push(')');
        }
        ExprKind::Call {
            callee, arguments, ..
        } => {
            out.push_str(callee);
            out.push('(');
            for (index, argument) in arguments.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                print_expr(out, argument);
            }
            out.push(')');
        }
        ExprKind::Assignment { target, value, .. } => {
            out.push('(');
            out.push_str(target);
            out.push_str(" = ");
            print_expr(out, value);
            out.push(')');
        }
    }
}
