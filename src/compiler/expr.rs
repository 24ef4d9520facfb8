use crate::{
    ast::{ast::BinaryOp, expressions::Literal},
    errors::errors::InternalError,
    type_checker::{
        typed_ast::{TypedExpr, TypedExprKind},
        types::Type,
    },
};

use super::{
    compiler::Compiler,
    ir::{Instr, Operand, Place},
};

fn literal_value(literal: Literal) -> i64 {
    match literal {
        Literal::Int(value) => value,
        Literal::Bool(value) => value as i64,
    }
}

/// Value of `left op right` for two literals, or `None` when it is
/// undefined (division by zero) or overflows.
pub fn fold_binary(op: BinaryOp, left: Literal, right: Literal) -> Option<i64> {
    let value = match (left, right) {
        (Literal::Int(l), Literal::Int(r)) => match op {
            BinaryOp::Add => l.checked_add(r)?,
            BinaryOp::Sub => l.checked_sub(r)?,
            BinaryOp::Mul => l.checked_mul(r)?,
            BinaryOp::Div => l.checked_div(r)?,
            BinaryOp::Rem => l.checked_rem(r)?,
            BinaryOp::Eq => (l == r) as i64,
            BinaryOp::Ne => (l != r) as i64,
            BinaryOp::Lt => (l < r) as i64,
            BinaryOp::Le => (l <= r) as i64,
            BinaryOp::Gt => (l > r) as i64,
            BinaryOp::Ge => (l >= r) as i64,
            BinaryOp::And | BinaryOp::Or => return None,
        },
        (Literal::Bool(l), Literal::Bool(r)) => match op {
            BinaryOp::Eq => (l == r) as i64,
            BinaryOp::Ne => (l != r) as i64,
            BinaryOp::And => (l && r) as i64,
            BinaryOp::Or => (l || r) as i64,
            _ => return None,
        },
        _ => return None,
    };
    Some(value)
}

/// Emits the instructions computing `expression` and returns where its
/// value ends up.
pub fn gen_expression(
    compiler: &mut Compiler,
    expression: &TypedExpr,
) -> Result<Operand, InternalError> {
    if expression.ty.is_error() {
        return Err(InternalError::ErrorType {
            span: expression.span,
        });
    }

    match &expression.kind {
        TypedExprKind::Literal(literal) => Ok(Operand::Const(literal_value(*literal))),
        TypedExprKind::Variable { name, symbol } => {
            let place = compiler.place(*symbol, name, expression.span)?;
            Ok(compiler.emit_temp(|dest| Instr::Load { dest, place }))
        }
        TypedExprKind::Binary { op, left, right } => {
            if compiler.options.fold_constants {
                if let (Some(l), Some(r)) = (left.as_literal(), right.as_literal()) {
                    if let Some(value) = fold_binary(*op, l, r) {
                        return Ok(Operand::Const(value));
                    }
                }
            }

            if op.is_logical() {
                return gen_short_circuit(compiler, *op, left, right);
            }

            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;
            Ok(compiler.emit_temp(|dest| Instr::Binary {
                dest,
                op: *op,
                left,
                right,
            }))
        }
        TypedExprKind::Unary { op, operand } => {
            let operand = gen_expression(compiler, operand)?;
            Ok(compiler.emit_temp(|dest| Instr::Unary {
                dest,
                op: *op,
                operand,
            }))
        }
        TypedExprKind::Call {
            callee,
            symbol,
            arguments,
        } => {
            if symbol.is_none() {
                return Err(InternalError::UnresolvedIdentifier {
                    name: callee.clone(),
                    span: expression.span,
                });
            }

            let args = arguments
                .iter()
                .map(|argument| gen_expression(compiler, argument))
                .collect::<Result<Vec<_>, _>>()?;

            if expression.ty == Type::Unit {
                compiler.emit(Instr::Call {
                    dest: None,
                    function: callee.clone(),
                    args,
                });
                // Unit calls only appear as statements.
                Ok(Operand::Const(0))
            } else {
                Ok(compiler.emit_temp(|dest| Instr::Call {
                    dest: Some(dest),
                    function: callee.clone(),
                    args,
                }))
            }
        }
        TypedExprKind::Assignment {
            target,
            symbol,
            value,
        } => {
            let value = gen_expression(compiler, value)?;
            let place = compiler.place(*symbol, target, expression.span)?;
            compiler.emit(Instr::Store { place, value });
            Ok(value)
        }
    }
}

/// `&&` and `||` evaluate their right operand only when needed. Both arms
/// store into one local slot so every temporary is still written once. The
/// slot is `$and.N`/`$or.N`: `$` cannot start an identifier.
fn gen_short_circuit(
    compiler: &mut Compiler,
    op: BinaryOp,
    left: &TypedExpr,
    right: &TypedExpr,
) -> Result<Operand, InternalError> {
    let id = compiler.new_label_id();
    let prefix = if op == BinaryOp::And { "and" } else { "or" };
    let slot = Place::Local(format!("${}.{}", prefix, id));
    let rhs_label = format!("{}.rhs.{}", prefix, id);
    let end_label = format!("{}.end.{}", prefix, id);

    let left = gen_expression(compiler, left)?;
    compiler.emit(Instr::Store {
        place: slot.clone(),
        value: left,
    });

    let (then_label, else_label) = if op == BinaryOp::And {
        (rhs_label.clone(), end_label.clone())
    } else {
        (end_label.clone(), rhs_label.clone())
    };
    compiler.emit(Instr::Branch {
        cond: left,
        then_label,
        else_label,
    });

    compiler.emit(Instr::Label(rhs_label));
    let right = gen_expression(compiler, right)?;
    compiler.emit(Instr::Store {
        place: slot.clone(),
        value: right,
    });
    compiler.emit(Instr::Jump {
        label: end_label.clone(),
    });

    compiler.emit(Instr::Label(end_label));
    Ok(compiler.emit_temp(|dest| Instr::Load { dest, place: slot }))
}
