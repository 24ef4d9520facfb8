use crate::{
    errors::errors::InternalError,
    type_checker::typed_ast::{TypedBlock, TypedStmt, TypedStmtKind},
};

use super::{compiler::Compiler, expr::gen_expression, ir::Instr};

/// Emits the instructions of one statement, in source order.
pub fn gen_statement(compiler: &mut Compiler, statement: &TypedStmt) -> Result<(), InternalError> {
    if !statement.span.is_valid() {
        return Err(InternalError::InvalidSpan {
            span: statement.span,
        });
    }

    match &statement.kind {
        TypedStmtKind::VarDecl {
            name,
            symbol,
            value,
            ..
        } => {
            let value = gen_expression(compiler, value)?;
            let place = compiler.place(*symbol, name, statement.span)?;
            compiler.emit(Instr::Store { place, value });
        }
        TypedStmtKind::Expression(expression) => {
            gen_expression(compiler, expression)?;
        }
        TypedStmtKind::Block(block) => gen_block(compiler, block)?,
        TypedStmtKind::If {
            condition,
            then_block,
            else_branch,
        } => {
            let id = compiler.new_label_id();
            let then_label = format!("if.then.{}", id);
            let else_label = format!("if.else.{}", id);
            let end_label = format!("if.end.{}", id);

            compiler.emit(Instr::Label(format!("if.cond.{}", id)));
            let cond = gen_expression(compiler, condition)?;
            compiler.emit(Instr::Branch {
                cond,
                then_label: then_label.clone(),
                else_label: if else_branch.is_some() {
                    else_label.clone()
                } else {
                    end_label.clone()
                },
            });

            compiler.emit(Instr::Label(then_label));
            gen_block(compiler, then_block)?;
            compiler.emit(Instr::Jump {
                label: end_label.clone(),
            });

            if let Some(else_branch) = else_branch {
                compiler.emit(Instr::Label(else_label));
                gen_statement(compiler, else_branch)?;
                compiler.emit(Instr::Jump {
                    label: end_label.clone(),
                });
            }

            compiler.emit(Instr::Label(end_label));
        }
        TypedStmtKind::While { condition, body } => {
            let id = compiler.new_label_id();
            let cond_label = format!("while.cond.{}", id);
            let body_label = format!("while.body.{}", id);
            let end_label = format!("while.end.{}", id);

            compiler.emit(Instr::Label(cond_label.clone()));
            let cond = gen_expression(compiler, condition)?;
            compiler.emit(Instr::Branch {
                cond,
                then_label: body_label.clone(),
                else_label: end_label.clone(),
            });

            compiler.emit(Instr::Label(body_label));
            gen_block(compiler, body)?;
            compiler.emit(Instr::Jump { label: cond_label });

            compiler.emit(Instr::Label(end_label));
        }
        TypedStmtKind::Return(value) => {
            let value = match value {
                Some(value) => Some(gen_expression(compiler, value)?),
                None => None,
            };
            compiler.emit(Instr::Return(value));
        }
        // Lowered separately into functions of their own.
        TypedStmtKind::FunctionDecl(_) => {}
        TypedStmtKind::Error => {
            return Err(InternalError::ErrorNode {
                span: statement.span,
            })
        }
    }

    Ok(())
}

pub fn gen_block(compiler: &mut Compiler, block: &TypedBlock) -> Result<(), InternalError> {
    for statement in &block.body {
        gen_statement(compiler, statement)?;
    }
    Ok(())
}
