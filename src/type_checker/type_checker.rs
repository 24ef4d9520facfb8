use std::collections::HashMap;

use tracing::{debug, info_span};

use crate::{
    ast::{
        ast::{BinaryOp, UnaryOp},
        expressions::{Expr, ExprKind, Literal},
        statements::{Block, FunctionDecl, Program, Stmt, StmtKind},
    },
    errors::errors::DiagnosticKind,
    pipeline::Session,
    resolver::{
        resolver::Resolution,
        scope::{SymbolKind, SymbolRef},
    },
    Span,
};

use super::{
    typed_ast::{
        TypedBlock, TypedExpr, TypedExprKind, TypedFunction, TypedParam, TypedProgram,
        TypedStmt, TypedStmtKind,
    },
    types::Type,
};

pub struct TypeChecker<'a> {
    pub resolution: &'a Resolution,
    pub session: &'a Session,
    /// Types inferred for symbols declared without an annotation.
    pub inferred: HashMap<SymbolRef, Type>,
    /// Return type of the function being checked, `None` at top level.
    pub return_type: Option<Type>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(resolution: &'a Resolution, session: &'a Session) -> Self {
        TypeChecker {
            resolution,
            session,
            inferred: HashMap::new(),
            return_type: None,
        }
    }

    fn report(&self, kind: DiagnosticKind, span: Span) {
        self.session.diagnostics.report(kind, span);
    }

    /// Annotated type if there is one, otherwise what was inferred.
    pub fn symbol_type(&self, symbol: SymbolRef) -> Type {
        if let Some(ty) = &self.resolution.symbol(symbol).declared_type {
            return ty.clone();
        }
        self.inferred.get(&symbol).cloned().unwrap_or(Type::Unknown)
    }

    fn symbol_kind(&self, symbol: SymbolRef) -> SymbolKind {
        self.resolution.symbol(symbol).kind
    }

    fn expect_type(&self, expected: &Type, found: &TypedExpr, span: Span) {
        if !found.ty.is_error() && found.ty != *expected {
            self.report(
                DiagnosticKind::TypeMismatch {
                    expected: expected.to_string(),
                    found: found.ty.to_string(),
                },
                span,
            );
        }
    }
}

fn binary_type(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    match (left, right) {
        (Type::Int, Type::Int) if op.is_arithmetic() => Some(Type::Int),
        (Type::Int, Type::Int) if op.is_relational() => Some(Type::Bool),
        (Type::Bool, Type::Bool) if op.is_logical() => Some(Type::Bool),
        (l, r) if op.is_equality() && l == r && l.is_value() => Some(Type::Bool),
        _ => None,
    }
}

pub fn type_check_expr(type_checker: &mut TypeChecker, ast: &Expr) -> TypedExpr {
    let (kind, ty) = match &ast.kind {
        ExprKind::Literal(literal) => {
            let ty = match literal {
                Literal::Int(_) => Type::Int,
                Literal::Bool(_) => Type::Bool,
            };
            (TypedExprKind::Literal(*literal), ty)
        }
        ExprKind::Identifier(name) => {
            let symbol = type_checker.resolution.reference(ast.id);
            let ty = match symbol {
                Some(symbol) if type_checker.symbol_kind(symbol) == SymbolKind::Function => {
                    type_checker.report(
                        DiagnosticKind::FunctionAsValue { name: name.clone() },
                        ast.span,
                    );
                    Type::Error
                }
                Some(symbol) => type_checker.symbol_type(symbol),
                None => Type::Error,
            };
            (
                TypedExprKind::Variable {
                    name: name.clone(),
                    symbol,
                },
                ty,
            )
        }
        ExprKind::Binary { op, left, right } => {
            let left = type_check_expr(type_checker, left);
            let right = type_check_expr(type_checker, right);

            let ty = if left.ty.is_error() || right.ty.is_error() {
                Type::Error
            } else {
                match binary_type(*op, &left.ty, &right.ty) {
                    Some(ty) => ty,
                    None => {
                        type_checker.report(
                            DiagnosticKind::InvalidOperands {
                                operator: op.to_string(),
                                operands: format!("{}` and `{}", left.ty, right.ty),
                            },
                            ast.span,
                        );
                        Type::Error
                    }
                }
            };

            if matches!(op, BinaryOp::Div | BinaryOp::Rem)
                && right.as_literal() == Some(Literal::Int(0))
            {
                type_checker.report(DiagnosticKind::DivisionByZero, right.span);
            }

            (
                TypedExprKind::Binary {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty,
            )
        }
        ExprKind::Unary { op, operand } => {
            let operand = type_check_expr(type_checker, operand);

            let ty = match (op, &operand.ty) {
                (_, ty) if ty.is_error() => Type::Error,
                (UnaryOp::Neg, Type::Int) => Type::Int,
                (UnaryOp::Not, Type::Bool) => Type::Bool,
                (_, ty) => {
                    type_checker.report(
                        DiagnosticKind::InvalidOperands {
                            operator: op.to_string(),
                            operands: ty.to_string(),
                        },
                        ast.span,
                    );
                    Type::Error
                }
            };

            (
                TypedExprKind::Unary {
                    op: *op,
                    operand: Box::new(operand),
                },
                ty,
            )
        }
        ExprKind::Call {
            callee,
            callee_span,
            arguments,
        } => {
            let symbol = type_checker.resolution.reference(ast.id);
            let arguments: Vec<_> = arguments
                .iter()
                .map(|argument| type_check_expr(type_checker, argument))
                .collect();

            let ty = match symbol.map(|symbol| type_checker.symbol_type(symbol)) {
                None => Type::Error,
                Some(ty) if ty.is_error() => Type::Error,
                Some(Type::Function { params, ret }) => {
                    if params.len() != arguments.len() {
                        type_checker.report(
                            DiagnosticKind::ArityMismatch {
                                name: callee.clone(),
                                expected: params.len(),
                                found: arguments.len(),
                            },
                            ast.span,
                        );
                    } else {
                        for (position, (param, argument)) in
                            params.iter().zip(&arguments).enumerate()
                        {
                            if !argument.ty.is_error() && argument.ty != *param {
                                type_checker.report(
                                    DiagnosticKind::ArgumentTypeMismatch {
                                        name: callee.clone(),
                                        position: position + 1,
                                        expected: param.to_string(),
                                        found: argument.ty.to_string(),
                                    },
                                    argument.span,
                                );
                            }
                        }
                    }
                    *ret
                }
                Some(_) => {
                    type_checker.report(
                        DiagnosticKind::NotCallable {
                            name: callee.clone(),
                        },
                        *callee_span,
                    );
                    Type::Error
                }
            };

            (
                TypedExprKind::Call {
                    callee: callee.clone(),
                    symbol,
                    arguments,
                },
                ty,
            )
        }
        ExprKind::Assignment {
            target,
            target_span,
            value,
        } => {
            let value = type_check_expr(type_checker, value);
            let symbol = type_checker.resolution.reference(ast.id);

            let ty = match symbol {
                None => Type::Error,
                Some(symbol) if type_checker.symbol_kind(symbol) == SymbolKind::Function => {
                    type_checker.report(
                        DiagnosticKind::NotAssignable {
                            name: target.clone(),
                        },
                        *target_span,
                    );
                    Type::Error
                }
                Some(symbol) => {
                    let target_type = type_checker.symbol_type(symbol);
                    if !target_type.is_error() {
                        type_checker.expect_type(&target_type, &value, ast.span);
                    }
                    target_type
                }
            };

            (
                TypedExprKind::Assignment {
                    target: target.clone(),
                    symbol,
                    value: Box::new(value),
                },
                ty,
            )
        }
    };

    TypedExpr {
        id: ast.id,
        kind,
        ty,
        span: ast.span,
    }
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, ast: &Stmt) -> TypedStmt {
    let kind = match &ast.kind {
        StmtKind::VarDecl {
            id,
            name,
            declared_type,
            value,
            ..
        } => {
            let value = type_check_expr(type_checker, value);
            let symbol = type_checker.resolution.declaration(*id);

            let ty = match declared_type {
                Some(annotation) => {
                    let declared = Type::from_annotation(annotation.name);
                    type_checker.expect_type(&declared, &value, value.span);
                    declared
                }
                None if value.ty == Type::Unit => {
                    type_checker.report(
                        DiagnosticKind::UnitValue { name: name.clone() },
                        value.span,
                    );
                    Type::Error
                }
                None => value.ty.clone(),
            };

            if let Some(symbol) = symbol {
                type_checker.inferred.insert(symbol, ty.clone());
            }

            TypedStmtKind::VarDecl {
                name: name.clone(),
                symbol,
                ty,
                value,
            }
        }
        StmtKind::If {
            condition,
            then_block,
            else_branch,
        } => {
            let condition = type_check_condition(type_checker, condition);
            let then_block = type_check_block(type_checker, then_block);
            let else_branch = else_branch
                .as_ref()
                .map(|stmt| Box::new(type_check_stmt(type_checker, stmt)));

            TypedStmtKind::If {
                condition,
                then_block,
                else_branch,
            }
        }
        StmtKind::While { condition, body } => {
            let condition = type_check_condition(type_checker, condition);
            let body = if type_checker.session.checkpoint(body.span) {
                type_check_block(type_checker, body)
            } else {
                TypedBlock {
                    body: vec![],
                    scope: None,
                    span: body.span,
                }
            };

            TypedStmtKind::While { condition, body }
        }
        StmtKind::Block(block) => TypedStmtKind::Block(type_check_block(type_checker, block)),
        StmtKind::Expression(expr) => TypedStmtKind::Expression(type_check_expr(type_checker, expr)),
        StmtKind::FunctionDecl(function) => {
            TypedStmtKind::FunctionDecl(type_check_function(type_checker, function, ast.span))
        }
        StmtKind::Return(value) => {
            let value = value
                .as_ref()
                .map(|value| type_check_expr(type_checker, value));

            // Outside a function the resolver has already complained.
            if let Some(expected) = type_checker.return_type.clone() {
                match &value {
                    Some(value) => type_checker.expect_type(&expected, value, value.span),
                    None if expected != Type::Unit => type_checker.report(
                        DiagnosticKind::TypeMismatch {
                            expected: expected.to_string(),
                            found: Type::Unit.to_string(),
                        },
                        ast.span,
                    ),
                    None => {}
                }
            }

            TypedStmtKind::Return(value)
        }
        StmtKind::Error => TypedStmtKind::Error,
    };

    TypedStmt {
        kind,
        span: ast.span,
    }
}

fn type_check_condition(type_checker: &mut TypeChecker, condition: &Expr) -> TypedExpr {
    let condition = type_check_expr(type_checker, condition);
    type_checker.expect_type(&Type::Bool, &condition, condition.span);
    condition
}

/// Checks a statement list, warning once about the first statement that
/// follows a `return`. Top-level lists stop at a cancellation checkpoint.
fn type_check_body(
    type_checker: &mut TypeChecker,
    body: &[Stmt],
    top_level: bool,
) -> Vec<TypedStmt> {
    let mut typed = Vec::with_capacity(body.len());
    let mut after_return = false;

    for stmt in body {
        if top_level && !type_checker.session.checkpoint(stmt.span) {
            break;
        }
        if after_return {
            type_checker.report(DiagnosticKind::UnreachableCode, stmt.span);
            after_return = false;
        }
        if matches!(stmt.kind, StmtKind::Return(_)) {
            after_return = true;
        }
        typed.push(type_check_stmt(type_checker, stmt));
    }

    typed
}

pub fn type_check_block(type_checker: &mut TypeChecker, ast: &Block) -> TypedBlock {
    TypedBlock {
        body: type_check_body(type_checker, &ast.body, false),
        scope: type_checker.resolution.block_scopes.get(&ast.id).copied(),
        span: ast.span,
    }
}

fn type_check_function(
    type_checker: &mut TypeChecker,
    function: &FunctionDecl,
    span: Span,
) -> TypedFunction {
    let symbol = type_checker.resolution.declaration(function.id);
    let return_type = function
        .return_type
        .map(|ty| Type::from_annotation(ty.name))
        .unwrap_or(Type::Unit);

    let params = function
        .params
        .iter()
        .map(|param| TypedParam {
            name: param.name.clone(),
            symbol: type_checker.resolution.declaration(param.id),
            ty: Type::from_annotation(param.ty.name),
        })
        .collect();

    let outer = type_checker.return_type.replace(return_type.clone());
    let body = type_check_block(type_checker, &function.body);
    type_checker.return_type = outer;

    if return_type != Type::Unit && !block_returns(&body) {
        type_checker.report(
            DiagnosticKind::MissingReturn {
                name: function.name.clone(),
            },
            function.name_span,
        );
    }

    TypedFunction {
        name: function.name.clone(),
        symbol,
        params,
        return_type,
        body,
        span,
    }
}

/// Whether control can never fall off the end of `block`.
pub fn block_returns(block: &TypedBlock) -> bool {
    block.body.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &TypedStmt) -> bool {
    match &stmt.kind {
        TypedStmtKind::Return(_) => true,
        TypedStmtKind::Block(block) => block_returns(block),
        TypedStmtKind::If {
            then_block,
            else_branch: Some(else_branch),
            ..
        } => block_returns(then_block) && stmt_returns(else_branch),
        _ => false,
    }
}

/// Types every expression of a resolved program.
pub fn type_check(ast: &Program, resolution: &Resolution, session: &Session) -> TypedProgram {
    let _span = info_span!("type_check").entered();
    let mut type_checker = TypeChecker::new(resolution, session);

    let body = type_check_body(&mut type_checker, &ast.body, true);

    debug!(
        statements = body.len(),
        inferred = type_checker.inferred.len(),
        "type checked program"
    );

    TypedProgram {
        body,
        scopes: resolution.scopes.clone(),
        span: ast.span,
    }
}
