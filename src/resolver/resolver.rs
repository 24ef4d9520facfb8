use std::collections::HashMap;

use tracing::{debug, info_span, trace};

use crate::{
    ast::{
        ast::NodeId,
        expressions::{Expr, ExprKind},
        statements::{Block, FunctionDecl, Program, Stmt, StmtKind},
    },
    errors::errors::DiagnosticKind,
    pipeline::Session,
    type_checker::types::Type,
    Span,
};

use super::scope::{ScopeId, ScopeKind, ScopeTree, Symbol, SymbolKind, SymbolRef};

/// Functions every program can call without declaring them.
pub const BUILTINS: &[(&str, &[Type], Type)] = &[("print", &[Type::Int], Type::Unit)];

/// Result of name resolution, kept alongside the AST.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub scopes: ScopeTree,
    /// Identifier, call and assignment expressions to the symbol they name.
    pub references: HashMap<NodeId, SymbolRef>,
    /// Variable, parameter and function declarations to their symbol.
    pub declarations: HashMap<NodeId, SymbolRef>,
    /// Blocks to the scope they open. A function body maps to the function
    /// scope.
    pub block_scopes: HashMap<NodeId, ScopeId>,
}

impl Resolution {
    pub fn reference(&self, id: NodeId) -> Option<SymbolRef> {
        self.references.get(&id).copied()
    }

    pub fn declaration(&self, id: NodeId) -> Option<SymbolRef> {
        self.declarations.get(&id).copied()
    }

    pub fn symbol(&self, symbol: SymbolRef) -> &Symbol {
        self.scopes.symbol(symbol)
    }
}

pub(crate) struct Resolver<'s> {
    session: &'s Session,
    resolution: Resolution,
    current: ScopeId,
    function_depth: usize,
}

/// Builds the scope tree for `program` and resolves every name in it.
pub fn resolve(program: &Program, session: &Session) -> Resolution {
    let _span = info_span!("resolve").entered();

    let mut resolver = Resolver::new(session);
    resolver.hoist_functions(&program.body);

    for stmt in program.iter() {
        if !session.checkpoint(stmt.span) {
            break;
        }
        resolver.resolve_stmt(stmt);
    }

    resolver.finish()
}

impl<'s> Resolver<'s> {
    /// A resolver positioned in the global scope, with the builtins declared.
    pub(crate) fn new(session: &'s Session) -> Self {
        let mut resolver = Resolver {
            session,
            resolution: Resolution::default(),
            current: ScopeId::GLOBAL,
            function_depth: 0,
        };
        resolver.declare_builtins();
        resolver
    }

    pub(crate) fn finish(self) -> Resolution {
        debug!(
            scopes = self.resolution.scopes.len(),
            references = self.resolution.references.len(),
            "resolved program"
        );
        self.resolution
    }

    fn declare_builtins(&mut self) {
        for (name, params, ret) in BUILTINS {
            let symbol = Symbol {
                name: name.to_string(),
                kind: SymbolKind::Function,
                declared_type: Some(Type::function(params.to_vec(), ret.clone())),
                scope: ScopeId::GLOBAL,
                span: Span::default(),
                node: None,
            };
            // The global scope is empty at this point.
            let _ = self.resolution.scopes.declare(symbol);
        }
    }

    fn declare(
        &mut self,
        node: NodeId,
        name: &str,
        kind: SymbolKind,
        declared_type: Option<Type>,
        span: Span,
    ) -> Option<SymbolRef> {
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            declared_type,
            scope: self.current,
            span,
            node: Some(node),
        };

        match self.resolution.scopes.declare(symbol) {
            Ok(symbol) => {
                trace!(name, scope = %self.current, "declared symbol");
                self.resolution.declarations.insert(node, symbol);
                Some(symbol)
            }
            Err(_) => {
                self.session.diagnostics.report(
                    DiagnosticKind::Redeclaration {
                        name: name.to_string(),
                    },
                    span,
                );
                None
            }
        }
    }

    /// Declares the functions of a statement list up front so they can be
    /// called before (and from within) their own declaration.
    fn hoist_functions(&mut self, body: &[Stmt]) {
        for stmt in body {
            if let StmtKind::FunctionDecl(function) = &stmt.kind {
                let params = function
                    .params
                    .iter()
                    .map(|param| Type::from_annotation(param.ty.name))
                    .collect();
                let ret = function
                    .return_type
                    .map(|ty| Type::from_annotation(ty.name))
                    .unwrap_or(Type::Unit);

                self.declare(
                    function.id,
                    &function.name,
                    SymbolKind::Function,
                    Some(Type::function(params, ret)),
                    function.name_span,
                );
            }
        }
    }

    fn lookup(&mut self, id: NodeId, name: &str, span: Span) {
        match self.resolution.scopes.lookup(self.current, name) {
            Some(symbol) => {
                self.resolution.references.insert(id, symbol);
            }
            None => self.session.diagnostics.report(
                DiagnosticKind::UndeclaredIdentifier {
                    name: name.to_string(),
                },
                span,
            ),
        }
    }

    fn enter(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = self.current;
        self.current = self.resolution.scopes.push(kind, parent);
        parent
    }

    pub(crate) fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl {
                id,
                name,
                name_span,
                declared_type,
                value,
            } => {
                self.resolve_expr(value);
                let declared_type = declared_type.map(|ty| Type::from_annotation(ty.name));
                self.declare(*id, name, SymbolKind::Variable, declared_type, *name_span);
            }
            StmtKind::If {
                condition,
                then_block,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_block(then_block);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.resolve_expr(condition);
                if self.session.checkpoint(body.span) {
                    self.resolve_block(body);
                }
            }
            StmtKind::Block(block) => self.resolve_block(block),
            StmtKind::Expression(expr) => self.resolve_expr(expr),
            StmtKind::FunctionDecl(function) => self.resolve_function(function),
            StmtKind::Return(value) => {
                if self.function_depth == 0 {
                    self.session
                        .diagnostics
                        .report(DiagnosticKind::ReturnOutsideFunction, stmt.span);
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            StmtKind::Error => {}
        }
    }

    fn resolve_block(&mut self, block: &Block) {
        let parent = self.enter(ScopeKind::Block);
        self.resolution.block_scopes.insert(block.id, self.current);

        self.hoist_functions(&block.body);
        for stmt in block.iter() {
            self.resolve_stmt(stmt);
        }

        self.current = parent;
    }

    /// Parameters and the body's top-level statements share one scope.
    fn resolve_function(&mut self, function: &FunctionDecl) {
        let parent = self.enter(ScopeKind::Function);
        self.resolution
            .block_scopes
            .insert(function.body.id, self.current);
        self.function_depth += 1;

        for param in &function.params {
            self.declare(
                param.id,
                &param.name,
                SymbolKind::Parameter,
                Some(Type::from_annotation(param.ty.name)),
                param.span,
            );
        }

        self.hoist_functions(&function.body.body);
        for stmt in function.body.iter() {
            self.resolve_stmt(stmt);
        }

        self.function_depth -= 1;
        self.current = parent;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Identifier(name) => self.lookup(expr.id, name, expr.span),
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Call {
                callee,
                callee_span,
                arguments,
            } => {
                self.lookup(expr.id, callee, *callee_span);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            ExprKind::Assignment {
                target,
                target_span,
                value,
            } => {
                self.resolve_expr(value);
                self.lookup(expr.id, target, *target_span);
            }
        }
    }
}
