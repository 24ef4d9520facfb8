use std::{collections::HashMap, fmt::Display};

use crate::{ast::ast::NodeId, type_checker::types::Type, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a symbol: the owning scope and its position in that scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolRef {
    pub scope: ScopeId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Type known from source annotations; `None` means inferred later.
    pub declared_type: Option<Type>,
    pub scope: ScopeId,
    pub span: Span,
    /// Declaring node, `None` for builtins.
    pub node: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub symbols: Vec<Symbol>,
    names: HashMap<String, usize>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }
}

/// Arena of scopes. Index 0 is always the global scope.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                id: ScopeId::GLOBAL,
                parent: None,
                kind: ScopeKind::Global,
                symbols: vec![],
                names: HashMap::new(),
            }],
        }
    }

    pub fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            kind,
            symbols: vec![],
            names: HashMap::new(),
        });
        id
    }

    /// Adds `symbol` to its scope. Fails with the existing symbol when the
    /// name is already taken in that same scope.
    pub fn declare(&mut self, symbol: Symbol) -> Result<SymbolRef, SymbolRef> {
        let scope = &mut self.scopes[symbol.scope.0];
        if let Some(index) = scope.get(&symbol.name) {
            return Err(SymbolRef {
                scope: scope.id,
                index,
            });
        }

        let index = scope.symbols.len();
        scope.names.insert(symbol.name.clone(), index);
        scope.symbols.push(symbol);
        Ok(SymbolRef {
            scope: scope.id,
            index,
        })
    }

    /// Finds `name` in `scope` or the nearest enclosing scope declaring it.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolRef> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(index) = scope.get(name) {
                return Some(SymbolRef { scope: id, index });
            }
            current = scope.parent;
        }
        None
    }

    pub fn symbol(&self, symbol: SymbolRef) -> &Symbol {
        &self.scopes[symbol.scope.0].symbols[symbol.index]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scope> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
