//! Name resolution.
//!
//! Walks the AST once, builds the tree of lexical scopes and links every
//! identifier to the symbol it names:
//!
//! - one scope per block and per function, rooted at the global scope
//! - functions hoisted to the start of their declaring scope
//! - variables visible only after their declaration
//! - redeclaration in one scope is an error, shadowing is not
//!
//! Symbols are owned by their scope; everything else refers to them through
//! `SymbolRef` handles.

pub mod resolver;
pub mod scope;
