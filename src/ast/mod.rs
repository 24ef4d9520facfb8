/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node ids, operators and traversal helpers
/// - expressions: Expression nodes
/// - statements: Statement nodes and the program root
/// - types: Type annotations as written in source
/// - printer: Canonical source text for an AST
pub mod ast;
pub mod expressions;
pub mod printer;
pub mod statements;
pub mod types;
