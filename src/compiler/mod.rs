//! Code generation module for the compiler.
//!
//! This module lowers the typed AST into a linear intermediate
//! representation and can execute it. It handles:
//!
//! - Lowering of expressions into single-assignment temporaries
//! - Canonical labelled control flow for `if`/`while` and short-circuit
//!   `&&`/`||`
//! - Constant folding of literal-literal binary operations
//! - A small interpreter for the IR, with a `print` builtin

pub mod compiler;
pub mod expr;
pub mod ir;
pub mod stmt;
pub mod vm;

#[cfg(test)]
mod tests;
