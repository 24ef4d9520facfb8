//! Type checking and semantic analysis module.
//!
//! This module checks the resolved AST and transforms it into a typed AST:
//!
//! - Infers the type of every expression bottom-up
//! - Checks annotations, assignments, conditions and returns
//! - Checks function calls for arity and argument types
//! - Reports division by a literal zero and unreachable statements as warnings
//!
//! An operand of type `Error` (or `Unknown`) makes the whole operation
//! `Error` without a new diagnostic, so one mistake is reported once.

pub mod type_checker;
pub mod typed_ast;
pub mod types;

#[cfg(test)]
mod tests;
