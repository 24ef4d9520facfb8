//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a lazy stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, identifiers, integer literals and operators
//! - Line/column tracking for diagnostics
//! - Comments (`// ...` and `$ ...`) and whitespace handling
//! - Illegal characters and oversized literals, reported as diagnostics

pub mod lexer;
pub mod tokens;
