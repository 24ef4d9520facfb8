#![allow(clippy::module_inception)]

//! A small-language compiler: lexer, parser, resolver, type checker and a
//! code generator emitting a linear IR.
//!
//! ```text
//! source -> lexer -> parser -> resolver -> type_checker -> compiler (IR)
//! ```
//!
//! Every stage records into the [`errors::diagnostics::Diagnostics`] of one
//! [`pipeline::Session`]; [`pipeline::compile`] drives the whole thing.

use std::fmt::Display;

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod type_checker;

extern crate regex;

/// Location of a piece of source text.
///
/// `start` and `end` are byte offsets, `line` and `column` are 1-based and
/// describe `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Span { start, end, line, column }
    }

    /// Span covering `self` through `other`.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.line >= 1 && self.column >= 1 && self.start <= self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Returns the text of the line containing `position` (without its newline)
/// and the byte offset of `position` inside that line.
pub fn get_line_at_position(source: &str, position: usize) -> Option<(&str, usize)> {
    if position > source.len() {
        return None;
    }

    let mut start = 0;
    for line in source.split_inclusive('\n') {
        let end = start + line.len();
        if (start..end).contains(&position) {
            return Some((line.trim_end_matches(['\n', '\r']), position - start));
        }
        start = end;
    }

    // End of input: point just past the last line.
    let last = source.rsplit('\n').next().unwrap_or("");
    Some((last, last.len()))
}

/// Renders the source line of `span` with a caret underline.
///
/// ```text
///   |
/// 2 | let a = #;
///   |         ^
/// ```
pub fn render_snippet(source: &str, span: Span) -> String {
    let Some((line_text, offset)) = get_line_at_position(source, span.start) else {
        return String::new();
    };

    let line_number = span.line.to_string();
    let padding = line_number.len() + 2;
    let caret_pad = line_text
        .get(..offset)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0);
    let width = source
        .get(span.start..span.end.min(span.start + line_text.len().saturating_sub(offset)))
        .map(|text| text.chars().count())
        .unwrap_or(1)
        .max(1);

    format!(
        "{:>padding$}\n{} | {}\n{:>padding$} {}{}",
        "|",
        line_number,
        line_text,
        "|",
        " ".repeat(caret_pad),
        "^".repeat(width),
    )
}
