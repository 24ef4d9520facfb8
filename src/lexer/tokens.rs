use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("fn", TokenKind::Fn);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("return", TokenKind::Return);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("int", TokenKind::Int);
        map.insert("bool", TokenKind::Bool);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Identifier,
    /// Illegal character or malformed literal, already reported by the lexer.
    Unknown,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Semicolon,
    Colon,
    Comma,
    Arrow,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Let,
    Fn,
    If,
    Else,
    While,
    Return,
    True,
    False,
    Int,
    Bool,
}

/// Coarse token classification.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenCategory {
    Identifier,
    Integer,
    Keyword,
    Operator,
    Punctuation,
    EndOfInput,
    Unknown,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::EOF => TokenCategory::EndOfInput,
            TokenKind::Integer => TokenCategory::Integer,
            TokenKind::Identifier => TokenCategory::Identifier,
            TokenKind::Unknown => TokenCategory::Unknown,
            TokenKind::OpenCurly
            | TokenKind::CloseCurly
            | TokenKind::OpenParen
            | TokenKind::CloseParen
            | TokenKind::Semicolon
            | TokenKind::Colon
            | TokenKind::Comma
            | TokenKind::Arrow => TokenCategory::Punctuation,
            TokenKind::Assignment
            | TokenKind::Equals
            | TokenKind::Not
            | TokenKind::NotEquals
            | TokenKind::Less
            | TokenKind::LessEquals
            | TokenKind::Greater
            | TokenKind::GreaterEquals
            | TokenKind::Or
            | TokenKind::And
            | TokenKind::Plus
            | TokenKind::Dash
            | TokenKind::Slash
            | TokenKind::Star
            | TokenKind::Percent => TokenCategory::Operator,
            TokenKind::Let
            | TokenKind::Fn
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::Return
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Int
            | TokenKind::Bool => TokenCategory::Keyword,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind == TokenKind::EOF {
            write!(f, "end of input")
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl Token {
    /// One line of the token dump: `token: KIND value: LEXEME`.
    pub fn debug_line(&self) -> String {
        format!("token: {} value: {}", self.kind, self.value)
    }
}
