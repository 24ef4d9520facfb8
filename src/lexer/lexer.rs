use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{
    errors::errors::DiagnosticKind, pipeline::Session, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Handles the text matched by a pattern. Returns `None` for skipped input
/// (whitespace, comments).
pub type RegexHandler = fn(&mut Lexer<'_>, &str) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("lexer patterns are valid regular expressions"),
        handler,
    }
}

lazy_static! {
    /// Tried in order, first match wins. Multi-character operators come
    /// before their single-character prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("^[0-9]+", number_handler),
        pattern("^\\s+", skip_handler),
        pattern("^//.*", skip_handler),
        pattern("^\\$.*", skip_handler),
        pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals)),
        pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals)),
        pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals)),
        pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals)),
        pattern("^&&", MK_DEFAULT_HANDLER!(TokenKind::And)),
        pattern("^\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or)),
        pattern("^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow)),
        pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment)),
        pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Not)),
        pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Less)),
        pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater)),
        pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus)),
        pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash)),
        pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star)),
        pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash)),
        pattern("^%", MK_DEFAULT_HANDLER!(TokenKind::Percent)),
        pattern("^\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly)),
        pattern("^\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly)),
        pattern("^\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen)),
        pattern("^\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen)),
        pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma)),
        pattern("^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon)),
        pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon)),
    ];
}

/// Lazy token stream over one source buffer.
///
/// Yields exactly one `EOF` token last and then stops for good.
pub struct Lexer<'s> {
    source: &'s str,
    session: &'s Session,
    pos: usize,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str, session: &'s Session) -> Self {
        Lexer {
            source,
            session,
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn remainder(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn current_span(&self, len: usize) -> Span {
        Span::new(self.pos, self.pos + len, self.line, self.column)
    }

    /// Moves past `text`, which must be the input at the current position.
    pub fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += text.len();
    }

    /// Emits a token for `matched` at the current position and consumes it.
    pub fn make_token(&mut self, kind: TokenKind, matched: &str) -> Token {
        let token = MK_TOKEN!(kind, matched.to_string(), self.current_span(matched.len()));
        self.advance(matched);
        token
    }

    fn illegal_character(&mut self) -> Token {
        let remainder = self.remainder();
        let character = remainder.chars().next().unwrap_or('\0');
        let text = &remainder[..character.len_utf8()];
        let span = self.current_span(text.len());

        self.session
            .diagnostics
            .report(DiagnosticKind::IllegalCharacter { character }, span);
        self.make_token(TokenKind::Unknown, text)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        'scan: while !self.at_eof() {
            let remainder = self.remainder();
            for pattern in PATTERNS.iter() {
                if let Some(found) = pattern.regex.find(remainder) {
                    match (pattern.handler)(self, found.as_str()) {
                        Some(token) => {
                            trace!(kind = %token.kind, value = %token.value, "token");
                            return Some(token);
                        }
                        None => continue 'scan,
                    }
                }
            }

            return Some(self.illegal_character());
        }

        self.finished = true;
        Some(MK_TOKEN!(TokenKind::EOF, String::new(), self.current_span(0)))
    }
}

fn skip_handler(lexer: &mut Lexer<'_>, matched: &str) -> Option<Token> {
    lexer.advance(matched);
    None
}

fn number_handler(lexer: &mut Lexer<'_>, matched: &str) -> Option<Token> {
    if matched.parse::<i64>().is_ok() {
        return Some(lexer.make_token(TokenKind::Integer, matched));
    }

    let span = lexer.current_span(matched.len());
    lexer.session.diagnostics.report(
        DiagnosticKind::IntegerOverflow {
            literal: matched.to_string(),
        },
        span,
    );
    Some(lexer.make_token(TokenKind::Unknown, matched))
}

fn symbol_handler(lexer: &mut Lexer<'_>, matched: &str) -> Option<Token> {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    Some(lexer.make_token(kind, matched))
}

/// Starts lexing `source`. Tokens are produced on demand; diagnostics for
/// illegal input are recorded into `session` as the stream is consumed.
pub fn tokenize<'s>(source: &'s str, session: &'s Session) -> Lexer<'s> {
    Lexer::new(source, session)
}
