//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser pulls tokens lazily from the lexer, keeps one token of
//! lookahead and maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info_span};

use crate::{
    ast::{
        ast::NodeId,
        statements::{Program, Stmt, StmtKind},
    },
    errors::errors::DiagnosticKind,
    lexer::tokens::{Token, TokenKind},
    pipeline::Session,
    Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
};

/// A syntax error on its way up to the nearest statement boundary.
#[derive(Error, Debug, Clone)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: DiagnosticKind,
    pub span: Span,
    /// Already reported elsewhere (an `Unknown` token from the lexer, or a
    /// second end-of-input error); recovery still happens.
    pub silent: bool,
}

impl ParseError {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        ParseError {
            kind,
            span,
            silent: false,
        }
    }

    /// `expected <expected>, found <token>`.
    pub fn unexpected(expected: &str, token: &Token) -> Self {
        ParseError {
            kind: DiagnosticKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            },
            span: token.span,
            silent: token.kind == TokenKind::Unknown,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// The main parser structure that maintains parsing state.
pub struct Parser<'s> {
    /// Remaining tokens, pulled on demand
    tokens: Box<dyn Iterator<Item = Token> + 's>,
    /// One token of lookahead
    current: Token,
    /// Span of the most recently consumed token
    previous_span: Span,
    /// Number of tokens consumed so far
    consumed: usize,
    session: &'s Session,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Counter for generating unique node ids
    current_id: u32,
    /// Nesting depth of blocks being parsed
    pub(crate) block_depth: usize,
    /// Set once an end-of-input error has been reported
    reported_eof: bool,
}

impl<'s> Parser<'s> {
    pub fn new<I>(tokens: I, session: &'s Session) -> Self
    where
        I: IntoIterator<Item = Token>,
        I::IntoIter: 's,
    {
        let mut tokens: Box<dyn Iterator<Item = Token> + 's> = Box::new(tokens.into_iter());
        let current = tokens
            .next()
            .unwrap_or_else(|| MK_TOKEN!(TokenKind::EOF, String::new(), Span::new(0, 0, 1, 1)));

        Parser {
            tokens,
            previous_span: Span::new(0, 0, 1, 1),
            current,
            consumed: 0,
            session,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            current_id: 0,
            block_depth: 0,
            reported_eof: false,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    pub fn previous_span(&self) -> Span {
        self.previous_span
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Advances to the next token and returns the previous one. Stays on
    /// `EOF` once it is reached.
    pub fn advance(&mut self) -> Token {
        if self.current.kind == TokenKind::EOF {
            return self.current.clone();
        }

        let next = self.tokens.next().unwrap_or_else(|| {
            let end = self.current.span.end;
            MK_TOKEN!(
                TokenKind::EOF,
                String::new(),
                Span::new(end, end, self.current.span.line, self.current.span.column)
            )
        });
        let previous = std::mem::replace(&mut self.current, next);
        self.previous_span = previous.span;
        self.consumed += 1;
        previous
    }

    /// Consumes a token of `expected_kind`, or fails naming `expected`.
    pub fn expect(&mut self, expected_kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.current.kind == expected_kind {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(expected, &self.current))
        }
    }

    /// Like `expect`, for the token closing `open`. Reaching end of input
    /// reports the construct as unterminated at the opening token.
    pub fn expect_closing(
        &mut self,
        expected_kind: TokenKind,
        expected: &str,
        construct: &str,
        open: &Token,
    ) -> ParseResult<Token> {
        if self.current.kind == TokenKind::EOF {
            return Err(self.unterminated(construct, open));
        }
        self.expect(expected_kind, expected)
    }

    /// Error for a construct opened by `open` and never closed. Only the
    /// first one per parse is reported.
    pub fn unterminated(&mut self, construct: &str, open: &Token) -> ParseError {
        let mut error = ParseError::new(
            DiagnosticKind::UnterminatedConstruct {
                construct: construct.to_string(),
            },
            open.span,
        );
        error.silent = self.reported_eof;
        self.reported_eof = true;
        error
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current.kind != TokenKind::EOF
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Records `error` unless it was already reported.
    pub fn report(&self, error: ParseError) {
        if !error.silent {
            self.session.diagnostics.report(error.kind, error.span);
        }
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Binding power of `kind` in infix position.
    pub fn binding_power(&self, kind: TokenKind) -> BindingPower {
        self.binding_power_lookup
            .get(&kind)
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Advances the node id counter and returns the previous value.
    pub fn advance_id(&mut self) -> NodeId {
        let id = self.current_id;
        self.current_id += 1;
        NodeId(id)
    }

    /// Panic-mode recovery: skips to just after the next `;`, or up to the
    /// `}` closing the current block, or to end of input. Braces opened
    /// while skipping are skipped as a whole.
    pub fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::EOF => break,
                TokenKind::Semicolon => {
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::OpenCurly => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::CloseCurly => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Parses one statement; on a syntax error records it, recovers, and
/// returns an `Error` placeholder instead.
pub fn parse_stmt_recovering(parser: &mut Parser) -> Stmt {
    let start = parser.current_token().span;
    let consumed_before = parser.consumed();

    match parse_stmt(parser) {
        Ok(stmt) => stmt,
        Err(error) => {
            debug!(error = %error.kind, line = error.span.line, "recovering from syntax error");
            parser.report(error);
            parser.synchronize();
            if parser.consumed() == consumed_before {
                parser.advance();
            }
            Stmt {
                kind: StmtKind::Error,
                span: start.to(parser.previous_span()),
            }
        }
    }
}

/// Parses a token stream into a `Program`.
///
/// Returns the tree and whether the parse was fully valid: the flag is false
/// when any error was recorded while the tokens were consumed, including
/// lexical errors surfaced by a lazy token stream.
pub fn parse<'s, I>(tokens: I, session: &'s Session) -> (Program, bool)
where
    I: IntoIterator<Item = Token>,
    I::IntoIter: 's,
{
    let _span = info_span!("parse").entered();
    let errors_before = session.diagnostics.error_count();

    let mut parser = Parser::new(tokens, session);
    create_token_lookups(&mut parser);

    let start = parser.current_token().span;
    let mut body = vec![];

    while parser.has_tokens() {
        if !session.checkpoint(parser.current_token().span) {
            break;
        }
        body.push(parse_stmt_recovering(&mut parser));
    }

    let end = parser.current_token().span;
    let program = Program {
        body,
        span: start.to(end),
    };

    let valid = session.diagnostics.error_count() == errors_before;
    debug!(statements = program.body.len(), valid, "parsed program");
    (program, valid)
}
