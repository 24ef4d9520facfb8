//! Utility macros for the compiler.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a lexer handler for fixed-text tokens
//!
//! These macros reduce boilerplate in the lexer's pattern table.

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a handler for patterns that always produce the same token kind.
///
/// The handler emits a token of `$kind` spanning the matched text and moves
/// the lexer past it.
///
/// # Example
///
/// ```ignore
/// pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr) => {{
        fn handler(lexer: &mut Lexer<'_>, matched: &str) -> Option<Token> {
            Some(lexer.make_token($kind, matched))
        }
        handler
    }};
}
