//! Type annotation parsing.
//!
//! Only the two value types can be written in source: `int` and `bool`.

use crate::{
    ast::types::{TypeAnnotation, TypeName},
    lexer::tokens::TokenKind,
};

use super::parser::{ParseError, ParseResult, Parser};

pub fn parse_type(parser: &mut Parser) -> ParseResult<TypeAnnotation> {
    let name = match parser.current_token_kind() {
        TokenKind::Int => TypeName::Int,
        TokenKind::Bool => TypeName::Bool,
        _ => return Err(ParseError::unexpected("type", parser.current_token())),
    };

    let span = parser.advance().span;
    Ok(TypeAnnotation { name, span })
}
