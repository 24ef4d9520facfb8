use crate::{
    ast::{
        ast::{BinaryOp, UnaryOp},
        expressions::{Expr, ExprKind, Literal},
    },
    errors::errors::DiagnosticKind,
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::{ParseError, ParseResult, Parser},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> ParseResult<Expr> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(ParseError::unexpected("expression", parser.current_token())),
    };

    let mut left = nud(parser)?;

    // While the current token binds tighter than `bp`, keep extending lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = parser.binding_power(token_kind);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => break,
        };
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let token = parser.advance();
    let literal = match token.kind {
        TokenKind::Integer => match token.value.parse() {
            Ok(value) => Literal::Int(value),
            Err(_) => {
                return Err(ParseError::new(
                    DiagnosticKind::IntegerOverflow {
                        literal: token.value.clone(),
                    },
                    token.span,
                ))
            }
        },
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        _ => return Err(ParseError::unexpected("expression", &token)),
    };

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Literal(literal),
        token.span,
    ))
}

/// A name on its own, or the callee of a call when followed by `(`.
pub fn parse_symbol_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let name_token = parser.advance();

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(Expr::new(
            parser.advance_id(),
            ExprKind::Identifier(name_token.value),
            name_token.span,
        ));
    }

    let open = parser.advance();
    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::Default)?);
            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                continue;
            }
            break;
        }
    }

    let close = parser.expect_closing(TokenKind::CloseParen, "`)`", "argument list", &open)?;

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Call {
            callee: name_token.value,
            callee_span: name_token.span,
            arguments,
        },
        name_token.span.to(close.span),
    ))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> ParseResult<Expr> {
    let operator_token = parser.advance();
    let op = match BinaryOp::from_token(operator_token.kind) {
        Some(op) => op,
        None => return Err(ParseError::unexpected("operator", &operator_token)),
    };

    let right = parse_expr(parser, bp)?;
    let span = left.span.to(right.span);

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let operator_token = parser.advance();
    let op = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Neg,
        _ => UnaryOp::Not,
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = operator_token.span.to(operand.span);

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        span,
    ))
}

/// `target = value`. Right associative; the target must be a plain name.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> ParseResult<Expr> {
    parser.advance();
    let value = parse_expr(parser, BindingPower::Default)?;

    let target = match left.kind {
        ExprKind::Identifier(name) => name,
        _ => {
            return Err(ParseError::new(
                DiagnosticKind::InvalidAssignmentTarget,
                left.span,
            ))
        }
    };
    let span = left.span.to(value.span);

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Assignment {
            target,
            target_span: left.span,
            value: Box::new(value),
        },
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let open = parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_closing(
        TokenKind::CloseParen,
        "`)`",
        "parenthesized expression",
        &open,
    )?;

    Ok(expr)
}

/// An illegal character already reported by the lexer; abandons the
/// statement without a second diagnostic.
pub fn parse_unknown_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let token = parser.advance();
    Err(ParseError::unexpected("expression", &token))
}
