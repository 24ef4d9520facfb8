use crate::{
    ast::statements::{Block, FunctionDecl, Param, Stmt, StmtKind},
    errors::errors::DiagnosticKind,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::{parse_stmt_recovering, ParseResult, Parser},
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()) {
        let handler = *handler;
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;
    let end = parser.expect(TokenKind::Semicolon, "`;`")?;

    Ok(Stmt {
        span: expr.span.to(end.span),
        kind: StmtKind::Expression(expr),
    })
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let start_token = parser.advance();
    let name_token = parser.expect(TokenKind::Identifier, "identifier")?;

    let declared_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::Assignment, "`=`")?;
    let value = parse_expr(parser, BindingPower::Default)?;
    let end = parser.expect(TokenKind::Semicolon, "`;`")?;

    Ok(Stmt {
        kind: StmtKind::VarDecl {
            id: parser.advance_id(),
            name: name_token.value,
            name_span: name_token.span,
            declared_type,
            value,
        },
        span: start_token.span.to(end.span),
    })
}

pub fn parse_if_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let start_token = parser.advance();

    let open = parser.expect(TokenKind::OpenParen, "`(`")?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_closing(TokenKind::CloseParen, "`)`", "condition", &open)?;

    let then_block = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            let block = parse_block(parser)?;
            Some(Box::new(Stmt {
                span: block.span,
                kind: StmtKind::Block(block),
            }))
        }
    } else {
        None
    };

    Ok(Stmt {
        kind: StmtKind::If {
            condition,
            then_block,
            else_branch,
        },
        span: start_token.span.to(parser.previous_span()),
    })
}

pub fn parse_while_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let start_token = parser.advance();

    let open = parser.expect(TokenKind::OpenParen, "`(`")?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_closing(TokenKind::CloseParen, "`)`", "condition", &open)?;

    let body = parse_block(parser)?;

    Ok(Stmt {
        span: start_token.span.to(body.span),
        kind: StmtKind::While { condition, body },
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let block = parse_block(parser)?;

    Ok(Stmt {
        span: block.span,
        kind: StmtKind::Block(block),
    })
}

/// `{ stmt* }`. Statements inside recover on their own; only end of input
/// escapes, reported once at the opening brace.
pub fn parse_block(parser: &mut Parser) -> ParseResult<Block> {
    let open = parser.expect(TokenKind::OpenCurly, "`{`")?;
    let id = parser.advance_id();
    let mut body = vec![];

    parser.block_depth += 1;
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            parser.block_depth -= 1;
            return Err(parser.unterminated("block", &open));
        }
        body.push(parse_stmt_recovering(parser));
    }
    parser.block_depth -= 1;

    let close = parser.advance();

    Ok(Block {
        body,
        id,
        span: open.span.to(close.span),
    })
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let start_token = parser.advance();
    let name_token = parser.expect(TokenKind::Identifier, "identifier")?;

    let open = parser.expect(TokenKind::OpenParen, "`(`")?;
    let mut params = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let param_name = parser.expect(TokenKind::Identifier, "parameter name")?;
            parser.expect(TokenKind::Colon, "`:`")?;
            let ty = parse_type(parser)?;

            params.push(Param {
                id: parser.advance_id(),
                span: param_name.span.to(ty.span),
                name: param_name.value,
                ty,
            });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                continue;
            }
            break;
        }
    }

    parser.expect_closing(TokenKind::CloseParen, "`)`", "parameter list", &open)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let nested = parser.block_depth > 0;
    let body = parse_block(parser)?;
    let span = start_token.span.to(body.span);

    if nested {
        parser.session().diagnostics.report(
            DiagnosticKind::NestedFunction {
                name: name_token.value,
            },
            name_token.span,
        );
        return Ok(Stmt {
            kind: StmtKind::Error,
            span,
        });
    }

    Ok(Stmt {
        kind: StmtKind::FunctionDecl(FunctionDecl {
            id: parser.advance_id(),
            name: name_token.value,
            name_span: name_token.span,
            params,
            return_type,
            body,
        }),
        span,
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> ParseResult<Stmt> {
    let start_token = parser.advance();

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };
    let end = parser.expect(TokenKind::Semicolon, "`;`")?;

    Ok(Stmt {
        kind: StmtKind::Return(value),
        span: start_token.span.to(end.span),
    })
}
