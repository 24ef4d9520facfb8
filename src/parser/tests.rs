//! Unit tests for the parser module.
//!
//! - Valid programs and operator precedence
//! - Error recovery and diagnostics
//! - Unterminated constructs
//! - Printer round trip

use std::collections::HashSet;

use crate::{
    ast::{
        ast::{walk_expr, walk_stmt, stmt_exprs, BinaryOp},
        expressions::{Expr, ExprKind, Literal},
        printer::to_source,
        statements::{Block, Program, Stmt, StmtKind},
        types::TypeName,
    },
    errors::errors::DiagnosticKind,
    lexer::lexer::tokenize,
    pipeline::Session,
};

use super::parser::parse;

fn parse_source(source: &str) -> (Program, bool, Session) {
    let session = Session::new();
    let (program, valid) = parse(tokenize(source, &session), &session);
    (program, valid, session)
}

fn canonical(source: &str) -> String {
    let (program, valid, session) = parse_source(source);
    assert!(valid, "{:?}", session.diagnostics.all());
    to_source(&program)
}

fn kinds(session: &Session) -> Vec<&'static str> {
    session
        .diagnostics
        .all()
        .iter()
        .map(|diagnostic| diagnostic.kind.get_error_name())
        .collect()
}

/// Structure of a tree with node ids and spans left out, so two parses of
/// equivalent text compare equal.
fn expr_shape(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(literal) => format!("{:?}", literal),
        ExprKind::Identifier(name) => format!("Id({})", name),
        ExprKind::Binary { op, left, right } => {
            format!("Bin({:?}, {}, {})", op, expr_shape(left), expr_shape(right))
        }
        ExprKind::Unary { op, operand } => format!("Un({:?}, {})", op, expr_shape(operand)),
        ExprKind::Call {
            callee, arguments, ..
        } => {
            let arguments: Vec<_> = arguments.iter().map(expr_shape).collect();
            format!("Call({}, [{}])", callee, arguments.join(", "))
        }
        ExprKind::Assignment { target, value, .. } => {
            format!("Assign({}, {})", target, expr_shape(value))
        }
    }
}

fn block_shape(block: &Block) -> String {
    let body: Vec<_> = block.iter().map(stmt_shape).collect();
    format!("{{{}}}", body.join("; "))
}

fn stmt_shape(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::VarDecl {
            name,
            declared_type,
            value,
            ..
        } => format!(
            "Let({}, {:?}, {})",
            name,
            declared_type.map(|ty| ty.name),
            expr_shape(value)
        ),
        StmtKind::If {
            condition,
            then_block,
            else_branch,
        } => format!(
            "If({}, {}, {:?})",
            expr_shape(condition),
            block_shape(then_block),
            else_branch.as_ref().map(|stmt| stmt_shape(stmt))
        ),
        StmtKind::While { condition, body } => {
            format!("While({}, {})", expr_shape(condition), block_shape(body))
        }
        StmtKind::Block(block) => block_shape(block),
        StmtKind::Expression(expr) => format!("Expr({})", expr_shape(expr)),
        StmtKind::FunctionDecl(function) => {
            let params: Vec<_> = function
                .params
                .iter()
                .map(|param| format!("{}: {}", param.name, param.ty.name))
                .collect();
            format!(
                "Fn({}, [{}], {:?}, {})",
                function.name,
                params.join(", "),
                function.return_type.map(|ty| ty.name),
                block_shape(&function.body)
            )
        }
        StmtKind::Return(value) => format!("Return({:?})", value.as_ref().map(expr_shape)),
        StmtKind::Error => "Error".to_string(),
    }
}

fn program_shape(program: &Program) -> Vec<String> {
    program.iter().map(stmt_shape).collect()
}

const VALID_PROGRAMS: &[&str] = &[
    "",
    "let a = 2 + 3;",
    "let a = 2 + 3; if (a == 5) { a = 0; } while (a != 0) { a = a - 1; }",
    "let b: bool = true && !false;",
    "fn add(x: int, y: int) -> int { return x + y; } print(add(1, 2));",
    "fn noop() {} noop();",
    "fn f() { return; }",
    "{ { let x = 1; } }",
    "if (true) { } else if (false) { } else { }",
    "let x = -(1 + 2) * 3 % 4 / 5;",
    "let c = 1 < 2 || 2 <= 3 && 4 > 3 == (5 >= 5);",
];

#[test]
fn test_valid_programs_have_no_diagnostics() {
    for source in VALID_PROGRAMS {
        let (_, valid, session) = parse_source(source);
        assert!(valid, "{}: {:?}", source, session.diagnostics.all());
        assert!(session.diagnostics.is_empty(), "{}", source);
    }
}

#[test]
fn test_parse_var_decl() {
    let (program, _, _) = parse_source("let x: int = 42;");

    assert_eq!(program.body.len(), 1);
    match &program.body[0].kind {
        StmtKind::VarDecl {
            name,
            declared_type,
            value,
            ..
        } => {
            assert_eq!(name, "x");
            assert_eq!(declared_type.map(|ty| ty.name), Some(TypeName::Int));
            assert_eq!(value.as_literal(), Some(Literal::Int(42)));
        }
        other => panic!("expected variable declaration, got {:?}", other),
    }
    assert_eq!(program.body[0].span.start, 0);
    assert_eq!(program.body[0].span.end, 16);
}

#[test]
fn test_multiplicative_binds_tighter_than_additive() {
    assert_eq!(canonical("1 + 2 * 3;"), "(1 + (2 * 3));\n");
    assert_eq!(canonical("1 * 2 + 3;"), "((1 * 2) + 3);\n");
}

#[test]
fn test_arithmetic_is_left_associative() {
    assert_eq!(canonical("a - b - c;"), "((a - b) - c);\n");
    assert_eq!(canonical("a / b % c;"), "((a / b) % c);\n");
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(canonical("a = b = 1;"), "(a = (b = 1));\n");
}

#[test]
fn test_logical_and_comparison_precedence() {
    assert_eq!(canonical("a || b && c == d;"), "(a || (b && (c == d)));\n");
    assert_eq!(canonical("a < b == c > d;"), "((a < b) == (c > d));\n");
    assert_eq!(canonical("a + 1 < b * 2;"), "((a + 1) < (b * 2));\n");
}

#[test]
fn test_unary_operators() {
    assert_eq!(canonical("-a * b;"), "((-a) * b);\n");
    assert_eq!(canonical("!!x;"), "(!(!x));\n");
    assert_eq!(canonical("-(a + b);"), "(-(a + b));\n");
}

#[test]
fn test_parse_call_arguments() {
    let (program, valid, _) = parse_source("foo(1, bar(2), x + 1);");

    assert!(valid);
    match &program.body[0].kind {
        StmtKind::Expression(expr) => match &expr.kind {
            ExprKind::Call {
                callee, arguments, ..
            } => {
                assert_eq!(callee, "foo");
                assert_eq!(arguments.len(), 3);
                assert!(matches!(&arguments[1].kind, ExprKind::Call { callee, .. } if callee == "bar"));
                assert!(matches!(
                    arguments[2].kind,
                    ExprKind::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_parse_else_if_chain() {
    let (program, valid, _) = parse_source("if (a) { } else if (b) { } else { x = 1; }");

    assert!(valid);
    match &program.body[0].kind {
        StmtKind::If {
            else_branch: Some(else_branch),
            ..
        } => match &else_branch.kind {
            StmtKind::If {
                else_branch: Some(last),
                ..
            } => assert!(matches!(&last.kind, StmtKind::Block(block) if block.body.len() == 1)),
            other => panic!("expected else-if, got {:?}", other),
        },
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let (program, valid, _) = parse_source("fn max(a: int, b: int) -> int { if (a > b) { return a; } return b; }");

    assert!(valid);
    let function = program.functions().next().expect("function");
    assert_eq!(function.name, "max");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[1].name, "b");
    assert_eq!(function.return_type.map(|ty| ty.name), Some(TypeName::Int));
    assert_eq!(function.body.body.len(), 2);
}

#[test]
fn test_unterminated_block_reports_once_at_open_brace() {
    let (program, valid, session) = parse_source("let y = 0;\n{ let x = 1;");

    assert!(!valid);
    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::UnterminatedConstruct {
            construct: "block".to_string()
        }
    );
    assert_eq!(diagnostics[0].span.start, 11);
    assert_eq!(diagnostics[0].span.line, 2);
    assert_eq!(diagnostics[0].span.column, 1);
    assert!(matches!(program.body[1].kind, StmtKind::Error));
}

#[test]
fn test_nested_unterminated_blocks_report_once() {
    // reported at the innermost unclosed `{`
    for (source, open) in [
        ("if (x) { while (y) { x = 1;", 19),
        ("fn f() { { {", 11),
        ("while (true) {", 13),
    ] {
        let (_, valid, session) = parse_source(source);

        assert!(!valid, "{}", source);
        let unterminated: Vec<_> = session
            .diagnostics
            .all()
            .into_iter()
            .filter(|diagnostic| diagnostic.kind.get_error_name() == "UnterminatedConstruct")
            .collect();
        assert_eq!(unterminated.len(), 1, "{}", source);
        assert_eq!(unterminated[0].span.start, open, "{}", source);
        assert_eq!(&source[open..open + 1], "{");
    }
}

#[test]
fn test_unterminated_argument_list() {
    let (_, valid, session) = parse_source("foo(1, 2");

    assert!(!valid);
    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::UnterminatedConstruct {
            construct: "argument list".to_string()
        }
    );
    assert_eq!(diagnostics[0].span.start, 3);
}

#[test]
fn test_recovery_reports_independent_errors() {
    let (program, valid, session) = parse_source("let = 1;\nlet y = ;\nlet z = 3;");

    assert!(!valid);
    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].message(), "expected identifier, found `=`");
    assert_eq!(diagnostics[1].message(), "expected expression, found `;`");
    assert_eq!(diagnostics[1].span.line, 2);

    assert_eq!(program.body.len(), 3);
    assert!(matches!(program.body[0].kind, StmtKind::Error));
    assert!(matches!(program.body[1].kind, StmtKind::Error));
    assert!(matches!(&program.body[2].kind, StmtKind::VarDecl { name, .. } if name == "z"));
}

#[test]
fn test_recovery_skips_broken_block_as_a_whole() {
    let (program, _, session) = parse_source("if x { a = 1; } let b = 2;");

    assert_eq!(kinds(&session), vec!["UnexpectedToken"]);
    assert!(matches!(&program.body.last().map(|stmt| &stmt.kind), Some(StmtKind::VarDecl { name, .. }) if name == "b"));
}

#[test]
fn test_recovery_inside_block() {
    let (program, _, session) = parse_source("{ let a = ; a = 2; }");

    assert_eq!(kinds(&session), vec!["UnexpectedToken"]);
    match &program.body[0].kind {
        StmtKind::Block(block) => {
            assert_eq!(block.body.len(), 2);
            assert!(matches!(block.body[0].kind, StmtKind::Error));
            assert!(matches!(block.body[1].kind, StmtKind::Expression(_)));
        }
        other => panic!("expected block, got {:?}", other),
    }
}

#[test]
fn test_stray_closing_brace_makes_progress() {
    let (program, valid, session) = parse_source("} let a = 1;");

    assert!(!valid);
    assert_eq!(kinds(&session), vec!["UnexpectedToken"]);
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_invalid_assignment_target() {
    let (_, valid, session) = parse_source("1 = 2;");

    assert!(!valid);
    assert_eq!(kinds(&session), vec!["InvalidAssignmentTarget"]);
}

#[test]
fn test_nested_function_is_rejected() {
    let (program, valid, session) = parse_source("fn outer() { fn inner() {} }");

    assert!(!valid);
    assert_eq!(kinds(&session), vec!["NestedFunction"]);
    assert_eq!(program.functions().count(), 1);
}

#[test]
fn test_illegal_character_has_no_follow_up_syntax_error() {
    let (program, valid, session) = parse_source("let a = #;\nlet b = 1;");

    assert!(!valid);
    assert_eq!(kinds(&session), vec!["IllegalCharacter"]);
    assert!(matches!(program.body[0].kind, StmtKind::Error));
    assert!(matches!(&program.body[1].kind, StmtKind::VarDecl { name, .. } if name == "b"));
}

#[test]
fn test_missing_semicolon() {
    let (_, valid, session) = parse_source("let x = 1 let y = 2;");

    assert!(!valid);
    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "expected `;`, found `let`");
}

#[test]
fn test_error_at_end_of_input() {
    let (_, valid, session) = parse_source("let x =");

    assert!(!valid);
    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "expected expression, found `end of input`");
}

#[test]
fn test_node_ids_are_unique() {
    let (program, _, _) = parse_source(
        "fn f(a: int) -> int { return a * 2; } let x = f(1) + f(2); if (x > 2) { x = 0; }",
    );

    let mut ids = HashSet::new();
    for stmt in program.iter() {
        walk_stmt(stmt, &mut |stmt| {
            for expr in stmt_exprs(stmt) {
                walk_expr(expr, &mut |expr| {
                    assert!(ids.insert(expr.id), "duplicate id {:?}", expr.id);
                });
            }
        });
    }
    assert!(ids.len() > 10);
}

#[test]
fn test_round_trip_is_stable() {
    let source = "fn fib(n: int) -> int {\n\
                  if (n < 2) { return n; } else { return fib(n - 1) + fib(n - 2); }\n\
                  }\n\
                  let i = 0;\n\
                  while (i < 10 && !(i == 7)) { print(fib(i)); i = i + 1; }\n\
                  { let shadow: bool = i >= 10 || false; }";

    let printed = canonical(source);
    let reprinted = canonical(&printed);
    assert_eq!(printed, reprinted);

    for source in VALID_PROGRAMS {
        let printed = canonical(source);
        assert_eq!(printed, canonical(&printed), "{}", source);
    }
}

#[test]
fn test_reparsed_tree_matches_original() {
    let mut sources = VALID_PROGRAMS.to_vec();
    sources.push(
        "fn fib(n: int) -> int { if (n < 2) { return n; } else { return fib(n - 1) + fib(n - 2); } }\n\
         let i = 0; while (i < 10 && !(i == 7)) { print(fib(i)); i = i + 1; }\n\
         if (i > 3) { i = 1; } else if (i < 0) { i = -i; } else { { let s: bool = i >= 10 || false; } }",
    );

    for source in sources {
        let (original, valid, _) = parse_source(source);
        assert!(valid, "{}", source);

        let printed = to_source(&original);
        let (reparsed, valid, session) = parse_source(&printed);
        assert!(valid, "{}: {:?}", printed, session.diagnostics.all());

        assert_eq!(program_shape(&original), program_shape(&reparsed), "{}", source);
    }
}

#[test]
fn test_shape_sees_else_branch() {
    let (with_else, _, _) = parse_source("if (true) { } else { let a = 1; }");
    let (without_else, _, _) = parse_source("if (true) { }");

    assert_ne!(program_shape(&with_else), program_shape(&without_else));
}
