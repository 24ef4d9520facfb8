//! Unit tests for the type checker.

use crate::{
    errors::{diagnostics::Severity, errors::DiagnosticKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    pipeline::{CancellationToken, Session},
    resolver::resolver::resolve,
};

use super::{
    type_checker::{type_check, type_check_stmt, TypeChecker},
    typed_ast::{TypedExprKind, TypedProgram, TypedStmtKind},
    types::Type,
};

fn check_source(source: &str) -> (TypedProgram, Session) {
    let session = Session::new();
    let (program, valid) = parse(tokenize(source, &session), &session);
    assert!(valid, "{:?}", session.diagnostics.all());
    let resolution = resolve(&program, &session);
    let typed = type_check(&program, &resolution, &session);
    (typed, session)
}

fn names(session: &Session) -> Vec<&'static str> {
    session
        .diagnostics
        .all()
        .iter()
        .map(|diagnostic| diagnostic.kind.get_error_name())
        .collect()
}

#[test]
fn test_well_typed_program() {
    let (typed, session) = check_source(
        "fn max(a: int, b: int) -> int { if (a > b) { return a; } else { return b; } }\n\
         let m = max(3, 4);\n\
         let flag: bool = m == 4 && !(m < 0) || false;\n\
         while (flag) { flag = false; print(m % 3); }",
    );

    assert!(session.diagnostics.is_empty(), "{:?}", session.diagnostics.all());
    match &typed.body[1].kind {
        TypedStmtKind::VarDecl { ty, value, .. } => {
            assert_eq!(*ty, Type::Int);
            assert_eq!(value.ty, Type::Int);
        }
        other => panic!("expected variable declaration, got {:?}", other),
    }
    assert_eq!(typed.functions().count(), 1);
}

#[test]
fn test_assignment_mismatch_at_assignment_span() {
    let source = "let x = 1; x = true;";
    let (_, session) = check_source(source);

    let diagnostics = session.diagnostics.all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::TypeMismatch {
            expected: "int".to_string(),
            found: "bool".to_string()
        }
    );
    let span = diagnostics[0].span;
    assert_eq!(&source[span.start..span.end], "x = true");
}

#[test]
fn test_annotation_mismatch_at_initializer() {
    let source = "let b: bool = 1 + 2;";
    let (_, session) = check_source(source);

    let diagnostics = session.diagnostics.all();
    assert_eq!(names(&session), vec!["TypeMismatch"]);
    assert_eq!(&source[diagnostics[0].span.start..diagnostics[0].span.end], "1 + 2");
}

#[test]
fn test_invalid_operands() {
    let (_, session) = check_source("let a = 1 + true; let b = !3; let c = true < false;");

    assert_eq!(names(&session), vec!["InvalidOperands", "InvalidOperands", "InvalidOperands"]);
    assert_eq!(
        session.diagnostics.all()[0].message(),
        "operator `+` cannot be applied to `int` and `bool`"
    );
}

#[test]
fn test_error_type_suppresses_cascades() {
    // one undeclared name, nothing else
    let (typed, session) = check_source("let a = missing + 1; let b = a * 2 == 3; if (b) { a = b; }");

    assert_eq!(names(&session), vec!["UndeclaredIdentifier"]);
    match &typed.body[0].kind {
        TypedStmtKind::VarDecl { ty, .. } => assert_eq!(*ty, Type::Error),
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

#[test]
fn test_arity_mismatch_skips_argument_checks() {
    let (_, session) = check_source("fn foo(x: int) {} foo(true, 2);");

    assert_eq!(names(&session), vec!["ArityMismatch"]);
    assert_eq!(
        session.diagnostics.all()[0].kind,
        DiagnosticKind::ArityMismatch {
            name: "foo".to_string(),
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn test_argument_type_mismatch() {
    let source = "fn foo(x: int, y: bool) {} foo(1, 2);";
    let (_, session) = check_source(source);

    let diagnostics = session.diagnostics.all();
    assert_eq!(names(&session), vec!["ArgumentTypeMismatch"]);
    assert_eq!(
        diagnostics[0].message(),
        "argument 2 of `foo`: expected `bool`, found `int`"
    );
    assert_eq!(&source[diagnostics[0].span.start..diagnostics[0].span.end], "2");
}

#[test]
fn test_calling_a_variable() {
    let (_, session) = check_source("let f = 1; f(2);");

    assert_eq!(names(&session), vec!["NotCallable"]);
}

#[test]
fn test_functions_are_not_values() {
    let (_, session) = check_source("fn f() {} let g = f; f = 1;");

    assert_eq!(names(&session), vec!["FunctionAsValue", "NotAssignable"]);
}

#[test]
fn test_unit_initializer() {
    let (_, session) = check_source("fn f() {} let x = f(); let y: int = f();");

    assert_eq!(names(&session), vec!["UnitValue", "TypeMismatch"]);
}

#[test]
fn test_condition_must_be_bool() {
    let (_, session) = check_source("if (1) { } while (0 + 1) { }");

    assert_eq!(names(&session), vec!["TypeMismatch", "TypeMismatch"]);
}

#[test]
fn test_return_types() {
    let (_, session) = check_source(
        "fn a() -> int { return true; }\n\
         fn b() { return 1; }\n\
         fn c() -> bool { return; }",
    );

    assert_eq!(names(&session), vec!["TypeMismatch", "TypeMismatch", "TypeMismatch"]);
}

#[test]
fn test_missing_return() {
    let (_, session) = check_source(
        "fn a(x: int) -> int { if (x > 0) { return 1; } }\n\
         fn b(x: int) -> int { if (x > 0) { return 1; } else { return 2; } }\n\
         fn c(x: int) -> int { while (true) { return 1; } }",
    );

    let diagnostics = session.diagnostics.all();
    assert_eq!(names(&session), vec!["MissingReturn", "MissingReturn"]);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::MissingReturn {
            name: "a".to_string()
        }
    );
    assert_eq!(
        diagnostics[1].kind,
        DiagnosticKind::MissingReturn {
            name: "c".to_string()
        }
    );
}

#[test]
fn test_division_by_literal_zero_warns() {
    let (typed, session) = check_source("let a = 4; let b = a / 0; let c = a % 0;");

    let diagnostics = session.diagnostics.all();
    assert_eq!(names(&session), vec!["DivisionByZero", "DivisionByZero"]);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    assert!(!session.diagnostics.has_errors());
    assert_eq!(typed.body.len(), 3);
}

#[test]
fn test_unreachable_code_warns_once() {
    let (_, session) = check_source("fn f() -> int { return 1; print(2); print(3); }");

    assert_eq!(names(&session), vec!["UnreachableCode"]);
    assert!(!session.diagnostics.has_errors());
}

#[test]
fn test_equality_on_matching_types() {
    let (typed, session) = check_source("let a = true == false; let b = 1 != 2;");

    assert!(session.diagnostics.is_empty());
    for stmt in &typed.body {
        match &stmt.kind {
            TypedStmtKind::VarDecl { value, .. } => {
                assert_eq!(value.ty, Type::Bool);
                assert!(matches!(value.kind, TypedExprKind::Binary { .. }));
            }
            other => panic!("expected variable declaration, got {:?}", other),
        }
    }
}

#[test]
fn test_every_expression_is_typed() {
    let (typed, _) = check_source("let a = 1; let b = (a + 2) * 3 > 4 || a == 0;");

    match &typed.body[1].kind {
        TypedStmtKind::VarDecl { value, .. } => {
            assert_eq!(value.ty, Type::Bool);
            match &value.kind {
                TypedExprKind::Binary { left, right, .. } => {
                    assert_eq!(left.ty, Type::Bool);
                    assert_eq!(right.ty, Type::Bool);
                }
                other => panic!("expected binary, got {:?}", other),
            }
        }
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

#[test]
fn test_type_display() {
    assert_eq!(Type::function(vec![Type::Int, Type::Bool], Type::Unit).to_string(), "fn(int, bool) -> unit");
    assert!(Type::Unknown.is_error());
    assert!(!Type::Unit.is_value());
}

#[test]
fn test_cancelled_before_loop_body() {
    let cancel = CancellationToken::new();
    let session = Session::with_cancellation(cancel.clone());
    let (program, valid) = parse(
        tokenize("let a = 1; while (a) { let b = true + 1; }", &session),
        &session,
    );
    assert!(valid);
    let resolution = resolve(&program, &session);
    assert!(session.diagnostics.is_empty());

    let mut type_checker = TypeChecker::new(&resolution, &session);
    type_check_stmt(&mut type_checker, &program.body[0]);
    cancel.cancel();
    let typed = type_check_stmt(&mut type_checker, &program.body[1]);

    // the condition mismatch is kept, the body is never checked
    assert_eq!(names(&session), vec!["TypeMismatch", "Cancelled"]);
    match typed.kind {
        TypedStmtKind::While { body, .. } => assert!(body.body.is_empty()),
        other => panic!("expected while, got {:?}", other),
    }
}
