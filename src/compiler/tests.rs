use std::collections::HashSet;

use crate::{
    errors::errors::InternalError,
    lexer::lexer::tokenize,
    parser::parser::parse,
    pipeline::Session,
    resolver::resolver::resolve,
    type_checker::type_checker::type_check,
};

use super::{
    compiler::{generate, CodegenOptions},
    expr::fold_binary,
    ir::{Instr, IrProgram},
    vm::{run, Vm, VmError},
};

fn lower_with(source: &str, options: CodegenOptions) -> IrProgram {
    let session = Session::new();
    let (program, valid) = parse(tokenize(source, &session), &session);
    assert!(valid, "{:?}", session.diagnostics.all());
    let resolution = resolve(&program, &session);
    let typed = type_check(&program, &resolution, &session);
    assert!(!session.diagnostics.has_errors(), "{:?}", session.diagnostics.all());
    generate(&typed, &options).expect("well-typed program lowers")
}

fn lower(source: &str) -> IrProgram {
    lower_with(source, CodegenOptions::default())
}

fn lower_unchecked(source: &str) -> Result<IrProgram, InternalError> {
    let session = Session::new();
    let (program, _) = parse(tokenize(source, &session), &session);
    let resolution = resolve(&program, &session);
    let typed = type_check(&program, &resolution, &session);
    generate(&typed, &CodegenOptions::default())
}

#[test]
fn test_folded_declaration() {
    let ir = lower("let x = 3 + 4; let y = 1 + 2 * 3;");

    // only literal-literal operations fold
    assert_eq!(
        ir.to_string(),
        "fn $entry():\n  store @x, 7\n  t0 = add 1, 6\n  store @y, t0\n  return\n"
    );
}

#[test]
fn test_folding_disabled() {
    let ir = lower_with(
        "let x = 1 + 2; print(x);",
        CodegenOptions {
            fold_constants: false,
        },
    );

    assert_eq!(
        ir.to_string(),
        "fn $entry():\n  t0 = add 1, 2\n  store @x, t0\n  t1 = load @x\n  call print(t1)\n  return\n"
    );
}

#[test]
fn test_undefined_operations_are_not_folded() {
    let ir = lower("print(1 / 0); print(9223372036854775807 + 1);");
    let text = ir.to_string();

    assert!(text.contains("t0 = div 1, 0"), "{}", text);
    assert!(text.contains("t1 = add 9223372036854775807, 1"), "{}", text);
}

#[test]
fn test_fold_binary() {
    use crate::ast::{ast::BinaryOp, expressions::Literal};

    assert_eq!(fold_binary(BinaryOp::Rem, Literal::Int(7), Literal::Int(3)), Some(1));
    assert_eq!(fold_binary(BinaryOp::Lt, Literal::Int(1), Literal::Int(2)), Some(1));
    assert_eq!(fold_binary(BinaryOp::Or, Literal::Bool(false), Literal::Bool(true)), Some(1));
    assert_eq!(fold_binary(BinaryOp::Div, Literal::Int(1), Literal::Int(0)), None);
    assert_eq!(fold_binary(BinaryOp::Div, Literal::Int(i64::MIN), Literal::Int(-1)), None);
}

#[test]
fn test_if_else_lowering() {
    let ir = lower("let x = 1; if (x > 0) { x = 2; } else { x = 3; }");

    let expected = "fn $entry():\n  store @x, 1\nif.cond.0:\n  t0 = load @x\n  t1 = gt t0, 0\n  branch t1, if.then.0, if.else.0\nif.then.0:\n  store @x, 2\n  jump if.end.0\nif.else.0:\n  store @x, 3\n  jump if.end.0\nif.end.0:\n  return\n";
    assert_eq!(ir.to_string(), expected);
}

#[test]
fn test_label_order_follows_source() {
    let ir = lower("let i = 0; while (i < 3) { if (i == 1) { print(i); } i = i + 1; }");
    let entry = ir.entry().expect("entry");

    assert_eq!(
        entry.labels().collect::<Vec<_>>(),
        vec![
            "while.cond.0",
            "while.body.0",
            "if.cond.1",
            "if.then.1",
            "if.end.1",
            "while.end.0",
        ]
    );
}

#[test]
fn test_function_lowering() {
    let ir = lower("fn f(a: int) { let b = a; }");

    assert_eq!(
        ir.to_string(),
        "fn $entry():\n  return\n\nfn f(%a.1):\n  t0 = load %a.1\n  store %b.1, t0\n  return\n"
    );
    assert_eq!(ir.functions.len(), 2);
}

#[test]
fn test_labels_and_temps_restart_per_function() {
    let ir = lower(
        "fn f(n: int) -> int { if (n > 0) { return 1; } return 0; } \
         fn g(n: int) -> int { if (n > 0) { return 2; } return 0; }",
    );

    let f = ir.function("f").expect("f");
    let g = ir.function("g").expect("g");
    assert_eq!(f.labels().collect::<Vec<_>>(), g.labels().collect::<Vec<_>>());
    assert_eq!(f.temp_count, g.temp_count);
    assert!(matches!(f.instrs.last(), Some(Instr::Return(Some(_)))));
}

#[test]
fn test_temporaries_are_single_assignment() {
    let ir = lower(
        "fn fib(n: int) -> int { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } \
         let a = 1; let b = a > 0 && a < 10 || !(a == 3); while (b) { b = false; print(fib(a)); }",
    );

    for function in &ir.functions {
        let mut seen = HashSet::new();
        for dest in function.instrs.iter().filter_map(Instr::dest) {
            assert!(seen.insert(dest), "t{} written twice in {}", dest, function.name);
            assert!(dest < function.temp_count);
        }
    }
}

#[test]
fn test_short_circuit_lowering() {
    let ir = lower("let a = true; let b = a && false;");
    let entry = ir.entry().expect("entry");

    assert_eq!(entry.labels().collect::<Vec<_>>(), vec!["and.rhs.0", "and.end.0"]);
    assert!(ir.to_string().contains("  branch t0, and.rhs.0, and.end.0\n"));
}

#[test]
fn test_short_circuit_slot_is_not_a_user_local() {
    // `and` is declared in scope 1 and the `&&` takes label id 1
    let ir = lower(
        "fn f() -> int { if (true) { } let and = 5; let c = true; let x = c && c; return and; } \
         print(f());",
    );
    let text = ir.function("f").expect("f").to_string();

    assert!(text.contains("  store %and.1, 5\n"), "{}", text);
    assert!(text.contains("  store %$and.1, t0\n"), "{}", text);
    assert_eq!(run(&ir), Ok(vec![5]));
}

#[test]
fn test_generation_is_deterministic() {
    let source = "fn sq(x: int) -> int { return x * x; } let i = 0; \
                  while (i < 4) { if (i % 2 == 0 || i == 3) { print(sq(i)); } i = i + 1; }";

    assert_eq!(lower(source).to_string(), lower(source).to_string());
    assert_eq!(lower(source), lower(source));
}

#[test]
fn test_error_nodes_never_reach_codegen() {
    assert!(matches!(
        lower_unchecked("let a = ;"),
        Err(InternalError::ErrorNode { .. })
    ));
    assert!(matches!(
        lower_unchecked("let a = b + 1;"),
        Err(InternalError::ErrorType { .. })
    ));
}

#[test]
fn test_run_recursion() {
    let ir = lower(
        "fn fib(n: int) -> int { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } \
         print(fib(10));",
    );

    assert_eq!(run(&ir), Ok(vec![55]));
}

#[test]
fn test_run_loop_and_shadowing() {
    let ir = lower(
        "let x = 1; { let x = 2; print(x); } print(x); \
         let i = 0; let sum = 0; while (i <= 4) { sum = sum + i; i = i + 1; } print(sum);",
    );

    assert_eq!(run(&ir), Ok(vec![2, 1, 10]));
}

#[test]
fn test_run_globals_visible_in_functions() {
    let ir = lower("let g = 5; fn get() -> int { return g; } fn set() { g = 7; } print(get()); set(); print(g);");

    assert_eq!(run(&ir), Ok(vec![5, 7]));
}

#[test]
fn test_run_global_read_before_its_declaration_runs() {
    // `f` is hoisted, `g` is stored only after `f()` returns
    let ir = lower("let g = f(); fn f() -> int { return g; }");

    assert_eq!(
        run(&ir),
        Err(VmError::UninitializedPlace {
            place: "@g".to_string()
        })
    );
}

#[test]
fn test_run_short_circuit_skips_right_operand() {
    let ir = lower(
        "fn side() -> bool { print(99); return true; } \
         let r = false && side(); if (r) { print(1); } else { print(0); } \
         let s = true || side(); if (s) { print(1); } else { print(0); } \
         let t = true && side(); if (t) { print(1); }",
    );

    assert_eq!(run(&ir), Ok(vec![0, 1, 99, 1]));
}

#[test]
fn test_run_checked_arithmetic() {
    let zero = lower("let a = 0; print(10 / a);");
    assert_eq!(run(&zero), Err(VmError::DivisionByZero));

    let overflow = lower("let a = 9223372036854775807; print(a + 1);");
    assert_eq!(run(&overflow), Err(VmError::Overflow));

    let negation = lower("let a = 5; print(-a % 3);");
    assert_eq!(run(&negation), Ok(vec![-2]));
}

#[test]
fn test_run_limits() {
    let spin = lower("while (true) { }");
    assert_eq!(
        Vm::new(&spin).with_step_limit(1_000).run(),
        Err(VmError::StepLimit { limit: 1_000 })
    );

    let deep = lower("fn f(n: int) -> int { return f(n + 1); } print(f(0));");
    assert_eq!(run(&deep), Err(VmError::StackOverflow { limit: 512 }));
}

#[test]
fn test_run_without_entry() {
    assert_eq!(run(&IrProgram::default()), Err(VmError::MissingEntry));
}
