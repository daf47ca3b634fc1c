//! Integration tests for the Tally interpreter
//!
//! Drives the public pipeline end to end:
//! - Literal evaluation
//! - Scoping and assignment rules
//! - Indexing and constants
//! - Control flow and functions
//! - Error reporting and tracebacks

use tally::interp::ErrorKind;
use tally::parser::parse;
use tally::{evaluate, Context, Error, Value};

/// Evaluate a program in a fresh context
fn run(source: &str) -> Result<Value, Error> {
    let mut ctx = Context::new("test.tl");
    evaluate(source, "test.tl", &mut ctx)
}

fn run_ok(source: &str) -> Value {
    match run(source) {
        Ok(value) => value,
        Err(err) => panic!("{source:?} failed: {err}"),
    }
}

fn runtime_kind(source: &str) -> ErrorKind {
    match run(source) {
        Err(Error::Runtime(err)) => err.kind,
        other => panic!("{source:?} should fail at runtime, got {other:?}"),
    }
}

// ============================================
// Literals
// ============================================

#[test]
fn test_numeric_literals_are_exact() {
    for text in ["0", "42", "3.5", "0.1", "1_000_000", "123456789.125", "7."] {
        let expected: f64 = text.replace('_', "").parse().unwrap();
        assert_eq!(run_ok(text), Value::Number(expected), "literal {text}");
    }
}

#[test]
fn test_string_literal_escapes() {
    assert_eq!(run_ok(r#""tab\there""#), Value::from("tab\there"));
    assert_eq!(run_ok(r#""\x41é""#), Value::from("Aé"));
}

// ============================================
// Scoping
// ============================================

#[test]
fn test_unicode_identifiers() {
    assert_eq!(run_ok("é = 1; é"), Value::Number(1.0));
    assert_eq!(run_ok("let größe = 2; größe * 3"), Value::Number(6.0));
}

#[test]
fn test_let_then_reassign() {
    assert_eq!(run_ok("let x = 1; x = 2; x"), Value::Number(2.0));
}

#[test]
fn test_name_first_set_in_block_lands_in_root() {
    assert_eq!(run_ok("{ { let fresh = 3; } } fresh"), Value::Number(3.0));
}

#[test]
fn test_inner_let_rebinds_outer() {
    assert_eq!(run_ok("let x = 5; { let x = 10; } x"), Value::Number(10.0));
}

#[test]
fn test_loop_counter_outlives_loop() {
    assert_eq!(run_ok("for (i = 0; i < 3; i++) {} i"), Value::Number(3.0));
}

// ============================================
// Indexing and constants
// ============================================

#[test]
fn test_array_index_out_of_range() {
    let source = "let a = arr(3); a[0] = 1; a[1] = 2; a[2] = 3; a[5]";
    assert_eq!(runtime_kind(source), ErrorKind::IndexOutOfBounds);
}

#[test]
fn test_array_holding_itself_displays() {
    let value = run_ok("a = arr(2, 1); a[1] = a; a");
    assert_eq!(value.to_string(), "[1, [...]]");
}

#[test]
fn test_huge_array_is_rejected() {
    assert_eq!(runtime_kind("arr(100000000000000000000)"), ErrorKind::InvalidArgument);
}

#[test]
fn test_array_writes_are_visible() {
    let source = "let a = arr(3); a[0] = 1; a[1] = 2; a[2] = 3; a[0] + a[1] + a[2]";
    assert_eq!(run_ok(source), Value::Number(6.0));
}

#[test]
fn test_string_index_assignment() {
    assert_eq!(run_ok(r#"let s = "abc"; s[1] = "X"; s"#), Value::from("aXc"));
}

#[test]
fn test_constants_are_protected() {
    assert_eq!(runtime_kind("pi = 4"), ErrorKind::ConstantReassignment);
    assert_eq!(runtime_kind("true = false"), ErrorKind::ConstantReassignment);
    assert_eq!(runtime_kind("sin = 1"), ErrorKind::ConstantReassignment);
}

// ============================================
// Operators and control flow
// ============================================

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let source = "let calls = 0; func side() { calls = calls + 1; true } false && side(); calls";
    assert_eq!(run_ok(source), Value::Number(1.0));
    let source = "let calls = 0; func side() { calls = calls + 1; false } true || side(); calls";
    assert_eq!(run_ok(source), Value::Number(1.0));
}

#[test]
fn test_fizzbuzz_style_program() {
    let source = r#"
        out = "";
        for (i = 1; i <= 15; i++) {
            if (i % 15 == 0) out = out + "F";
            else if (i % 5 == 0) out = out + "B";
            else if (i % 3 == 0) out = out + "f";
            else out = out + ".";
        }
        out
    "#;
    assert_eq!(run_ok(source), Value::from("..f.Bf..fB.f..F"));
}

#[test]
fn test_while_with_break_and_continue() {
    let source = "
        let n = 0; let odd = 0;
        while (n < 100) {
            n++;
            if (n > 9) break;
            if (n % 2 == 0) continue;
            odd = odd + 1;
        }
        odd * 100 + n
    ";
    assert_eq!(run_ok(source), Value::Number(510.0));
}

#[test]
fn test_recursive_function() {
    let source = "func fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } fib(15)";
    assert_eq!(run_ok(source), Value::Number(610.0));
}

#[test]
fn test_builtins_compose() {
    let source = r#"sprintf("{0}/{1}", len("héllo"), max(1, floor(7.8), 3))"#;
    assert_eq!(run_ok(source), Value::from("5/7"));
}

#[test]
fn test_discarded_constructs_do_nothing() {
    let source = "import math; class Point { x = 1; } new Point(1, 2); 9";
    assert_eq!(run_ok(source), Value::Number(9.0));
}

// ============================================
// Errors
// ============================================

#[test]
fn test_syntax_error_aborts_before_running() {
    let mut ctx = Context::new("test.tl");
    let err = evaluate("marker = 1; )", "test.tl", &mut ctx).unwrap_err();
    assert!(matches!(err, Error::Syntax(_)));
    assert!(ctx.get("marker").is_none());
}

#[test]
fn test_unterminated_string_is_syntax_error() {
    assert!(matches!(run(r#"x = "open"#), Err(Error::Syntax(_))));
}

#[test]
fn test_return_outside_function_is_error() {
    assert_eq!(runtime_kind("return 1;"), ErrorKind::UnsupportedOperation);
}

#[test]
fn test_traceback_innermost_first() {
    let source = "func f() {\n  {\n    for (i = 0; i < 1; i++) boom();\n  }\n}\nf();";
    let err = match run(source) {
        Err(Error::Runtime(err)) => err,
        other => panic!("expected runtime error, got {other:?}"),
    };
    let location = err.location.as_ref().expect("error is located");
    let names: Vec<_> = location.trace.iter().map(|frame| frame.name.as_str()).collect();
    assert_eq!(names, vec!["<for-loop>", "<anonymous>", "f", "test.tl"]);

    let traceback = err.traceback();
    let lines: Vec<_> = traceback.lines().collect();
    assert_eq!(lines[0], "Traceback (innermost scope first):");
    assert_eq!(lines[1], "  File test.tl, line 3, in <for-loop>");
    assert_eq!(lines[2], "  File test.tl, line 3, in <anonymous>");
    assert_eq!(lines[3], "  File test.tl, line 2, in f");
    assert_eq!(lines[4], "  File test.tl, line 6, in test.tl");
    assert_eq!(lines[5], "RuntimeError: Function boom is not defined");
}

// ============================================
// Sessions
// ============================================

#[test]
fn test_context_accumulates_across_evaluations() {
    let mut ctx = Context::new("<stdin>");
    evaluate("let count = 0;", "<stdin>", &mut ctx).unwrap();
    evaluate("func tick() { count = count + 1; }", "<stdin>", &mut ctx).unwrap();
    evaluate("tick(); tick();", "<stdin>", &mut ctx).unwrap();
    assert!(evaluate("tick(1)", "<stdin>", &mut ctx).is_err());
    assert_eq!(evaluate("count", "<stdin>", &mut ctx).unwrap(), Value::Number(2.0));
}

#[test]
fn test_comments_do_not_change_tree() {
    let plain = parse("x = 1 + 2; y = x * 3;").unwrap();
    let commented = parse("x = 1 /* one */ + 2; // sum\n y = x *\n 3; /* end */").unwrap();
    assert_eq!(
        tally::ast::print_tree(&plain),
        tally::ast::print_tree(&commented)
    );
}
