//! Parser tests for Tally language features

use crate::ast::{print_tree, BinOp, Expr, Program, UnOp};
use crate::parser::parse;

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse(source).expect("Parse should succeed")
}

/// Helper to render the tree of a program that must parse
fn tree(source: &str) -> String {
    print_tree(&parse_ok(source))
}

/// Helper to get the parser's error message
fn parse_err(source: &str) -> String {
    parse(source).expect_err("Parse should fail").to_string()
}

// ============================================
// Expressions and precedence
// ============================================

#[test]
fn test_parse_number_literal() {
    let prog = parse_ok("42");
    assert_eq!(prog.statements.len(), 1);
    assert_eq!(prog.statements[0].node, Expr::Number("42".into()));
}

#[test]
fn test_multiplicative_binds_tighter() {
    assert_eq!(
        tree("1 + 2 * 3"),
        "BinaryOp(+)\n  Number(1)\n  BinaryOp(*)\n    Number(2)\n    Number(3)\n"
    );
}

#[test]
fn test_additive_is_left_associative() {
    assert_eq!(
        tree("1 - 2 - 3"),
        "BinaryOp(-)\n  BinaryOp(-)\n    Number(1)\n    Number(2)\n  Number(3)\n"
    );
}

#[test]
fn test_bitwise_ops_share_additive_tier() {
    assert_eq!(
        tree("1 | 2 + 3"),
        "BinaryOp(+)\n  BinaryOp(|)\n    Number(1)\n    Number(2)\n  Number(3)\n"
    );
    assert_eq!(
        tree("1 << 2 * 3"),
        "BinaryOp(<<)\n  Number(1)\n  BinaryOp(*)\n    Number(2)\n    Number(3)\n"
    );
}

#[test]
fn test_comparison_below_additive_above_logical() {
    assert_eq!(
        tree("a + 1 > b && c"),
        "BinaryOp(&&)\n  BinaryOp(>)\n    BinaryOp(+)\n      Identifier(a)\n      Number(1)\n    Identifier(b)\n  Identifier(c)\n"
    );
}

#[test]
fn test_tilde_is_infix() {
    let prog = parse_ok("1 ~ 2");
    assert!(matches!(&prog.statements[0].node, Expr::Binary { op: BinOp::BitNot, .. }));
}

#[test]
fn test_parenthesised_expression() {
    assert_eq!(
        tree("(1 + 2) * 3"),
        "BinaryOp(*)\n  BinaryOp(+)\n    Number(1)\n    Number(2)\n  Number(3)\n"
    );
}

#[test]
fn test_unary_prefix_nests() {
    let prog = parse_ok("- -x");
    let Expr::Unary { op: UnOp::Neg, operand } = &prog.statements[0].node else {
        panic!("Expected unary minus");
    };
    assert!(matches!(&operand.node, Expr::Unary { op: UnOp::Neg, .. }));
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(
        tree("a = b = 1"),
        "Assignment\n  Identifier(a)\n  Assignment\n    Identifier(b)\n    Number(1)\n"
    );
}

#[test]
fn test_postfix_increment_desugars() {
    assert_eq!(
        tree("i++"),
        "PostfixAssignment\n  Identifier(i)\n  UnaryOp(++)\n    Identifier(i)\n"
    );
    assert_eq!(
        tree("i--"),
        "PostfixAssignment\n  Identifier(i)\n  UnaryOp(--)\n    Identifier(i)\n"
    );
}

#[test]
fn test_calls_chain() {
    assert_eq!(
        tree("f(1, 2)(3)"),
        "Call\n  Call\n    Identifier(f)\n      Number(1)\n      Number(2)\n    Number(3)\n"
    );
}

#[test]
fn test_index_chains_with_calls() {
    assert_eq!(
        tree("f()[0][1]"),
        "Index\n  Index\n    Call\n      Identifier(f)\n    Number(0)\n  Number(1)\n"
    );
}

#[test]
fn test_string_literal_keeps_escapes_resolved() {
    let prog = parse_ok(r#""a\nb""#);
    assert_eq!(prog.statements[0].node, Expr::Str("a\nb".to_string().into()));
}

// ============================================
// Statements
// ============================================

#[test]
fn test_let_is_assignment() {
    assert_eq!(tree("let x = 1;"), "Assignment\n  Identifier(x)\n  Number(1)\n");
}

#[test]
fn test_semicolon_optional_before_brace_and_eof() {
    assert_eq!(parse_ok("{ x = 1; x }").statements.len(), 1);
    assert_eq!(parse_ok("x = 1; x").statements.len(), 2);
}

#[test]
fn test_missing_semicolon_between_statements_fails() {
    assert!(parse_err("x = 1 y = 2").contains("unexpected identifier 'y'"));
}

#[test]
fn test_nested_blocks() {
    assert_eq!(
        tree("{ { 1 } 2 }"),
        "Block\n  Block\n    Number(1)\n  Number(2)\n"
    );
}

#[test]
fn test_if_else_if_else() {
    assert_eq!(
        tree("if (a) 1; else if (b) { 2 } else 3;"),
        "If\n  case\n    Identifier(a)\n    Number(1)\n  case\n    Identifier(b)\n    Block\n      Number(2)\n  else\n    Number(3)\n"
    );
}

#[test]
fn test_if_without_else() {
    let prog = parse_ok("if (x) { y }");
    let Expr::If { cases, else_body } = &prog.statements[0].node else {
        panic!("Expected If");
    };
    assert_eq!(cases.len(), 1);
    assert!(else_body.is_none());
}

#[test]
fn test_for_loop() {
    assert_eq!(
        tree("for (i = 0; i < 3; i++) x = x + i;"),
        "For\n  Assignment\n    Identifier(i)\n    Number(0)\n  BinaryOp(<)\n    Identifier(i)\n    Number(3)\n  PostfixAssignment\n    Identifier(i)\n    UnaryOp(++)\n      Identifier(i)\n  Assignment\n    Identifier(x)\n    BinaryOp(+)\n      Identifier(x)\n      Identifier(i)\n"
    );
}

#[test]
fn test_for_loop_accepts_let_initialiser() {
    let prog = parse_ok("for (let i = 0; i < 3; i++) {}");
    assert!(matches!(&prog.statements[0].node, Expr::For { .. }));
}

#[test]
fn test_while_loop() {
    assert_eq!(
        tree("while (x < 3) { x++ }"),
        "While\n  BinaryOp(<)\n    Identifier(x)\n    Number(3)\n  Block\n    PostfixAssignment\n      Identifier(x)\n      UnaryOp(++)\n        Identifier(x)\n"
    );
}

#[test]
fn test_func_definition() {
    let prog = parse_ok("func add(a, b) { return a + b; }");
    let Expr::FuncDef(def) = &prog.statements[0].node else {
        panic!("Expected FuncDef");
    };
    assert_eq!(def.name, "add");
    assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(def.body.len(), 1);
    assert!(matches!(&def.body[0].node, Expr::Return(Some(_))));
}

#[test]
fn test_func_with_single_statement_body() {
    let prog = parse_ok("func one() 1;");
    let Expr::FuncDef(def) = &prog.statements[0].node else {
        panic!("Expected FuncDef");
    };
    assert!(def.params.is_empty());
    assert_eq!(def.body.len(), 1);
}

#[test]
fn test_bare_return_break_continue() {
    assert_eq!(tree("{ return; break; continue }"), "Block\n  Return\n  Break\n  Continue\n");
}

#[test]
fn test_discarded_constructs_build_nothing() {
    let prog = parse_ok("import math; class Point { x = 1; } new Point(1, 2); 7");
    assert_eq!(prog.statements.len(), 1);
    assert_eq!(prog.statements[0].node, Expr::Number("7".into()));
}

#[test]
fn test_keywords_usable_as_names_outside_statement_start() {
    assert_eq!(tree("x = new"), "Assignment\n  Identifier(x)\n  Identifier(new)\n");
}

// ============================================
// Errors
// ============================================

#[test]
fn test_unclosed_paren_fails() {
    assert!(parse_err("(1 + 2").contains("expected ')'"));
}

#[test]
fn test_unclosed_block_fails() {
    assert!(parse_err("{ x = 1;").contains("expected '}'"));
}

#[test]
fn test_dangling_operator_fails() {
    assert!(parse_err("1 +").contains("unexpected end of input"));
}

#[test]
fn test_lone_bang_is_a_parse_error() {
    let err = parse("!x").unwrap_err();
    assert_eq!(err.message(), "unexpected '!'");
    assert_eq!(err.span().start.column, 0);
    let err = parse("y = !x").unwrap_err();
    assert_eq!(err.message(), "unexpected '!'");
    assert_eq!(err.span().start.column, 4);
}

#[test]
fn test_lexer_errors_surface_through_parse() {
    assert!(parse_err("x = \"open").starts_with("Lexer error"));
}

#[test]
fn test_error_carries_position() {
    let err = parse("x = 1;\ny = )").unwrap_err();
    assert_eq!(err.span().start.line, 1);
    assert_eq!(err.span().start.column, 4);
}

#[test]
fn test_spans_cover_whole_statement() {
    let prog = parse_ok("  foo(1, 2)");
    let span = prog.statements[0].span;
    assert_eq!(span.start.offset, 2);
    assert_eq!(span.end.offset, 11);
}
