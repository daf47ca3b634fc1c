//! Indented, position-free dump of a syntax tree

use super::{Expr, Node, Program};
use std::fmt::Write;

/// Render a program as an indented tree, one node per line.
///
/// Positions are left out, so two programs that differ only in layout or
/// comments print identically.
pub fn print_tree(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.statements {
        write_node(&mut out, stmt, 0);
    }
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let pad = "  ".repeat(depth);
    // Writing into a String cannot fail.
    let _ = match &node.node {
        Expr::Number(text) => writeln!(out, "{pad}Number({text})"),
        Expr::Str(text) => writeln!(out, "{pad}String({:?})", text.borrow()),
        Expr::Ident(name) => writeln!(out, "{pad}Identifier({name})"),
        Expr::Binary { left, op, right, .. } => {
            let _ = writeln!(out, "{pad}BinaryOp({op})");
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
            Ok(())
        }
        Expr::Unary { op, operand } => {
            let _ = writeln!(out, "{pad}UnaryOp({op})");
            write_node(out, operand, depth + 1);
            Ok(())
        }
        Expr::Assign { target, value, postfix } => {
            let label = if *postfix { "PostfixAssignment" } else { "Assignment" };
            let _ = writeln!(out, "{pad}{label}");
            write_node(out, target, depth + 1);
            write_node(out, value, depth + 1);
            Ok(())
        }
        Expr::Call { callee, args } => {
            let _ = writeln!(out, "{pad}Call");
            write_node(out, callee, depth + 1);
            for arg in args {
                write_node(out, arg, depth + 2);
            }
            Ok(())
        }
        Expr::Block(stmts) => {
            let _ = writeln!(out, "{pad}Block");
            for stmt in stmts {
                write_node(out, stmt, depth + 1);
            }
            Ok(())
        }
        Expr::If { cases, else_body } => {
            let _ = writeln!(out, "{pad}If");
            for case in cases {
                let _ = writeln!(out, "{pad}  case");
                write_node(out, &case.condition, depth + 2);
                write_node(out, &case.body, depth + 2);
            }
            if let Some(body) = else_body {
                let _ = writeln!(out, "{pad}  else");
                write_node(out, body, depth + 2);
            }
            Ok(())
        }
        Expr::For { init, cond, step, body } => {
            let _ = writeln!(out, "{pad}For");
            for part in [init, cond, step, body] {
                write_node(out, part, depth + 1);
            }
            Ok(())
        }
        Expr::While { cond, body } => {
            let _ = writeln!(out, "{pad}While");
            write_node(out, cond, depth + 1);
            write_node(out, body, depth + 1);
            Ok(())
        }
        Expr::Index { target, index } => {
            let _ = writeln!(out, "{pad}Index");
            write_node(out, target, depth + 1);
            write_node(out, index, depth + 1);
            Ok(())
        }
        Expr::FuncDef(def) => {
            let _ = writeln!(out, "{pad}Function {}({})", def.name, def.params.join(", "));
            for stmt in &def.body {
                write_node(out, stmt, depth + 1);
            }
            Ok(())
        }
        Expr::Return(value) => {
            let _ = writeln!(out, "{pad}Return");
            if let Some(value) = value {
                write_node(out, value, depth + 1);
            }
            Ok(())
        }
        Expr::Break => writeln!(out, "{pad}Break"),
        Expr::Continue => writeln!(out, "{pad}Continue"),
    };
}
