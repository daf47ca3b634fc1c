//! Expression AST nodes

use super::{Span, Spanned};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A node with its source span
pub type Node = Spanned<Expr>;

/// Expression
///
/// Statements are expressions too: every node evaluates to a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Number literal, kept as its decimal text (underscores removed)
    Number(String),

    /// String literal.
    ///
    /// The text sits in a cell because index-assignment on a literal
    /// (`"abc"[0] = "x"`) rewrites the literal itself.
    Str(RefCell<String>),

    /// Variable reference
    Ident(String),

    /// Binary operation
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },

    /// Prefix `+`/`-`, or the `++`/`--` half of a postfix increment
    Unary { op: UnOp, operand: Box<Node> },

    /// `target = value`.
    ///
    /// `postfix` marks the desugared `x++`/`x--` form, which yields the
    /// value the target held before the store.
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        postfix: bool,
    },

    /// Function call: callee(args...)
    Call { callee: Box<Node>, args: Vec<Node> },

    /// Brace block, evaluated in its own scope
    Block(Vec<Node>),

    /// if / else if / else chain, first matching case wins
    If {
        cases: Vec<IfCase>,
        else_body: Option<Box<Node>>,
    },

    /// C-style for loop
    For {
        init: Box<Node>,
        cond: Box<Node>,
        step: Box<Node>,
        body: Box<Node>,
    },

    /// while loop
    While { cond: Box<Node>, body: Box<Node> },

    /// container[index]
    Index { target: Box<Node>, index: Box<Node> },

    /// func name(params) { body }
    FuncDef(Rc<FuncDef>),

    /// return [value]
    Return(Option<Box<Node>>),

    Break,
    Continue,
}

/// One `if (cond) body` arm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfCase {
    pub condition: Node,
    pub body: Node,
}

/// Source-defined function.
///
/// Shared behind an `Rc` so the callable value can outlive the program that
/// defined it (a REPL line defines, a later line calls).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
    pub span: Span,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical
    And,
    Or,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    /// `~` in infix position; it parses but no value pair supports it
    BitNot,
    Shl,
    Shr,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitNot => "~",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        };
        write!(f, "{s}")
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Plus,
    Neg,
    Inc,
    Dec,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnOp::Plus => "+",
            UnOp::Neg => "-",
            UnOp::Inc => "++",
            UnOp::Dec => "--",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_display() {
        assert_eq!(BinOp::Add.to_string(), "+");
        assert_eq!(BinOp::Ge.to_string(), ">=");
        assert_eq!(BinOp::Shr.to_string(), ">>");
        assert_eq!(BinOp::BitNot.to_string(), "~");
    }

    #[test]
    fn test_unop_display() {
        assert_eq!(UnOp::Inc.to_string(), "++");
        assert_eq!(UnOp::Neg.to_string(), "-");
    }

    #[test]
    fn test_string_literal_cell_is_mutable() {
        let lit = Expr::Str(RefCell::new("abc".to_string()));
        if let Expr::Str(cell) = &lit {
            cell.replace("xbc".to_string());
        }
        assert_eq!(lit, Expr::Str(RefCell::new("xbc".to_string())));
    }
}
