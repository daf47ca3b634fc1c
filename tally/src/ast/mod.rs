//! Abstract Syntax Tree definitions

mod expr;
mod printer;
mod span;

pub use expr::*;
pub use printer::print_tree;
pub use span::*;

use serde::Serialize;

/// A program is a sequence of top-level statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Node>,
}

impl Program {
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }
}
