//! Tally Interpreter Library
//!
//! A small expression-oriented scripting language: lexer, parser and a
//! tree-walking interpreter with dynamic scoping.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::Span;
pub use error::{Error, Result, SyntaxError};
pub use interp::{evaluate, Context, Value};
