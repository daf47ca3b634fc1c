//! Runtime errors for the interpreter

use crate::ast::{Position, Span};
use crate::interp::Value;
use std::fmt::Write;
use thiserror::Error;

/// Runtime error during interpretation
#[derive(Debug, Clone, Error)]
#[error("RuntimeError: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Where the error surfaced; filled in by the interpreter, absent for
    /// errors fresh out of a native function.
    pub location: Option<Location>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// Name not bound anywhere in the scope chain
    UndefinedVariable,
    /// Call through a name bound to something other than a function
    NotCallable,
    /// Operand or argument of the wrong type
    TypeError,
    /// Operator not defined for the operand types
    UnsupportedOperation,
    IndexOutOfBounds,
    /// Argument count mismatch
    ArityMismatch,
    /// Assignment to a built-in constant
    ConstantReassignment,
    InvalidAssignmentTarget,
    /// Number literal text that does not parse as a float
    InvalidNumber,
    /// Argument of the right type but an unusable value
    InvalidArgument,
    Io,
    /// Control flow: leave the innermost loop
    Break,
    /// Control flow: next iteration of the innermost loop
    Continue,
    /// Control flow: leave the innermost function call with a value
    Return(Box<Value>),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        // Return carries a value, but kinds are compared by discriminant only
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Source position plus the scope chain active when an error surfaced
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub span: Span,
    /// Name of the buffer the failing node came from
    pub source: String,
    /// Active contexts, innermost first
    pub trace: Vec<TraceFrame>,
}

/// One context in a traceback
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub name: String,
    /// Where the context was entered (a block's brace, a loop keyword, a call site)
    pub entry: Position,
    pub source: String,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("Variable {name} is not defined"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("Function {name} is not defined"))
    }

    pub fn not_callable(name: &str) -> Self {
        Self::new(ErrorKind::NotCallable, format!("Variable {name} is not a function"))
    }

    pub fn invalid_callee() -> Self {
        Self::new(ErrorKind::NotCallable, "Only named functions can be called")
    }

    /// Operand types that have no rules for this operator at all
    pub fn invalid_operands(op: &str, left: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("Invalid types for binary operation '{op}': {left} and {right}"),
        )
    }

    /// Operand types that are compatible but do not support this operator
    pub fn unsupported_operation(op: &str, left: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedOperation,
            format!("Unsupported operation: {left} {op} {right}"),
        )
    }

    pub fn invalid_unary_operand(op: &str, operand: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("Invalid type for unary operation '{op}': {operand}"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn index_out_of_bounds(index: f64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("Index {index} is out of range for length {len}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("{name}() takes {expected}, got {got}"),
        )
    }

    pub fn constant_reassignment(name: &str) -> Self {
        Self::new(ErrorKind::ConstantReassignment, format!("Cannot assign to constant {name}"))
    }

    pub fn invalid_assignment_target(what: &str) -> Self {
        Self::new(ErrorKind::InvalidAssignmentTarget, format!("Cannot assign to {what}"))
    }

    pub fn invalid_number(text: &str) -> Self {
        Self::new(ErrorKind::InvalidNumber, format!("Invalid number: {text}"))
    }

    pub fn invalid_argument(name: &str, message: &str) -> Self {
        Self::new(ErrorKind::InvalidArgument, format!("{name}() {message}"))
    }

    pub fn io_error(message: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {message}"))
    }

    pub fn break_signal() -> Self {
        Self::new(ErrorKind::Break, "break outside of loop")
    }

    pub fn continue_signal() -> Self {
        Self::new(ErrorKind::Continue, "continue outside of loop")
    }

    pub fn return_signal(value: Value) -> Self {
        Self::new(ErrorKind::Return(Box::new(value)), "return outside of function")
    }

    pub fn is_control_flow(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Break | ErrorKind::Continue | ErrorKind::Return(_)
        )
    }

    /// Turn a control-flow signal that escaped every loop and function into
    /// an ordinary error. The message already says what went wrong.
    pub fn into_escaped(mut self) -> Self {
        if self.is_control_flow() {
            self.kind = ErrorKind::UnsupportedOperation;
        }
        self
    }

    /// Attach a location unless an inner node already did.
    pub fn at(mut self, location: impl FnOnce() -> Location) -> Self {
        if self.location.is_none() && !self.is_control_flow() {
            self.location = Some(location());
        }
        self
    }

    /// Render the scope traceback, innermost scope first, root last.
    pub fn traceback(&self) -> String {
        let mut out = String::new();
        if let Some(location) = &self.location {
            out.push_str("Traceback (innermost scope first):\n");
            let mut source = location.source.as_str();
            let mut line = location.span.start.line;
            for frame in &location.trace {
                // Writing into a String cannot fail.
                let _ = writeln!(out, "  File {source}, line {}, in {}", line + 1, frame.name);
                source = &frame.source;
                line = frame.entry.line;
            }
        }
        out.push_str(&self.to_string());
        out
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
