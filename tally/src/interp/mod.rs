//! Tree-walking interpreter
//!
//! [`evaluate`] is the entry point: it parses a buffer and runs it against a
//! caller-owned [`Context`], so a REPL can keep state between lines.

mod builtins;
mod error;
mod eval;
mod scope;
mod value;

pub use error::{ErrorKind, InterpResult, Location, RuntimeError, TraceFrame};
pub use eval::Interpreter;
pub use scope::{Context, Variable};
pub use value::{Callable, NativeFn, Value};

use crate::parser::parse;

/// Parse `source` and evaluate it in `context`.
///
/// A syntax error aborts before anything runs. On a runtime error the
/// context keeps every binding made before the failure.
pub fn evaluate(source: &str, source_name: &str, context: &mut Context) -> Result<Value, crate::error::Error> {
    let program = parse(source)?;
    tracing::debug!(source = source_name, statements = program.statements.len(), "evaluate");
    let value = Interpreter::new(context, source_name).run(&program)?;
    tracing::debug!(source = source_name, result = value.type_name(), "evaluate finished");
    Ok(value)
}
