//! Tree-walking evaluator

use super::error::{ErrorKind, InterpResult, Location, RuntimeError};
use super::scope::Context;
use super::value::{Callable, Value};
use crate::ast::{BinOp, Expr, FuncDef, Node, Position, Program, Span, UnOp};
use std::rc::Rc;

/// Stack growth parameters for deeply nested programs
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Evaluates one program against a caller-owned context
pub struct Interpreter<'ctx> {
    context: &'ctx mut Context,
    /// Name of the buffer being evaluated, used in tracebacks
    source: String,
}

impl<'ctx> Interpreter<'ctx> {
    pub fn new(context: &'ctx mut Context, source: impl Into<String>) -> Self {
        Interpreter {
            context,
            source: source.into(),
        }
    }

    /// Run every top-level statement in order and return the last value.
    ///
    /// Stops at the first error. The context is unwound back to where it
    /// started so the caller can keep using it.
    pub fn run(&mut self, program: &Program) -> InterpResult<Value> {
        let base = self.context.depth();
        let mut last = Value::Null;
        for stmt in &program.statements {
            match self.eval(stmt) {
                Ok(value) => last = value,
                Err(err) => {
                    self.context.unwind_to(base);
                    let err = err.into_escaped().at(|| self.locate(stmt.span));
                    tracing::debug!(error = %err.message, "evaluation failed");
                    return Err(err);
                }
            }
        }
        Ok(last)
    }

    /// Evaluate a node
    pub fn eval(&mut self, node: &Node) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(node))
            .map_err(|err| err.at(|| self.locate(node.span)))
    }

    fn locate(&self, span: Span) -> Location {
        Location {
            span,
            source: self.source.clone(),
            trace: self.context.trace(),
        }
    }

    /// Run `body` inside a fresh child context, popping it however `body` ends.
    fn scoped<T>(
        &mut self,
        name: &str,
        entry: Position,
        body: impl FnOnce(&mut Self) -> InterpResult<T>,
    ) -> InterpResult<T> {
        self.context.push(name, entry, &self.source);
        let result = body(self);
        self.context.pop();
        result
    }

    fn eval_inner(&mut self, node: &Node) -> InterpResult<Value> {
        match &node.node {
            Expr::Number(text) => text
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| RuntimeError::invalid_number(text)),

            Expr::Str(text) => Ok(Value::Str(text.borrow().clone())),

            Expr::Ident(name) => self
                .context
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name)),

            Expr::Binary { left, op, right } => {
                // Both sides always run: && and || do not short-circuit
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary_op(*op, &left, &right)
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary_op(*op, &value)
            }

            Expr::Assign {
                target,
                value,
                postfix,
            } => {
                let previous = if *postfix { Some(self.eval(target)?) } else { None };
                let value = self.eval(value)?;
                self.assign(target, value.clone())?;
                Ok(previous.unwrap_or(value))
            }

            Expr::Call { callee, args } => self.call(callee, args, node.start()),

            Expr::Block(statements) => self.scoped("<anonymous>", node.start(), |this| {
                let mut last = Value::Null;
                for stmt in statements {
                    last = this.eval(stmt)?;
                }
                Ok(last)
            }),

            Expr::If { cases, else_body } => {
                for case in cases {
                    if self.eval(&case.condition)?.is_true() {
                        return self.eval(&case.body);
                    }
                }
                match else_body {
                    Some(body) => self.eval(body),
                    None => Ok(Value::Null),
                }
            }

            Expr::For {
                init,
                cond,
                step,
                body,
            } => self.scoped("<for-loop>", node.start(), |this| {
                this.eval(init)?;
                while this.eval(cond)?.is_true() {
                    if this.run_loop_body(body)?.is_break() {
                        break;
                    }
                    this.eval(step)?;
                }
                Ok(Value::Null)
            }),

            Expr::While { cond, body } => self.scoped("<while-loop>", node.start(), |this| {
                while this.eval(cond)?.is_true() {
                    if this.run_loop_body(body)?.is_break() {
                        break;
                    }
                }
                Ok(Value::Null)
            }),

            Expr::Index { target, index } => {
                let container = self.eval(target)?;
                let index = self.eval(index)?;
                read_index(&container, &index)
            }

            Expr::FuncDef(def) => {
                tracing::trace!(function = %def.name, params = def.params.len(), "define function");
                let callable = Value::Callable(Rc::new(Callable::Script(Rc::clone(def))));
                self.context.set(&def.name, callable)?;
                Ok(Value::Null)
            }

            Expr::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Err(RuntimeError::return_signal(value))
            }

            Expr::Break => Err(RuntimeError::break_signal()),
            Expr::Continue => Err(RuntimeError::continue_signal()),
        }
    }

    /// Evaluate a loop body, absorbing `break` and `continue`
    fn run_loop_body(&mut self, body: &Node) -> InterpResult<LoopFlow> {
        match self.eval(body) {
            Ok(_) => Ok(LoopFlow::Next),
            Err(err) if err.kind == ErrorKind::Continue => Ok(LoopFlow::Next),
            Err(err) if err.kind == ErrorKind::Break => Ok(LoopFlow::Break),
            Err(err) => Err(err),
        }
    }

    /// Store a value into an assignment target
    fn assign(&mut self, target: &Node, value: Value) -> InterpResult<()> {
        match &target.node {
            Expr::Ident(name) => self.context.set(name, value),

            Expr::Index {
                target: container_node,
                index,
            } => {
                let container = self.eval(container_node)?;
                let index = self.eval(index)?;
                let position = index_position(&index)?;

                match container {
                    Value::Array(items) => {
                        let mut items = items.borrow_mut();
                        let slot = checked_index(position, items.len())?;
                        items[slot] = value;
                        Ok(())
                    }
                    Value::Str(text) => {
                        let slot = checked_index(position, text.chars().count())?;
                        let replacement = value.to_text();
                        let updated: String = text
                            .chars()
                            .enumerate()
                            .map(|(i, ch)| if i == slot { replacement.clone() } else { ch.to_string() })
                            .collect();

                        match &container_node.node {
                            Expr::Str(literal) => {
                                *literal.borrow_mut() = updated;
                                Ok(())
                            }
                            Expr::Ident(name) => self.context.set(name, Value::Str(updated)),
                            _ => Err(RuntimeError::invalid_assignment_target("an element of a computed string")),
                        }
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "Cannot index into {}",
                        other.type_name()
                    ))),
                }
            }

            _ => Err(RuntimeError::invalid_assignment_target("this expression")),
        }
    }

    /// Call a named function
    fn call(&mut self, callee: &Node, args: &[Node], call_site: Position) -> InterpResult<Value> {
        let Expr::Ident(name) = &callee.node else {
            return Err(RuntimeError::invalid_callee());
        };

        let callable = match self.context.get(name) {
            Some(Value::Callable(callable)) => Rc::clone(callable),
            Some(_) => return Err(RuntimeError::not_callable(name)),
            None => return Err(RuntimeError::undefined_function(name)),
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }

        tracing::trace!(function = %name, args = values.len(), "call");
        match callable.as_ref() {
            Callable::Native { func, .. } => func(&values),
            Callable::Script(def) => self.call_function(def, &values, call_site),
        }
    }

    fn call_function(&mut self, def: &FuncDef, args: &[Value], call_site: Position) -> InterpResult<Value> {
        if args.len() != def.params.len() {
            let expected = match def.params.len() {
                1 => "exactly 1 argument".to_string(),
                n => format!("exactly {n} arguments"),
            };
            return Err(RuntimeError::arity_mismatch(&def.name, &expected, args.len()));
        }

        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.scoped(&def.name, call_site, |this| {
                for (param, value) in def.params.iter().zip(args) {
                    this.context.define_local(param, value.clone());
                }
                let mut last = Value::Null;
                for stmt in &def.body {
                    last = this.eval(stmt)?;
                }
                Ok(last)
            })
        });

        match result {
            Err(RuntimeError {
                kind: ErrorKind::Return(value),
                ..
            }) => Ok(*value),
            // break/continue may not cross a function boundary
            Err(err) => Err(err.into_escaped()),
            ok => ok,
        }
    }
}

/// What a loop does after its body ran
enum LoopFlow {
    Next,
    Break,
}

impl LoopFlow {
    fn is_break(&self) -> bool {
        matches!(self, LoopFlow::Break)
    }
}

fn binary_op(op: BinOp, left: &Value, right: &Value) -> InterpResult<Value> {
    let symbol = op.to_string();
    let unsupported = || RuntimeError::unsupported_operation(&symbol, left.type_name(), right.type_name());

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_op(op, *a, *b).ok_or_else(unsupported),

        (Value::Bool(a), Value::Bool(b)) => match op {
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            BinOp::And => Ok(Value::Bool(*a && *b)),
            BinOp::Or => Ok(Value::Bool(*a || *b)),
            _ => Err(unsupported()),
        },

        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            BinOp::Add => Ok(Value::Str(format!("{a}{b}"))),
            BinOp::Gt | BinOp::Lt => vendor_order(op, a, b).ok_or_else(unsupported),
            _ => Err(unsupported()),
        },

        (Value::Null, Value::Null) => match op {
            BinOp::Eq => Ok(Value::Bool(true)),
            BinOp::Ne => Ok(Value::Bool(false)),
            _ => Err(unsupported()),
        },

        _ => Err(RuntimeError::invalid_operands(
            &symbol,
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn number_op(op: BinOp, a: f64, b: f64) -> Option<Value> {
    // Bitwise operands truncate to 32-bit integers
    let (x, y) = (a as i32, b as i32);
    let value = match op {
        BinOp::Add => Value::Number(a + b),
        BinOp::Sub => Value::Number(a - b),
        BinOp::Mul => Value::Number(a * b),
        BinOp::Div => Value::Number(a / b),
        BinOp::Mod => Value::Number(a % b),
        BinOp::Eq => Value::Bool(a == b),
        BinOp::Ne => Value::Bool(a != b),
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Ge => Value::Bool(a >= b),
        BinOp::BitAnd => Value::Number(f64::from(x & y)),
        BinOp::BitOr => Value::Number(f64::from(x | y)),
        BinOp::BitXor => Value::Number(f64::from(x ^ y)),
        BinOp::Shl => Value::Number(f64::from(x.wrapping_shl(y as u32))),
        BinOp::Shr => Value::Number(f64::from(x.wrapping_shr(y as u32))),
        BinOp::And | BinOp::Or | BinOp::BitNot => return None,
    };
    Some(value)
}

/// The only ordered string pair: "AMD" sorts above "Intel"
fn vendor_order(op: BinOp, a: &str, b: &str) -> Option<Value> {
    let amd_first = match (a, b) {
        ("AMD", "Intel") => true,
        ("Intel", "AMD") => false,
        _ => return None,
    };
    Some(Value::Bool(if op == BinOp::Gt { amd_first } else { !amd_first }))
}

fn unary_op(op: UnOp, value: &Value) -> InterpResult<Value> {
    let Value::Number(n) = value else {
        return Err(RuntimeError::invalid_unary_operand(&op.to_string(), value.type_name()));
    };
    Ok(Value::Number(match op {
        UnOp::Plus => *n,
        UnOp::Neg => -n,
        UnOp::Inc => n + 1.0,
        UnOp::Dec => n - 1.0,
    }))
}

/// Floored numeric index
fn index_position(index: &Value) -> InterpResult<f64> {
    match index {
        Value::Number(n) => Ok(n.floor()),
        other => Err(RuntimeError::type_error(format!(
            "Cannot index with type {}",
            other.type_name()
        ))),
    }
}

fn checked_index(position: f64, len: usize) -> InterpResult<usize> {
    if position >= 0.0 && position < len as f64 {
        Ok(position as usize)
    } else {
        Err(RuntimeError::index_out_of_bounds(position, len))
    }
}

fn read_index(container: &Value, index: &Value) -> InterpResult<Value> {
    let position = index_position(index)?;
    match container {
        Value::Array(items) => {
            let items = items.borrow();
            let slot = checked_index(position, items.len())?;
            Ok(items[slot].clone())
        }
        Value::Str(text) => {
            let slot = checked_index(position, text.chars().count())?;
            Ok(text
                .chars()
                .nth(slot)
                .map(|ch| Value::Str(ch.to_string()))
                .unwrap_or(Value::Null))
        }
        other => Err(RuntimeError::type_error(format!(
            "Cannot index into {}",
            other.type_name()
        ))),
    }
}
