//! Scope contexts
//!
//! A context chain is kept as a stack of frames: frame 0 is the root, and
//! the parent of every other frame is the one below it. Blocks, loops and
//! function calls push a frame on entry and pop it on exit, so a frame is
//! dropped as soon as the construct that created it finishes.

use super::builtins;
use super::error::{InterpResult, RuntimeError, TraceFrame};
use super::Value;
use crate::ast::Position;
use std::collections::HashMap;

/// A named slot in a context
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub constant: bool,
}

#[derive(Debug)]
struct Frame {
    name: String,
    entry: Position,
    source: String,
    bindings: HashMap<String, Variable>,
}

impl Frame {
    fn new(name: String, entry: Position, source: String) -> Self {
        Frame {
            name,
            entry,
            source,
            bindings: HashMap::new(),
        }
    }
}

/// The root context plus every nested context currently active.
///
/// Created once per file run or REPL session and handed to each
/// [`evaluate`](crate::evaluate) call, so state accumulates across calls.
#[derive(Debug)]
pub struct Context {
    frames: Vec<Frame>,
}

impl Context {
    /// Root context seeded with the built-in constants and functions
    pub fn new(name: impl Into<String>) -> Self {
        let mut context = Self::empty(name);
        builtins::install(&mut context);
        context
    }

    /// Root context with no bindings at all
    pub fn empty(name: impl Into<String>) -> Self {
        let name = name.into();
        Context {
            frames: vec![Frame::new(name.clone(), Position::default(), name)],
        }
    }

    /// Name of the root context
    pub fn name(&self) -> &str {
        &self.frames[0].name
    }

    /// Number of active contexts, root included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a child of the innermost context
    pub fn push(&mut self, name: impl Into<String>, entry: Position, source: &str) {
        self.frames.push(Frame::new(name.into(), entry, source.to_string()));
        tracing::trace!(depth = self.frames.len(), "enter context");
    }

    /// Leave the innermost context. The root is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            tracing::trace!(depth = self.frames.len(), "leave context");
        }
    }

    /// Drop every context above `depth`
    pub fn unwind_to(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    /// Look a name up, innermost context first
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.lookup(name).map(|var| &var.value)
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames.iter().rev().find_map(|frame| frame.bindings.get(name))
    }

    /// Assign through the scope chain.
    ///
    /// The nearest existing binding is overwritten in place, wherever it
    /// lives. A name bound nowhere is created in the root context.
    pub fn set(&mut self, name: &str, value: Value) -> InterpResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.bindings.get_mut(name) {
                if slot.constant {
                    return Err(RuntimeError::constant_reassignment(name));
                }
                slot.value = value;
                return Ok(());
            }
        }
        self.frames[0].bindings.insert(
            name.to_string(),
            Variable {
                value,
                constant: false,
            },
        );
        Ok(())
    }

    /// Bind a name in the innermost context, shadowing any outer binding
    pub fn define_local(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(
                name.to_string(),
                Variable {
                    value,
                    constant: false,
                },
            );
        }
    }

    /// Bind a constant in the root context
    pub fn define_constant(&mut self, name: &str, value: Value) {
        self.frames[0].bindings.insert(
            name.to_string(),
            Variable {
                value,
                constant: true,
            },
        );
    }

    /// Snapshot of the active chain, innermost first
    pub fn trace(&self) -> Vec<TraceFrame> {
        self.frames
            .iter()
            .rev()
            .map(|frame| TraceFrame {
                name: frame.name.clone(),
                entry: frame.entry,
                source: frame.source.clone(),
            })
            .collect()
    }

    /// Non-constant root bindings, sorted by name
    pub fn globals(&self) -> Vec<(&str, &Value)> {
        let mut vars: Vec<_> = self.frames[0]
            .bindings
            .iter()
            .filter(|(_, var)| !var.constant)
            .map(|(name, var)| (name.as_str(), &var.value))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }

    /// Forget every user binding, keeping the built-ins
    pub fn reset(&mut self) {
        self.frames.truncate(1);
        self.frames[0].bindings.retain(|_, var| var.constant);
    }
}
