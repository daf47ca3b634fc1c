//! Runtime values for the interpreter

use super::error::InterpResult;
use crate::ast::FuncDef;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Signature of a host-provided function
pub type NativeFn = fn(&[Value]) -> InterpResult<Value>;

/// Runtime value
#[derive(Clone)]
pub enum Value {
    /// Every number is a 64-bit float
    Number(f64),
    Bool(bool),
    Str(String),
    Null,
    /// Arrays are shared: every copy of the value aliases the same storage
    Array(Rc<RefCell<Vec<Value>>>),
    Callable(Rc<Callable>),
}

/// A function value
#[derive(Debug)]
pub enum Callable {
    Native { name: &'static str, func: NativeFn },
    Script(Rc<FuncDef>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Native { name, .. } => name,
            Callable::Script(def) => &def.name,
        }
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn native(name: &'static str, func: NativeFn) -> Self {
        Value::Callable(Rc::new(Callable::Native { name, func }))
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Callable(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Exact boolean `true`; no other value counts
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text spliced into a string; same as `Display` except null is empty
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Identity of an array's storage, used to spot arrays that contain themselves
type ArrayId = *const RefCell<Vec<Value>>;

impl Value {
    fn fmt_guarded(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<ArrayId>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                let id = Rc::as_ptr(items);
                if open.contains(&id) {
                    return write!(f, "[...]");
                }
                open.push(id);
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_guarded(f, open)?;
                }
                open.pop();
                write!(f, "]")
            }
            Value::Callable(callable) => match callable.as_ref() {
                Callable::Native { .. } => write!(f, "<builtin {}>", callable.name()),
                Callable::Script(_) => write!(f, "<function {}>", callable.name()),
            },
        }
    }

    /// Structural equality. A pair of arrays already being compared further
    /// up counts as equal, so cyclic arrays terminate.
    fn eq_guarded(&self, other: &Value, open: &mut Vec<(ArrayId, ArrayId)>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
                if open.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.borrow(), b.borrow());
                if left.len() != right.len() {
                    return false;
                }
                open.push(pair);
                let equal = left.iter().zip(right.iter()).all(|(x, y)| x.eq_guarded(y, open));
                open.pop();
                equal
            }
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_guarded(f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Null => write!(f, "Null"),
            Value::Array(_) => write!(f, "Array({self})"),
            Value::Callable(_) => write!(f, "Callable({self})"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_guarded(other, &mut Vec::new())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_array_display() {
        let arr = Value::array(vec![Value::Number(1.0), Value::from("a"), Value::Null]);
        assert_eq!(arr.to_string(), "[1, a, null]");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from("x").to_text(), "x");
        assert_eq!(Value::Number(2.5).to_text(), "2.5");
    }

    #[test]
    fn test_only_exact_true_is_true() {
        assert!(Value::Bool(true).is_true());
        assert!(!Value::Number(1.0).is_true());
        assert!(!Value::from("true").is_true());
    }

    #[test]
    fn test_arrays_alias() {
        let a = Value::array(vec![Value::Null]);
        let b = a.clone();
        if let Value::Array(items) = &a {
            items.borrow_mut()[0] = Value::Number(9.0);
        }
        assert_eq!(b.to_string(), "[9]");
    }

    fn self_containing() -> Value {
        let a = Value::array(vec![Value::Number(1.0), Value::Null]);
        if let Value::Array(items) = &a {
            items.borrow_mut()[1] = a.clone();
        }
        a
    }

    #[test]
    fn test_cyclic_array_display() {
        let a = self_containing();
        assert_eq!(a.to_string(), "[1, [...]]");
        assert_eq!(format!("{a:?}"), "Array([1, [...]])");
    }

    #[test]
    fn test_cyclic_array_equality() {
        let (a, b) = (self_containing(), self_containing());
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_ne!(a, Value::array(vec![Value::Number(1.0), Value::Null]));
    }

    #[test]
    fn test_shared_but_acyclic_array_prints_twice() {
        let inner = Value::array(vec![Value::Number(2.0)]);
        let outer = Value::array(vec![inner.clone(), inner]);
        assert_eq!(outer.to_string(), "[[2], [2]]");
    }

    #[test]
    fn test_callable_display_uses_name() {
        assert_eq!(Value::native("len", |_| Ok(Value::Null)).to_string(), "<builtin len>");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::array(vec![]).type_name(), "array");
        assert_eq!(Value::native("len", |_| Ok(Value::Null)).type_name(), "function");
    }
}
