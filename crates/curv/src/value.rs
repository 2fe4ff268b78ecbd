//! Runtime values.
//!
//! Values are a plain tagged union rather than a NaN-boxed 64-bit word: the
//! language core explicitly allows this as a simpler, equally-correct
//! representation, and `Rc` gives every heap-allocated variant (strings,
//! lists, records, functions, reactive expressions) cheap structural
//! sharing without an arena/heap-id layer to maintain.

use std::rc::Rc;

use crate::{closure::Closure, module::Module, reactive::ReactiveExpression};

#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Num(f64),
    /// An interned atom, e.g. the result of evaluating a bare field name or
    /// used as a tag inside tagged unions like `#circle`.
    Symbol(Rc<str>),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Record(Rc<Module>),
    Function(Rc<Closure>),
    /// A value that is not yet a concrete number but a symbolic expression
    /// over shader uniform parameters (see [`crate::reactive`]).
    Reactive(Rc<ReactiveExpression>),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
            Value::Reactive(_) => "reactive value",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&Rc<Vec<Value>>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Rc<Module>> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&Rc<Closure>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Structural equality, per the `==`/`!=` operators. Functions and
    /// reactive values are never equal, even to themselves, matching the
    /// original's "functions are not comparable" rule.
    #[must_use]
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) | (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            (Value::Record(a), Value::Record(b)) => Rc::ptr_eq(a, b) || a.structurally_equal(b),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "#{s}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(m) => m.fmt(f),
            Value::Function(_) => write!(f, "<function>"),
            Value::Reactive(r) => write!(f, "{r}"),
        }
    }
}
