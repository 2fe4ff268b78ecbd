//! Compiled patterns: the analysed form of parameter lists and definition
//! left-hand-sides.
//!
//! Patterns bind into slots of the *new* call frame, not the enclosing one;
//! slot indices are assigned by the analyser when a lambda or `let` block is
//! analysed. Matching a pattern against a value can fail "softly" (the
//! pattern just doesn't match, e.g. a list pattern against a record) so that
//! piecewise functions (`=>` match arms) can try the next alternative, or
//! "hard" if evaluating a type predicate itself errors.

use std::rc::Rc;

use crate::{
    error::{Context, CurvError, Result},
    frame::Frame,
    location::Location,
    meaning::operation::{eval_operation, Operation},
    value::Value,
};

#[derive(Debug)]
pub enum Pattern {
    Wildcard,
    Slot { index: usize, name: Rc<str> },
    /// A numeric, boolean, or symbol literal: matches only a value equal to
    /// it, binds nothing.
    Literal(Value),
    List {
        items: Vec<Pattern>,
        spread: Option<Box<Pattern>>,
    },
    Record {
        fields: Vec<(Rc<str>, Pattern)>,
        spread: Option<Box<Pattern>>,
    },
    /// `pattern = default_expr` as a parameter: binds `default_expr`,
    /// evaluated against the call frame, when the argument list is missing
    /// this field entirely (only meaningful inside a `Record` pattern).
    Optional {
        inner: Box<Pattern>,
        default: Rc<Operation>,
    },
    /// `pattern :: predicate`, a type-annotated pattern.
    Predicate {
        inner: Box<Pattern>,
        predicate: Rc<Operation>,
    },
}

impl Pattern {
    /// Binds `value` into `frame`'s slots, raising a hard error if it does
    /// not match. Used for lambda parameters, where there is no alternative
    /// pattern to fall back to.
    pub fn bind(&self, value: &Value, frame: &Rc<Frame>, call_site: &Location) -> Result<()> {
        if self.try_bind(value, frame)? {
            Ok(())
        } else {
            Err(CurvError::hard(
                Context::Phrase(call_site.clone()),
                "argument does not match parameter pattern",
            ))
        }
    }

    /// Attempts to bind `value` into `frame`. Returns `Ok(false)` on a soft
    /// mismatch (tuple arity, record field missing with no default, etc).
    pub fn try_bind(&self, value: &Value, frame: &Rc<Frame>) -> Result<bool> {
        match self {
            Pattern::Wildcard => Ok(true),
            Pattern::Slot { index, .. } => {
                frame.set_eager(*index, value.clone());
                Ok(true)
            }
            Pattern::Literal(literal) => Ok(value.equal(literal)),
            Pattern::List { items, spread } => {
                let Some(list) = value.as_list() else { return Ok(false) };
                if spread.is_none() {
                    if list.len() != items.len() {
                        return Ok(false);
                    }
                    for (p, v) in items.iter().zip(list.iter()) {
                        if !p.try_bind(v, frame)? {
                            return Ok(false);
                        }
                    }
                    return Ok(true);
                }
                if list.len() < items.len() {
                    return Ok(false);
                }
                for (p, v) in items.iter().zip(list.iter()) {
                    if !p.try_bind(v, frame)? {
                        return Ok(false);
                    }
                }
                let tail: Vec<Value> = list[items.len()..].to_vec();
                spread.as_ref().unwrap().try_bind(&Value::List(Rc::new(tail)), frame)
            }
            Pattern::Record { fields, spread } => {
                let Some(record) = value.as_record() else { return Ok(false) };
                let mut seen = std::collections::HashSet::new();
                for (name, pat) in fields {
                    seen.insert(name.as_ref());
                    match record.get(name)? {
                        Some(v) => {
                            if !pat.try_bind(&v, frame)? {
                                return Ok(false);
                            }
                        }
                        None => {
                            if let Pattern::Optional { inner, default } = pat {
                                let default_value = eval_operation(default, frame)?;
                                if !inner.try_bind(&default_value, frame)? {
                                    return Ok(false);
                                }
                            } else {
                                return Ok(false);
                            }
                        }
                    }
                }
                if let Some(spread) = spread {
                    use indexmap::IndexMap;
                    let mut rest = IndexMap::new();
                    for name in record.field_names() {
                        if !seen.contains(name.as_ref()) {
                            if let Some(v) = record.get(name)? {
                                rest.insert(Rc::clone(name), v);
                            }
                        }
                    }
                    let rest_module = crate::module::Module::new_eager(rest);
                    return spread.try_bind(&Value::Record(rest_module), frame);
                }
                Ok(true)
            }
            Pattern::Optional { inner, .. } => inner.try_bind(value, frame),
            Pattern::Predicate { inner, predicate } => {
                if !inner.try_bind(value, frame)? {
                    return Ok(false);
                }
                let result = eval_operation(predicate, frame)?;
                Ok(result.as_bool().unwrap_or(false))
            }
        }
    }

    /// All slot indices this pattern introduces, used by the analyser to
    /// size the enclosing frame.
    pub fn collect_slots(&self, out: &mut Vec<usize>) {
        match self {
            Pattern::Wildcard | Pattern::Literal(_) => {}
            Pattern::Slot { index, .. } => out.push(*index),
            Pattern::List { items, spread } => {
                for p in items {
                    p.collect_slots(out);
                }
                if let Some(s) = spread {
                    s.collect_slots(out);
                }
            }
            Pattern::Record { fields, spread } => {
                for (_, p) in fields {
                    p.collect_slots(out);
                }
                if let Some(s) = spread {
                    s.collect_slots(out);
                }
            }
            Pattern::Optional { inner, .. } | Pattern::Predicate { inner, .. } => inner.collect_slots(out),
        }
    }
}
