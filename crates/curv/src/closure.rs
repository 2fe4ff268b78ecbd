//! Callable values: user-defined lambdas, piecewise functions, and builtins.

use std::rc::Rc;

use crate::{
    error::{Context, CurvError, Result},
    frame::Frame,
    location::Location,
    meaning::operation::Operation,
    pattern::Pattern,
    value::Value,
};

#[derive(Debug)]
pub enum Closure {
    Lambda {
        name: Option<Rc<str>>,
        param: Rc<Pattern>,
        body: Rc<Operation>,
        /// The environment the lambda was created in; a fresh call frame's
        /// `nonlocal` link points here.
        captured: Rc<Frame>,
        nslots: usize,
        /// Thunks for any `let`/`where` bindings flattened into this
        /// lambda's call frame, alongside its (eager) parameter slots.
        thunks: Vec<Option<Rc<Operation>>>,
    },
    /// An ordered list of Lambdas tried in turn; the first whose parameter
    /// pattern matches the argument runs. Built from a chain of `pattern =>
    /// body` arms.
    Piecewise(Vec<Rc<Closure>>),
    Builtin {
        name: &'static str,
        func: fn(&Value, &Location) -> Result<Value>,
    },
}

impl Closure {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Closure::Lambda { name, .. } => name.as_deref(),
            Closure::Piecewise(_) => None,
            Closure::Builtin { name, .. } => Some(name),
        }
    }

    pub fn call(self: &Rc<Self>, arg: &Value, call_site: &Location) -> Result<Value> {
        match self.as_ref() {
            Closure::Lambda {
                param, body, captured, thunks, ..
            } => {
                let frame = call_frame(thunks, captured, call_site);
                param.bind(arg, &frame, call_site)?;
                eval_call_body(body, &frame)
            }
            Closure::Piecewise(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    let is_last = i + 1 == arms.len();
                    match arm.try_call(arg, call_site) {
                        Ok(value) => return Ok(value),
                        Err(err) if err.is_soft() && !is_last => continue,
                        Err(err) => return Err(err.harden()),
                    }
                }
                Err(CurvError::hard(
                    Context::Phrase(call_site.clone()),
                    "no piecewise function arm matched this argument",
                ))
            }
            Closure::Builtin { func, .. } => func(arg, call_site),
        }
    }

    /// Calls a single Lambda arm for piecewise dispatch: a pattern mismatch
    /// is a *soft* failure (so [`Closure::Piecewise`] can try the next arm)
    /// rather than the hard failure a direct call raises.
    fn try_call(self: &Rc<Self>, arg: &Value, call_site: &Location) -> Result<Value> {
        match self.as_ref() {
            Closure::Lambda {
                param, body, captured, thunks, ..
            } => {
                let frame = call_frame(thunks, captured, call_site);
                if !param.try_bind(arg, &frame)? {
                    return Err(CurvError::soft(Context::None, "argument does not match parameter pattern"));
                }
                eval_call_body(body, &frame)
            }
            Closure::Piecewise(_) | Closure::Builtin { .. } => self.call(arg, call_site),
        }
    }
}

fn call_frame(thunks: &[Option<Rc<Operation>>], captured: &Rc<Frame>, call_site: &Location) -> Rc<Frame> {
    Frame::new_with_thunks(thunks.to_vec(), Some(Rc::clone(captured)), Some(call_site.clone()))
}

fn eval_call_body(body: &Rc<Operation>, frame: &Rc<Frame>) -> Result<Value> {
    crate::meaning::operation::eval_operation(body, frame)
}
