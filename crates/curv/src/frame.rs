//! Evaluator activation records.
//!
//! A `Frame` is allocated at exactly the boundaries that the analyser treats
//! as one slot space: a lambda call, the program root, a `for`-loop
//! iteration, and a `.curv` file/directory include. `let`, `where`,
//! `parametric`, and record-literal bindings do not get their own Frame —
//! the analyser flattens them into the slot array of whichever boundary
//! encloses them, so a name looked up from deeper lexical nesting still
//! resolves in the same number of hops as one written at the boundary's top
//! level.
//!
//! `nonlocal` is the link nonlocal variable references actually walk: it
//! points to the Frame that was active when a Closure/Module was created,
//! one hop per boundary crossed, matching the `nonlocal: List*` pointer the
//! original implementation threads per closure. `parent` records the same
//! thing for stack-trace purposes only — nothing in name resolution reads
//! it — and is never a back-edge used for scoping.
//!
//! A slot is either *eager* (bound immediately, e.g. a lambda parameter or a
//! `for`-loop variable) or *lazy* (bound to a thunk expression, e.g. a
//! `let`/`where`/record field, evaluated the first time something reads
//! it). Reading a lazy slot that is mid-evaluation — a recursive reference
//! with no base case — raises "illegal recursive reference" instead of
//! looping or reading stale data, matching the write-after-evaluation
//! discipline of the original thunk implementation.

use std::{cell::RefCell, rc::Rc};

use crate::{
    closure::Closure,
    error::{Context, CurvError, Result},
    location::Location,
    meaning::operation::{eval_operation, Operation},
    system::SystemHandle,
    value::Value,
};

#[derive(Debug, Clone)]
enum SlotState {
    Empty,
    Forcing,
    Value(Value),
}

#[derive(Debug)]
pub struct Frame {
    slots: RefCell<Vec<SlotState>>,
    thunks: Vec<Option<Rc<Operation>>>,
    /// The Frame a nonlocal reference actually walks to, one hop per
    /// boundary. `None` at the program root and at any frame built with no
    /// enclosing scope (e.g. an eager record literal).
    nonlocal: Option<Rc<Frame>>,
    /// Same value as `nonlocal`, kept only so a future stack-trace walk has
    /// somewhere to read "what was enclosing this frame" without being able
    /// to affect name resolution.
    pub parent: Option<Rc<Frame>>,
    pub call_site: Option<Location>,
    /// The owning `System`, inherited from `nonlocal` by every frame except
    /// the handful built with no lexical parent ([`Frame::new_root`]).
    system: Option<SystemHandle>,
}

impl Frame {
    /// A frame with `nslots` slots, all eager (no lazy thunk backing any of
    /// them) — used for lambda calls and loop bodies with no flattened
    /// `let`/`where` bindings of their own.
    #[must_use]
    pub fn new(nslots: usize, nonlocal: Option<Rc<Frame>>, call_site: Option<Location>) -> Rc<Self> {
        let system = nonlocal.as_ref().and_then(|f| f.system.clone());
        Rc::new(Self {
            slots: RefCell::new(vec![SlotState::Empty; nslots]),
            thunks: vec![None; nslots],
            parent: nonlocal.clone(),
            nonlocal,
            call_site,
            system,
        })
    }

    /// A frame whose slots are backed by `thunks` (`None` entries are still
    /// eager, to be filled with [`Frame::set_eager`] before use) — used for
    /// every boundary (lambda call, `for`-loop iteration) whose body has
    /// flattened `let`/`where`/`parametric` bindings alongside its eager
    /// parameter/pattern slots.
    #[must_use]
    pub fn new_with_thunks(thunks: Vec<Option<Rc<Operation>>>, nonlocal: Option<Rc<Frame>>, call_site: Option<Location>) -> Rc<Self> {
        let n = thunks.len();
        let system = nonlocal.as_ref().and_then(|f| f.system.clone());
        Rc::new(Self {
            slots: RefCell::new(vec![SlotState::Empty; n]),
            thunks,
            parent: nonlocal.clone(),
            nonlocal,
            call_site,
            system,
        })
    }

    /// A frame with no lexical enclosing scope but an explicit owning
    /// `System` — used for the program root and for a `.curv` file or
    /// directory include, both of which start a fresh slot space with no
    /// `nonlocal` link but still need `System` reachable for any `include`
    /// nested inside them.
    #[must_use]
    pub fn new_root(thunks: Vec<Option<Rc<Operation>>>, system: SystemHandle, call_site: Option<Location>) -> Rc<Self> {
        let n = thunks.len();
        Rc::new(Self {
            slots: RefCell::new(vec![SlotState::Empty; n]),
            thunks,
            parent: None,
            nonlocal: None,
            call_site,
            system: Some(system),
        })
    }

    #[must_use]
    pub fn system(&self) -> Option<&SystemHandle> {
        self.system.as_ref()
    }

    pub fn set_eager(&self, index: usize, value: Value) {
        self.slots.borrow_mut()[index] = SlotState::Value(value);
    }

    /// Reads local slot `index`, forcing its thunk if it has not run yet.
    pub fn read_local(self: &Rc<Self>, index: usize, name: &str) -> Result<Value> {
        let state = self.slots.borrow()[index].clone();
        match state {
            SlotState::Value(v) => Ok(v),
            SlotState::Forcing => Err(CurvError::hard(
                Context::None,
                format!("illegal recursive reference to '{name}'"),
            )),
            SlotState::Empty => {
                self.slots.borrow_mut()[index] = SlotState::Forcing;
                let op = self.thunks[index]
                    .clone()
                    .unwrap_or_else(|| panic!("read of unset eager slot '{name}'"));
                let value = eval_operation(&op, self)?;
                if is_self_captured_closure(&value, self) {
                    // A `Lambda` thunk whose own captured frame is this very
                    // frame: caching it here would store the Closure into
                    // the slot its own `captured` points back to, an
                    // uncollectable Frame -> slot -> Closure -> captured
                    // cycle. Leave the slot empty so every future read
                    // re-evaluates the thunk (cheap: just rewraps the same
                    // body/pattern in a fresh Closure) instead of closing it.
                    self.slots.borrow_mut()[index] = SlotState::Empty;
                } else {
                    self.slots.borrow_mut()[index] = SlotState::Value(value.clone());
                }
                Ok(value)
            }
        }
    }

    /// Walks `depth` hops up the `nonlocal` chain and reads `index` from
    /// that frame's slots.
    pub fn read_nonlocal(self: &Rc<Self>, depth: usize, index: usize, name: &str) -> Result<Value> {
        let mut frame = Rc::clone(self);
        for _ in 0..depth {
            frame = Rc::clone(
                frame
                    .nonlocal
                    .as_ref()
                    .unwrap_or_else(|| panic!("nonlocal reference to '{name}' escaped its scope")),
            );
        }
        frame.read_local(index, name)
    }
}

/// True if `value` is a `Closure::Lambda` (or a `Piecewise` containing one)
/// whose `captured` frame is `frame` itself.
fn is_self_captured_closure(value: &Value, frame: &Rc<Frame>) -> bool {
    let Value::Function(closure) = value else { return false };
    closure_self_captures(closure, frame)
}

fn closure_self_captures(closure: &Rc<Closure>, frame: &Rc<Frame>) -> bool {
    match closure.as_ref() {
        Closure::Lambda { captured, .. } => Rc::ptr_eq(captured, frame),
        Closure::Piecewise(arms) => arms.iter().any(|arm| closure_self_captures(arm, frame)),
        Closure::Builtin { .. } => false,
    }
}
