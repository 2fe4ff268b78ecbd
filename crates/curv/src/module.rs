//! Records and modules: ordered, named views onto a [`Frame`]'s slots.
//!
//! All of the laziness and recursive-reference detection lives in `Frame`
//! itself; a `Module` is just the name-to-slot-index map plus the frame that
//! backs it, so `let`, `where`, `parametric`, record literals, and directory
//! imports all share one mechanism.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{error::Result, frame::Frame, value::Value};

#[derive(Debug)]
pub struct Module {
    pub names: IndexMap<Rc<str>, usize>,
    pub frame: Rc<Frame>,
}

impl Module {
    #[must_use]
    pub fn new(names: IndexMap<Rc<str>, usize>, frame: Rc<Frame>) -> Rc<Self> {
        Rc::new(Self { names, frame })
    }

    /// Builds a module whose fields are already-evaluated values, as used by
    /// builtins that return records (`vec3`-style constructors, directory
    /// imports, etc).
    #[must_use]
    pub fn new_eager(fields: IndexMap<Rc<str>, Value>) -> Rc<Self> {
        let frame = Frame::new(fields.len(), None, None);
        let mut names = IndexMap::with_capacity(fields.len());
        for (i, (name, value)) in fields.into_iter().enumerate() {
            frame.set_eager(i, value);
            names.insert(name, i);
        }
        Rc::new(Self { names, frame })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.names.keys()
    }

    /// Forces and returns the value of field `name`, or `Ok(None)` if there
    /// is no such field.
    pub fn get(self: &Rc<Self>, name: &str) -> Result<Option<Value>> {
        let Some(&index) = self.names.get(name) else {
            return Ok(None);
        };
        Ok(Some(self.frame.read_local(index, name)?))
    }

    /// Two modules are structurally equal if they have the same field names
    /// and every field's forced value is equal. A forcing error is
    /// suppressed to `false` rather than propagated, matching the original's
    /// catch-and-default behaviour for equality.
    #[must_use]
    pub fn structurally_equal(self: &Rc<Self>, other: &Rc<Self>) -> bool {
        if self.names.len() != other.names.len() {
            return false;
        }
        for name in self.names.keys() {
            let (Ok(Some(a)), Ok(Some(b))) = (self.get(name), other.get(name)) else {
                return false;
            };
            if !a.equal(&b) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.names.keys().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{name}:")?;
            let this = self;
            match this.frame.read_local(this.names[name], name) {
                Ok(v) => write!(f, "{v}")?,
                Err(_) => write!(f, "<thunk>")?,
            }
        }
        write!(f, "}}")
    }
}
