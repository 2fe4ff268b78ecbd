//! String interning for record field names, symbols, and builtin names.
//!
//! Field/symbol names are compared and hashed constantly during evaluation
//! (record construction, field lookup, builtin dispatch), so we dedupe them
//! into a single `Rc<str>` allocation per distinct name and let every other
//! use clone the `Rc`. A plain `ahash`-backed set does the deduping; there is
//! no need for the slab/arena machinery a `HeapId`-based value model would
//! require, since `Rc<str>` is already cheap to share and free.

use std::rc::Rc;

use ahash::AHashSet;

#[derive(Debug, Default)]
pub struct Interner {
    strings: AHashSet<Rc<str>>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical `Rc<str>` for `name`, allocating one the first
    /// time it is seen.
    pub fn intern(&mut self, name: &str) -> Rc<str> {
        if let Some(existing) = self.strings.get(name) {
            return Rc::clone(existing);
        }
        let rc: Rc<str> = Rc::from(name);
        self.strings.insert(Rc::clone(&rc));
        rc
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedupes_allocations() {
        let mut interner = Interner::new();
        let a = interner.intern("radius");
        let b = interner.intern("radius");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }
}
