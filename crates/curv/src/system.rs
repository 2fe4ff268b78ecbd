//! The embedding API: `System` is the handle a host driver (the CLI, or any
//! other embedder) passes into every compile, holding the root builtin
//! namespace, the file-extension importer table, and the cycle-detection
//! state `include` needs to reject `a.curv` importing `b.curv` importing
//! `a.curv`.
//!
//! Kept as instance state on `System` rather than process-wide globals
//! (`libcurv`'s reference implementation uses process globals for its
//! tempfile registry and deprecation flags; this is called out there as an
//! accidental limitation) so two `System`s can be driven from the same
//! process without interfering.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use ahash::AHashSet;

use crate::{
    builtins,
    error::{Context, CurvError, Result},
    location::Location,
};

/// One compile-time deprecation warning: printed at most once per `System`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeprecationFlag {
    WhereClause,
    DotStringField,
}

/// A file-extension importer: turns source text into a Curv value. The
/// built-in `.curv`/directory cases are handled directly by
/// [`crate::directory_import`]; this table is how a host registers extra
/// ones (e.g. a GUI embedder adding `.png`).
pub type Importer = fn(&str, &Location) -> Result<crate::value::Value>;

pub struct System {
    namespace: crate::analyser::Namespace,
    importers: RefCell<HashMap<String, Importer>>,
    active_files: RefCell<AHashSet<String>>,
    warned: RefCell<AHashSet<DeprecationFlag>>,
    /// When set, the evaluator raises a "user interrupted" error at its next
    /// safe point (call dispatch, generator emission, primitive entry).
    pub interrupted: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl System {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: builtins::standard_namespace(),
            importers: RefCell::new(HashMap::new()),
            active_files: RefCell::new(AHashSet::default()),
            warned: RefCell::new(AHashSet::default()),
            interrupted: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &crate::analyser::Namespace {
        &self.namespace
    }

    pub fn register_importer(&self, extension: impl Into<String>, importer: Importer) {
        self.importers.borrow_mut().insert(extension.into().to_lowercase(), importer);
    }

    #[must_use]
    pub fn importer_for(&self, extension: &str) -> Option<Importer> {
        self.importers.borrow().get(&extension.to_lowercase()).copied()
    }

    /// Marks `canonical_path` as currently being imported, failing if it is
    /// already on the active-import stack (a cyclic `include`). The caller
    /// must call [`System::leave_file`] on every exit path, including errors.
    pub fn enter_file(&self, canonical_path: &str, loc: &Location) -> Result<()> {
        let mut active = self.active_files.borrow_mut();
        if !active.insert(canonical_path.to_string()) {
            return Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                format!("illegal recursive reference to file '{canonical_path}'"),
            ));
        }
        Ok(())
    }

    pub fn leave_file(&self, canonical_path: &str) {
        self.active_files.borrow_mut().remove(canonical_path);
    }

    /// Prints `message` to the error sink the first time `flag` is raised in
    /// this `System`'s lifetime, and is silent on every later call.
    pub fn deprecate(&self, flag: DeprecationFlag, message: &str) {
        if self.warned.borrow_mut().insert(flag) {
            eprintln!("warning: {message}");
        }
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("namespace_size", &self.namespace.len())
            .field("active_files", &self.active_files.borrow().len())
            .finish()
    }
}

/// A reference-counted handle to a `System`, as embedded in a [`crate::program::Program`].
pub type SystemHandle = Rc<System>;
