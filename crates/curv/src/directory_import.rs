//! `include(path)`: reads another `.curv` file, or a whole directory of
//! them, relative to the including source file.
//!
//! A single file is scanned, parsed, analysed, and evaluated as a program,
//! yielding whatever record it produces. A directory becomes a record whose
//! fields are named after each member's file stem (`foo.curv` -> field
//! `foo`), evaluated lazily field-by-field the same way any other record
//! literal is — so an unused sibling file never has to parse successfully.
//!
//! Every file entered here is registered with [`System::enter_file`] for the
//! duration of its own analysis/evaluation and released with
//! [`System::leave_file`] on every exit path (success, soft failure, or a
//! panic unwind), via [`FileGuard`]'s `Drop`. Without this, `a.curv`
//! including `b.curv` including `a.curv` would recurse until the process's
//! stack overflows rather than raising a clean error.

use std::{fs, path::Path, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    module::Module,
    source::{Source, SourceKind},
    system::SystemHandle,
    value::Value,
};

/// Holds a file on the active-import stack until dropped, guaranteeing
/// [`System::leave_file`] runs on every exit path out of [`include_file`].
struct FileGuard<'a> {
    system: &'a SystemHandle,
    canonical_path: String,
}

impl<'a> FileGuard<'a> {
    fn enter(system: &'a SystemHandle, canonical_path: String, loc: &Location) -> Result<Self> {
        system.enter_file(&canonical_path, loc)?;
        Ok(Self { system, canonical_path })
    }
}

impl Drop for FileGuard<'_> {
    fn drop(&mut self) {
        self.system.leave_file(&self.canonical_path);
    }
}

pub fn include(path: &str, loc: &Location, system: &SystemHandle) -> Result<Value> {
    let base = Path::new(loc.scriptname()).parent().unwrap_or_else(|| Path::new("."));
    let target = base.join(path);

    let metadata = fs::metadata(&target)
        .map_err(|err| CurvError::hard(Context::Phrase(loc.clone()), format!("include: cannot read '{}': {err}", target.display())))?;

    if metadata.is_dir() {
        include_directory(&target, loc, system)
    } else {
        include_file(&target, loc, system)
    }
}

fn canonical_path_string(path: &Path) -> String {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()).to_string_lossy().into_owned()
}

fn include_file(path: &Path, loc: &Location, system: &SystemHandle) -> Result<Value> {
    let canonical = canonical_path_string(path);
    let _guard = FileGuard::enter(system, canonical, loc)?;

    let text = fs::read_to_string(path)
        .map_err(|err| CurvError::hard(Context::Phrase(loc.clone()), format!("include: error reading '{}': {err}", path.display())))?;
    let source = Source::new(path.display().to_string(), text, SourceKind::Curv);
    let program = crate::parser::parse_program(Rc::clone(&source))?;
    let (operation, thunks) = crate::analyser::analyse_program(&program, system.namespace())?;
    let top = crate::frame::Frame::new_root(thunks, Rc::clone(system), Some(loc.clone()));
    crate::meaning::operation::eval_operation(&operation, &top)
}

fn include_directory(dir: &Path, loc: &Location, system: &SystemHandle) -> Result<Value> {
    let entries = fs::read_dir(dir)
        .map_err(|err| CurvError::hard(Context::Phrase(loc.clone()), format!("include: cannot list '{}': {err}", dir.display())))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|err| CurvError::hard(Context::Phrase(loc.clone()), format!("include: error listing '{}': {err}", dir.display())))?;
        let file_path = entry.path();
        if file_path.extension().is_some_and(|ext| ext == "curv") {
            if let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) {
                names.push((Rc::<str>::from(stem), file_path));
            }
        }
    }
    names.sort_by(|a, b| a.0.cmp(&b.0));

    let mut name_index: IndexMap<Rc<str>, usize> = IndexMap::new();
    let mut thunks = Vec::with_capacity(names.len());
    for (i, (stem, file_path)) in names.into_iter().enumerate() {
        name_index.insert(stem, i);
        let member_loc = loc.clone();
        thunks.push(Some(Rc::new(crate::meaning::operation::Operation::Include {
            path: Box::new(crate::meaning::operation::Operation::Literal(Value::Str(Rc::from(
                file_path.to_string_lossy().into_owned(),
            )))),
            loc: member_loc,
        })));
    }

    let frame = crate::frame::Frame::new_root(thunks, Rc::clone(system), Some(loc.clone()));
    Ok(Value::Record(Module::new(name_index, frame)))
}
