//! `Program`: a single compile-then-evaluate session over one [`Source`],
//! the shape a host embedder (the CLI, or any other driver) interacts with.
//!
//! `Program::compile` scans, parses, and analyses; `Program::eval` runs the
//! analysed operation tree once against a fresh top-level [`Frame`].
//! `Program::denotes` additionally classifies the result as a record of
//! named definitions, a list of elements, or neither — for programs whose
//! final phrase is a sequence of generators rather than a single
//! expression (a `.curv` file of the form `x = 1; y = 2; [x, y]` can be
//! read either as a value or as its module of named fields).

use std::rc::Rc;

use crate::{
    error::Result,
    frame::Frame,
    location::Location,
    meaning::operation::{eval_operation, Operation},
    module::Module,
    source::Source,
    system::SystemHandle,
    value::Value,
};

pub struct Program {
    system: SystemHandle,
    source: Rc<Source>,
    operation: Option<Rc<Operation>>,
    /// Thunks for this program's top-level `let`/`where` bindings,
    /// flattened into its root frame alongside the (empty, since a program
    /// has no parameters) eager slot space.
    thunks: Vec<Option<Rc<Operation>>>,
    parent_frame: Option<Rc<Frame>>,
}

impl Program {
    #[must_use]
    pub fn new(system: SystemHandle, source: Rc<Source>, parent_frame: Option<Rc<Frame>>) -> Self {
        Self {
            system,
            source,
            operation: None,
            thunks: Vec::new(),
            parent_frame,
        }
    }

    /// Scans, parses, and analyses this program's source against the
    /// owning `System`'s namespace. Must be called before `eval`/`denotes`.
    pub fn compile(&mut self) -> Result<()> {
        let phrase = crate::parser::parse_program(Rc::clone(&self.source))?;
        let (operation, thunks) = crate::analyser::analyse_program(&phrase, self.system.namespace())?;
        self.operation = Some(operation);
        self.thunks = thunks;
        Ok(())
    }

    /// A program nested inside another scope (`parent_frame` is `Some`)
    /// gets an ordinary frame that inherits `System` through that parent's
    /// `nonlocal` chain; a standalone top-level program has no lexical
    /// parent at all, so it must be given the `System` explicitly.
    fn root_frame(&self) -> Rc<Frame> {
        match &self.parent_frame {
            Some(parent) => Frame::new_with_thunks(self.thunks.clone(), Some(Rc::clone(parent)), None),
            None => Frame::new_root(self.thunks.clone(), Rc::clone(&self.system), None),
        }
    }

    fn compiled(&self) -> &Rc<Operation> {
        self.operation.as_ref().expect("Program::compile must run before evaluation")
    }

    /// Evaluates the compiled program once, returning whatever `Value` its
    /// top-level phrase produces.
    pub fn eval(&self) -> Result<Value> {
        let frame = self.root_frame();
        eval_operation(self.compiled(), &frame)
    }

    /// Evaluates the program and classifies its result: a record becomes
    /// the module half, a list becomes the element-list half, and anything
    /// else yields `(None, None)` (the value was meaningful only for its
    /// side effects / as a plain scalar result, use `eval` instead).
    pub fn denotes(&self) -> Result<(Option<Rc<Module>>, Option<Vec<Value>>)> {
        match self.eval()? {
            Value::Record(module) => Ok((Some(module), None)),
            Value::List(items) => Ok((None, Some(items.as_ref().clone()))),
            _ => Ok((None, None)),
        }
    }

    #[must_use]
    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    #[must_use]
    pub fn system(&self) -> &SystemHandle {
        &self.system
    }

    /// A zero-span `Location` at the start of this program's source, used to
    /// attribute errors that happen outside of any specific phrase (e.g.
    /// top-level I/O failures).
    #[must_use]
    pub fn start_location(&self) -> Location {
        Location::new(Rc::clone(&self.source), crate::token::Token::new(0, 0, 0, crate::token::TokenKind::EndOfSource))
    }
}
