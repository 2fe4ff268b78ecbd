//! The diagnostic type threaded through scanning, parsing, analysis,
//! evaluation, and shape compilation.
//!
//! Every stage reports failures the same way: a message plus an optional
//! [`Location`] pinpointing where in the source it happened. This mirrors
//! the original implementation's `Exception`/`Context` split (`At_Phrase`,
//! `At_Arg`, `At_Field`, `At_Frame`, `At_SC_Frame`, ...) collapsed into a
//! single enum of *contexts*, since Rust's `?` operator makes a class
//! hierarchy of context types more ceremony than benefit here.

use std::fmt;

use crate::location::Location;

pub type Result<T> = std::result::Result<T, CurvError>;

/// Where a [`CurvError`] was attributed, mirroring the original `Context`
/// subclasses.
#[derive(Debug, Clone)]
pub enum Context {
    /// Blamed on a single phrase/sub-expression.
    Phrase(Location),
    /// Blamed on the Nth (0-based) argument to a call.
    Arg { index: usize, loc: Location },
    /// Blamed on a named record/module field.
    Field { name: String, loc: Location },
    /// Blamed on an evaluator stack frame with no more specific phrase.
    Frame(Location),
    /// Blamed on a Shape Compiler frame (symbolic evaluation).
    ScFrame(Location),
    /// No location available (e.g. a `--eval`-time I/O failure).
    None,
}

impl Context {
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Context::Phrase(l) | Context::Frame(l) | Context::ScFrame(l) => Some(l),
            Context::Arg { loc, .. } | Context::Field { loc, .. } => Some(loc),
            Context::None => None,
        }
    }
}

/// A soft or hard failure.
///
/// Soft failures are how pattern matching communicates "this pattern does
/// not match this value" without unwinding; they are turned into hard
/// failures (an actual error report) only at the point where no further
/// alternative can be tried. See [`CurvError::is_soft`].
///
/// `trace` accumulates one [`Location`] per call frame the error unwinds
/// through, innermost first, mirroring the original implementation's
/// per-`Exception` stack trace (a plain message there carries no location
/// at all until a frame attaches one on the way out).
#[derive(Debug, Clone)]
pub struct CurvError {
    pub message: String,
    pub context: Context,
    trace: Vec<Location>,
    soft: bool,
}

impl CurvError {
    #[must_use]
    pub fn hard(context: Context, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context,
            trace: Vec::new(),
            soft: false,
        }
    }

    #[must_use]
    pub fn soft(context: Context, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context,
            trace: Vec::new(),
            soft: true,
        }
    }

    #[must_use]
    pub fn syntax(loc: Location, message: impl Into<String>) -> Self {
        Self::hard(Context::Phrase(loc), message)
    }

    #[must_use]
    pub fn is_soft(&self) -> bool {
        self.soft
    }

    /// Turns a soft (pattern-match) failure into a hard one, used when the
    /// last alternative of a match has been tried and none matched.
    #[must_use]
    pub fn harden(mut self) -> Self {
        self.soft = false;
        self
    }

    /// Re-attributes this error to `context` if it does not already carry a
    /// more specific one. Used as the evaluator unwinds back through nested
    /// calls, so the innermost failure keeps its original blame.
    #[must_use]
    pub fn with_context_if_none(mut self, context: Context) -> Self {
        if matches!(self.context, Context::None) {
            self.context = context;
        }
        self
    }

    /// Appends a call-site `Location` to this error's trace, as the
    /// evaluator unwinds back out through one more function call. Called at
    /// every `Operation::Call` boundary, so a deeply nested failure reports
    /// every frame between it and the top level, innermost first.
    #[must_use]
    pub fn record_frame(mut self, loc: Location) -> Self {
        self.trace.push(loc);
        self
    }

    #[must_use]
    pub fn trace(&self) -> &[Location] {
        &self.trace
    }
}

impl fmt::Display for CurvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(loc) = self.context.location() {
            write!(f, "\n  {} {loc}", loc_prefix(&self.context))?;
        }
        for loc in &self.trace {
            write!(f, "\n  at {loc}")?;
        }
        Ok(())
    }
}

/// The word(s) introducing the blamed location on its own line, matching
/// the original implementation's `Context` subclasses' message rewriting.
/// Kept distinct from plain "at" only where the context narrows the blame
/// to something more specific than "this call frame".
fn loc_prefix(context: &Context) -> &'static str {
    match context {
        Context::Arg { .. } => "in argument,",
        Context::Field { .. } => "in field,",
        Context::ScFrame(_) => "while compiling shape,",
        _ => "at",
    }
}

impl std::error::Error for CurvError {}
