//! The concrete syntax tree produced by the parser.
//!
//! A `Phrase` preserves every token of the source it was parsed from (via
//! the [`Location`] each variant carries), so it can be used for anything
//! from analysis to an eventual source-to-source rewrite tool. Ownership is
//! strictly tree-shaped: a parent phrase owns its children.

use std::rc::Rc;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `a : b`, a field/labelled-value pair inside a record literal.
    Field,
    /// `a => b`, a piecewise-function match arm.
    MatchArm,
    /// `a . b`, attribute/field projection.
    Dot,
    /// `a .. b`, a range.
    Range,
}

/// One item inside a record literal or a `where`/`let`/`parametric` binding
/// group: either a single definition (`pattern = value`) or a sequence of
/// them separated by `;` (a recursive binding group, per §4.3).
#[derive(Debug, Clone)]
pub struct DefinitionGroup {
    pub items: Vec<Phrase>,
    pub loc: Location,
}

/// A concrete syntax tree node.
///
/// Every variant stores a [`Location`] spanning exactly the tokens it was
/// built from; use [`Phrase::location`] to recover it generically.
#[derive(Debug, Clone)]
pub enum Phrase {
    Empty(Location),
    Identifier(Location, Rc<str>),
    Numeral(Location),
    /// A non-interpolated string literal; `text` has escapes already
    /// resolved.
    Str(Location, Rc<str>),
    Unary {
        op: UnaryOp,
        arg: Box<Phrase>,
        loc: Location,
    },
    Binary {
        op: BinaryOp,
        left: Box<Phrase>,
        right: Box<Phrase>,
        loc: Location,
    },
    /// `f x`, function application by juxtaposition or `f(x)`.
    Call {
        func: Box<Phrase>,
        arg: Box<Phrase>,
        loc: Location,
    },
    /// `a[i]`, subscript indexing (distinct from `.` field access).
    Index {
        base: Box<Phrase>,
        index: Box<Phrase>,
        loc: Location,
    },
    List {
        items: Vec<Phrase>,
        loc: Location,
    },
    Record {
        fields: Vec<Phrase>,
        loc: Location,
    },
    /// A parenthesised phrase with no comma at top level: `(a + b)`.
    Paren {
        inner: Box<Phrase>,
        loc: Location,
    },
    /// `a, b, c` — builds a list/tuple of its items.
    Comma {
        items: Vec<Phrase>,
        loc: Location,
    },
    /// `a; b; c` — a sequence of actions/generators, last one may yield a
    /// value.
    Semicolon {
        items: Vec<Phrase>,
        loc: Location,
    },
    Program {
        body: Box<Phrase>,
        loc: Location,
    },
    Let {
        defs: DefinitionGroup,
        body: Box<Phrase>,
        loc: Location,
    },
    Where {
        body: Box<Phrase>,
        defs: DefinitionGroup,
        loc: Location,
    },
    /// `if (cond) consequent [else alternative]`. With no `else`, this is an
    /// action/generator filter rather than a value-producing expression.
    If {
        cond: Box<Phrase>,
        then_branch: Box<Phrase>,
        else_branch: Option<Box<Phrase>>,
        loc: Location,
    },
    /// `target := value`, a local-variable assignment (only legal on names
    /// introduced by `var` inside a block).
    Assignment {
        target: Box<Phrase>,
        value: Box<Phrase>,
        loc: Location,
    },
    /// `pattern = value`.
    Definition {
        pattern: Box<Phrase>,
        value: Box<Phrase>,
        loc: Location,
    },
    /// `pattern -> body`.
    Lambda {
        pattern: Box<Phrase>,
        body: Box<Phrase>,
        loc: Location,
    },
    /// `pattern :: type_expr`, a type-annotated pattern.
    TypeAnnotation {
        pattern: Box<Phrase>,
        type_expr: Box<Phrase>,
        loc: Location,
    },
    /// `_`, a wildcard pattern.
    Wildcard(Location),
    /// `...expr`, a spread inside a list or record literal, or a variadic
    /// tail inside a list pattern.
    Spread {
        arg: Box<Phrase>,
        loc: Location,
    },
    For {
        pattern: Box<Phrase>,
        iter: Box<Phrase>,
        body: Box<Phrase>,
        loc: Location,
    },
    While {
        cond: Box<Phrase>,
        body: Box<Phrase>,
        loc: Location,
    },
    /// `do a; b in body`.
    Do {
        actions: Vec<Phrase>,
        body: Box<Phrase>,
        loc: Location,
    },
    /// `parametric defs in body`.
    Parametric {
        defs: DefinitionGroup,
        body: Box<Phrase>,
        loc: Location,
    },
}

impl Phrase {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Phrase::Empty(loc)
            | Phrase::Identifier(loc, _)
            | Phrase::Numeral(loc)
            | Phrase::Str(loc, _)
            | Phrase::Wildcard(loc)
            | Phrase::Unary { loc, .. }
            | Phrase::Binary { loc, .. }
            | Phrase::Call { loc, .. }
            | Phrase::Index { loc, .. }
            | Phrase::List { loc, .. }
            | Phrase::Record { loc, .. }
            | Phrase::Paren { loc, .. }
            | Phrase::Comma { loc, .. }
            | Phrase::Semicolon { loc, .. }
            | Phrase::Program { loc, .. }
            | Phrase::Let { loc, .. }
            | Phrase::Where { loc, .. }
            | Phrase::If { loc, .. }
            | Phrase::Assignment { loc, .. }
            | Phrase::Definition { loc, .. }
            | Phrase::Lambda { loc, .. }
            | Phrase::TypeAnnotation { loc, .. }
            | Phrase::Spread { loc, .. }
            | Phrase::For { loc, .. }
            | Phrase::While { loc, .. }
            | Phrase::Do { loc, .. }
            | Phrase::Parametric { loc, .. } => loc,
        }
    }

    /// Strips `Program`, `Let`, `Where`, and non-tuple `Paren` wrappers to
    /// expose the "essential" phrase underneath. Used by shape recognition
    /// (a `let`-bound record literal is still recognisable as a shape) and
    /// by value-phrase printing.
    #[must_use]
    pub fn nub(&self) -> &Phrase {
        match self {
            Phrase::Program { body, .. } | Phrase::Paren { inner: body, .. } => body.nub(),
            Phrase::Let { body, .. } | Phrase::Where { body, .. } => body.nub(),
            other => other,
        }
    }
}
