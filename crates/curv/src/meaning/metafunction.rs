//! Identifiers that the analyser treats specially rather than resolving to
//! an ordinary variable reference, used only when a call-style invocation
//! (`name(args...)`) targets one of these names and the name is not shadowed
//! by a local or builtin binding.
//!
//! `if`/`let`/`where` get dedicated grammar in the parser because their
//! argument structure (a condition plus two branches, a binding group plus a
//! body) does not fit ordinary call syntax. `include` and `sc_test` have no
//! special grammar at all: they are ordinary calls whose *analysis* differs
//! from a normal function call.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metafunction {
    /// `include(path_expr)`, splices a directory or file's record fields
    /// into the enclosing binding group.
    Include,
    /// `sc_test(shape, point)`, cross-checks the Shape Compiler's symbolic
    /// evaluation of `shape.dist` at `point` against plain evaluation.
    ScTest,
}

impl Metafunction {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "include" => Some(Metafunction::Include),
            "sc_test" => Some(Metafunction::ScTest),
            _ => None,
        }
    }
}
