//! The analysed ("Meaning") tree and its evaluator.
//!
//! [`operation`] holds the desugared [`operation::Operation`] tree every
//! phrase is lowered to and the tree-walking evaluator over it;
//! [`metafunction`] names the handful of identifiers (`if`, `include`,
//! `sc_test`) that are analysed specially rather than treated as ordinary
//! function calls.

pub mod metafunction;
pub mod operation;
