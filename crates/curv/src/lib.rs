//! Curv: a pure, functional language for procedurally generated 2D/3D
//! shapes, scanned and parsed into a source-preserving [`phrase`] tree,
//! lowered by [`analyser`] into a slot-indexed [`meaning::operation`] tree,
//! run by a tree-walking evaluator over tagged [`value::Value`]s, and
//! (for a restricted subset of shape functions) symbolically lowered by
//! [`sc`] to GLSL/C++ shader source.

pub mod analyser;
pub mod builtins;
pub mod closure;
pub mod directory_import;
pub mod error;
pub mod frame;
pub mod gpu_json;
pub mod intern;
pub mod location;
pub mod meaning;
pub mod module;
pub mod parser;
pub mod pattern;
pub mod phrase;
pub mod program;
pub mod reactive;
pub mod sc;
pub mod scanner;
pub mod shape;
pub mod source;
pub mod system;
pub mod token;
pub mod value;

pub use error::{CurvError, Result};
pub use program::Program;
pub use source::Source;
pub use system::System;
pub use value::Value;
