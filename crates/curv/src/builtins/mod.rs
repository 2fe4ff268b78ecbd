//! The standard namespace: builtin constants and functions visible without
//! any `import`/`include`.
//!
//! Every multi-argument builtin takes its arguments as a single list value
//! (`f(a, b)` analyses to a call whose argument is `[a, b]`), mirroring how
//! user-defined curried-by-convention functions are called.

mod arithmetic;
mod list_ops;
mod record_ops;
mod shape_ops;
mod string_ops;

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{closure::Closure, value::Value};

pub fn standard_namespace() -> IndexMap<Rc<str>, Value> {
    let mut ns = IndexMap::new();
    arithmetic::install(&mut ns);
    list_ops::install(&mut ns);
    record_ops::install(&mut ns);
    string_ops::install(&mut ns);
    shape_ops::install(&mut ns);
    ns
}

fn builtin(ns: &mut IndexMap<Rc<str>, Value>, name: &'static str, func: fn(&Value, &crate::location::Location) -> crate::error::Result<Value>) {
    ns.insert(Rc::from(name), Value::Function(Rc::new(Closure::Builtin { name, func })));
}

fn constant(ns: &mut IndexMap<Rc<str>, Value>, name: &'static str, value: Value) {
    ns.insert(Rc::from(name), value);
}

/// Destructures a 2-element list argument, for binary builtins.
fn pair(arg: &Value, loc: &crate::location::Location, who: &str) -> crate::error::Result<(Value, Value)> {
    let Some(items) = arg.as_list() else {
        return Err(crate::error::CurvError::hard(
            crate::error::Context::Phrase(loc.clone()),
            format!("{who}: expected 2 arguments"),
        ));
    };
    if items.len() != 2 {
        return Err(crate::error::CurvError::hard(
            crate::error::Context::Phrase(loc.clone()),
            format!("{who}: expected 2 arguments, got {}", items.len()),
        ));
    }
    Ok((items[0].clone(), items[1].clone()))
}

fn expect_num(v: &Value, loc: &crate::location::Location, who: &str) -> crate::error::Result<f64> {
    v.as_num().ok_or_else(|| {
        crate::error::CurvError::hard(
            crate::error::Context::Phrase(loc.clone()),
            format!("{who}: expected a number, got a {}", v.type_name()),
        )
    })
}
