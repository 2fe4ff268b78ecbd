//! String operations.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    value::Value,
};

use super::builtin;

pub(super) fn install(ns: &mut IndexMap<Rc<str>, Value>) {
    builtin(ns, "is_string", |v, _| Ok(Value::Bool(matches!(v, Value::Str(_)))));
    builtin(ns, "strlen", strlen);
}

fn strlen(v: &Value, loc: &Location) -> Result<Value> {
    let Value::Str(s) = v else {
        return Err(CurvError::hard(Context::Phrase(loc.clone()), format!("strlen: expected a string, got a {}", v.type_name())));
    };
    Ok(Value::Num(s.chars().count() as f64))
}
