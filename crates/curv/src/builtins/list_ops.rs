//! List operations.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    value::Value,
};

use super::builtin;

pub(super) fn install(ns: &mut IndexMap<Rc<str>, Value>) {
    builtin(ns, "len", len);
    builtin(ns, "reverse", reverse);
    builtin(ns, "sum", sum);
    builtin(ns, "is_list", |v, _| Ok(Value::Bool(v.as_list().is_some())));
}

fn expect_list<'a>(v: &'a Value, loc: &Location, who: &str) -> Result<&'a Rc<Vec<Value>>> {
    v.as_list().ok_or_else(|| CurvError::hard(Context::Phrase(loc.clone()), format!("{who}: expected a list, got a {}", v.type_name())))
}

fn len(v: &Value, loc: &Location) -> Result<Value> {
    Ok(Value::Num(expect_list(v, loc, "len")?.len() as f64))
}

fn reverse(v: &Value, loc: &Location) -> Result<Value> {
    let items = expect_list(v, loc, "reverse")?;
    let mut out = items.as_ref().clone();
    out.reverse();
    Ok(Value::List(Rc::new(out)))
}

fn sum(v: &Value, loc: &Location) -> Result<Value> {
    let items = expect_list(v, loc, "sum")?;
    let mut total = 0.0;
    for item in items.iter() {
        total += item.as_num().ok_or_else(|| CurvError::hard(Context::Phrase(loc.clone()), "sum: list must contain only numbers"))?;
    }
    Ok(Value::Num(total))
}
