//! Record operations.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    value::Value,
};

use super::builtin;

pub(super) fn install(ns: &mut IndexMap<Rc<str>, Value>) {
    builtin(ns, "is_record", |v, _| Ok(Value::Bool(v.as_record().is_some())));
    builtin(ns, "fields", fields);
}

fn fields(v: &Value, loc: &Location) -> Result<Value> {
    let Some(record) = v.as_record() else {
        return Err(CurvError::hard(Context::Phrase(loc.clone()), format!("fields: expected a record, got a {}", v.type_name())));
    };
    let names = record.field_names().map(|n| Value::Symbol(Rc::clone(n))).collect();
    Ok(Value::List(Rc::new(names)))
}
