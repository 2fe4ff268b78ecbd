//! Numeric constants and elementary functions.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{error::Result, location::Location, value::Value};

use super::{builtin, constant, expect_num, pair};

pub(super) fn install(ns: &mut IndexMap<Rc<str>, Value>) {
    constant(ns, "pi", Value::Num(std::f64::consts::PI));
    constant(ns, "tau", Value::Num(std::f64::consts::TAU));
    constant(ns, "inf", Value::Num(f64::INFINITY));

    builtin(ns, "sqrt", |v, l| Ok(Value::Num(expect_num(v, l, "sqrt")?.sqrt())));
    builtin(ns, "abs", |v, l| Ok(Value::Num(expect_num(v, l, "abs")?.abs())));
    builtin(ns, "floor", |v, l| Ok(Value::Num(expect_num(v, l, "floor")?.floor())));
    builtin(ns, "ceil", |v, l| Ok(Value::Num(expect_num(v, l, "ceil")?.ceil())));
    builtin(ns, "sin", |v, l| Ok(Value::Num(expect_num(v, l, "sin")?.sin())));
    builtin(ns, "cos", |v, l| Ok(Value::Num(expect_num(v, l, "cos")?.cos())));
    builtin(ns, "tan", |v, l| Ok(Value::Num(expect_num(v, l, "tan")?.tan())));
    builtin(ns, "is_num", |v, _| Ok(Value::Bool(v.as_num().is_some())));
    builtin(ns, "is_bool", |v, _| Ok(Value::Bool(matches!(v, Value::Bool(_)))));

    builtin(ns, "min", min2);
    builtin(ns, "max", max2);
    builtin(ns, "mod", modulo);
}

fn min2(arg: &Value, loc: &Location) -> Result<Value> {
    let (a, b) = pair(arg, loc, "min")?;
    Ok(Value::Num(expect_num(&a, loc, "min")?.min(expect_num(&b, loc, "min")?)))
}

fn max2(arg: &Value, loc: &Location) -> Result<Value> {
    let (a, b) = pair(arg, loc, "max")?;
    Ok(Value::Num(expect_num(&a, loc, "max")?.max(expect_num(&b, loc, "max")?)))
}

fn modulo(arg: &Value, loc: &Location) -> Result<Value> {
    let (a, b) = pair(arg, loc, "mod")?;
    let (a, b) = (expect_num(&a, loc, "mod")?, expect_num(&b, loc, "mod")?);
    Ok(Value::Num(a.rem_euclid(b)))
}
