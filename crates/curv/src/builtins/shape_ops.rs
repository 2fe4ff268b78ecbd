//! Shape constructors.
//!
//! `sphere`/`circle` build their `dist` field as an actual lambda over an
//! [`Operation`] tree (arithmetic, `sqrt`, and list indexing only) rather
//! than a native Rust closure, since the Shape Compiler needs to read that
//! tree to lower it to GLSL/C++; a builtin implemented directly in Rust
//! would be opaque to it.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    closure::Closure,
    error::Result,
    frame::Frame,
    location::Location,
    meaning::operation::Operation,
    module::Module,
    pattern::Pattern,
    phrase::BinaryOp,
    value::Value,
};

use super::{builtin, expect_num};

pub(super) fn install(ns: &mut IndexMap<Rc<str>, Value>) {
    builtin(ns, "sphere", sphere);
    builtin(ns, "circle", circle);
    builtin(ns, "is_shape", |v, _| Ok(Value::Bool(crate::shape::recognise(v).is_some())));
}

fn sqrt_builtin() -> Value {
    Value::Function(Rc::new(Closure::Builtin {
        name: "sqrt",
        func: |v, l| Ok(Value::Num(expect_num(v, l, "sqrt")?.sqrt())),
    }))
}

fn local_ref(index: usize, name: &str) -> Operation {
    Operation::LocalRef { index, name: Rc::from(name) }
}

fn nonlocal_ref(index: usize, name: &str) -> Operation {
    Operation::NonlocalRef { depth: 1, index, name: Rc::from(name) }
}

fn mul(a: Operation, b: Operation, loc: &Location) -> Operation {
    Operation::Binary { op: BinaryOp::Mul, left: Box::new(a), right: Box::new(b), loc: loc.clone() }
}

fn add(a: Operation, b: Operation, loc: &Location) -> Operation {
    Operation::Binary { op: BinaryOp::Add, left: Box::new(a), right: Box::new(b), loc: loc.clone() }
}

fn sub(a: Operation, b: Operation, loc: &Location) -> Operation {
    Operation::Binary { op: BinaryOp::Sub, left: Box::new(a), right: Box::new(b), loc: loc.clone() }
}

/// Builds `(point) -> sqrt(sum of point[0..ndims]^2) - r`, with `point`
/// destructured into `ndims` named components plus a trailing spread (to
/// tolerate the extra `w` / time component every shape point carries).
fn radial_dist_lambda(r: f64, ndims: usize, loc: &Location) -> Rc<Closure> {
    let outer = Frame::new(1, None, None);
    outer.set_eager(0, Value::Num(r));

    let names = ["x", "y", "z"];
    let items: Vec<Pattern> = (0..ndims)
        .map(|i| Pattern::Slot { index: i, name: Rc::from(names[i]) })
        .collect();
    let pattern = Pattern::List {
        items,
        spread: Some(Box::new(Pattern::Wildcard)),
    };

    let mut sum_sq = mul(local_ref(0, names[0]), local_ref(0, names[0]), loc);
    for i in 1..ndims {
        sum_sq = add(sum_sq, mul(local_ref(i, names[i]), local_ref(i, names[i]), loc), loc);
    }
    let sqrt_call = Operation::Call {
        func: Box::new(Operation::BuiltinRef(sqrt_builtin())),
        arg: Box::new(sum_sq),
        loc: loc.clone(),
    };
    let body = sub(sqrt_call, nonlocal_ref(0, "r"), loc);

    Rc::new(Closure::Lambda {
        name: Some(Rc::from("dist")),
        param: Rc::new(pattern),
        body: Rc::new(body),
        captured: outer,
        nslots: ndims,
        thunks: vec![None; ndims],
    })
}

/// Builds `(point) -> [r, g, b]`, a constant-colour field ignoring its
/// point argument entirely (`sphere`/`circle` have no per-point shading of
/// their own, just a solid material colour).
fn constant_colour_lambda(rgb: [f64; 3]) -> Rc<Closure> {
    let pattern = Pattern::Wildcard;
    let items = rgb.iter().map(|c| Operation::Literal(Value::Num(*c))).collect::<Vec<_>>();
    let body = Operation::ListCtor(items.into_iter().map(crate::meaning::operation::Generator::Item).collect());
    Rc::new(Closure::Lambda {
        name: Some(Rc::from("colour")),
        param: Rc::new(pattern),
        body: Rc::new(body),
        captured: Frame::new(0, None, None),
        nslots: 0,
        thunks: Vec::new(),
    })
}

/// The default material colour every `sphere`/`circle` gets when the user
/// doesn't override it: a neutral mid-grey, matching the reference
/// renderer's fallback shading for shapes with no explicit colour field.
const DEFAULT_COLOUR: [f64; 3] = [0.5, 0.5, 0.5];

fn sphere(arg: &Value, loc: &Location) -> Result<Value> {
    let r = expect_num(arg, loc, "sphere")?;
    let dist = radial_dist_lambda(r, 3, loc);
    let colour = constant_colour_lambda(DEFAULT_COLOUR);
    let mut fields = IndexMap::new();
    fields.insert(Rc::from("dist"), Value::Function(dist));
    fields.insert(Rc::from("colour"), Value::Function(colour));
    fields.insert(Rc::from("is_2d"), Value::Bool(false));
    fields.insert(Rc::from("is_3d"), Value::Bool(true));
    fields.insert(
        Rc::from("bbox"),
        Value::List(Rc::new(vec![
            Value::List(Rc::new(vec![Value::Num(-r), Value::Num(-r), Value::Num(-r)])),
            Value::List(Rc::new(vec![Value::Num(r), Value::Num(r), Value::Num(r)])),
        ])),
    );
    Ok(Value::Record(Module::new_eager(fields)))
}

fn circle(arg: &Value, loc: &Location) -> Result<Value> {
    let r = expect_num(arg, loc, "circle")?;
    let dist = radial_dist_lambda(r, 2, loc);
    let colour = constant_colour_lambda(DEFAULT_COLOUR);
    let mut fields = IndexMap::new();
    fields.insert(Rc::from("dist"), Value::Function(dist));
    fields.insert(Rc::from("colour"), Value::Function(colour));
    fields.insert(Rc::from("is_2d"), Value::Bool(true));
    fields.insert(Rc::from("is_3d"), Value::Bool(false));
    fields.insert(
        Rc::from("bbox"),
        Value::List(Rc::new(vec![
            Value::List(Rc::new(vec![Value::Num(-r), Value::Num(-r)])),
            Value::List(Rc::new(vec![Value::Num(r), Value::Num(r)])),
        ])),
    );
    Ok(Value::Record(Module::new_eager(fields)))
}

