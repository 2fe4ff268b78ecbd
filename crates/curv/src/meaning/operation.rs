//! The analysed operation tree and its tree-walking evaluator.
//!
//! Every [`crate::phrase::Phrase`] is lowered by the analyser into an
//! `Operation`: variable references become slot indices, `if`/`let`/`where`
//! keep their shape but lose their surface syntax, and list/record literals
//! become a list of [`Generator`]s (plain items, `for`/`if` comprehension
//! clauses, and spreads all share this one evaluation path).

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    closure::Closure,
    error::{Context, CurvError, Result},
    frame::Frame,
    location::Location,
    module::Module,
    pattern::Pattern,
    phrase::{BinaryOp, UnaryOp},
    value::Value,
};

#[derive(Debug)]
pub enum Operation {
    Literal(Value),
    LocalRef {
        index: usize,
        name: Rc<str>,
    },
    NonlocalRef {
        depth: usize,
        index: usize,
        name: Rc<str>,
    },
    /// A reference to a name resolved at analysis time to a builtin value
    /// (a function or a constant like `pi`).
    BuiltinRef(Value),
    Unary {
        op: UnaryOp,
        arg: Box<Operation>,
        loc: Location,
    },
    Binary {
        op: BinaryOp,
        left: Box<Operation>,
        right: Box<Operation>,
        loc: Location,
    },
    Call {
        func: Box<Operation>,
        arg: Box<Operation>,
        loc: Location,
    },
    Index {
        base: Box<Operation>,
        index: Box<Operation>,
        loc: Location,
    },
    DotField {
        base: Box<Operation>,
        name: Rc<str>,
        loc: Location,
    },
    ListCtor(Vec<Generator>),
    RecordCtor(Vec<Generator>),
    If {
        cond: Box<Operation>,
        then_branch: Box<Operation>,
        else_branch: Option<Box<Operation>>,
        loc: Location,
    },
    Lambda {
        name: Option<Rc<str>>,
        param: Rc<Pattern>,
        body: Rc<Operation>,
        nslots: usize,
        /// Thunks for `let`/`where` bindings flattened into this lambda's
        /// call frame, alongside its (eager, `None`) parameter slots.
        thunks: Vec<Option<Rc<Operation>>>,
        loc: Location,
    },
    /// A chain of `pattern => body` match arms: each `arms` entry is an
    /// `Operation::Lambda`, evaluated to a Closure and collected into one
    /// `Closure::Piecewise`.
    Piecewise {
        arms: Vec<Operation>,
        loc: Location,
    },
    /// A semicolon-joined sequence; every item but the last is evaluated for
    /// its side effect on shared frame slots (only meaningful once mutable
    /// `var` bindings exist) and its value discarded.
    Sequence(Vec<Operation>),
    /// `include(path)`: reads and evaluates another `.curv` file (or
    /// directory) relative to the including source and yields its record of
    /// fields.
    Include {
        path: Box<Operation>,
        loc: Location,
    },
    /// `sc_test(shape, point)`: cross-checks the Shape Compiler's symbolic
    /// evaluation of `shape.dist` at `point` against plain evaluation.
    ScTest {
        shape: Box<Operation>,
        point: Box<Operation>,
        loc: Location,
    },
}

/// One clause of a list/record comprehension. List context: `Item` yields
/// one element, `Field` is illegal. Record context: `Field` yields one
/// field, `Item` is illegal unless it evaluates to a record (then its
/// fields are merged, as `Spread` does explicitly).
#[derive(Debug)]
pub enum Generator {
    Item(Operation),
    Field(Rc<str>, Operation),
    Spread(Operation),
    If {
        cond: Operation,
        body: Box<Generator>,
    },
    For {
        pattern: Rc<Pattern>,
        nslots: usize,
        /// Thunks for any `let`/`where` bindings flattened into each
        /// iteration's frame, alongside the (eager) pattern slots.
        thunks: Vec<Option<Rc<Operation>>>,
        iter: Operation,
        body: Box<Generator>,
        loc: Location,
    },
}

pub fn eval_operation(op: &Operation, frame: &Rc<Frame>) -> Result<Value> {
    match op {
        Operation::Literal(v) | Operation::BuiltinRef(v) => Ok(v.clone()),
        Operation::LocalRef { index, name } => frame.read_local(*index, name),
        Operation::NonlocalRef { depth, index, name } => frame.read_nonlocal(*depth, *index, name),
        Operation::Unary { op, arg, loc } => eval_unary(*op, eval_operation(arg, frame)?, loc),
        Operation::Binary { op, left, right, loc } => {
            eval_binary(*op, left.as_ref(), right.as_ref(), frame, loc)
        }
        Operation::Call { func, arg, loc } => {
            let f = eval_operation(func, frame)?;
            let a = eval_operation(arg, frame)?;
            let Value::Function(closure) = f else {
                return Err(CurvError::hard(
                    Context::Phrase(loc.clone()),
                    format!("called a {} as a function", f.type_name()),
                ));
            };
            closure
                .call(&a, loc)
                .map_err(|e| e.with_context_if_none(Context::Frame(loc.clone())).record_frame(loc.clone()))
        }
        Operation::Index { base, index, loc } => {
            let b = eval_operation(base, frame)?;
            let i = eval_operation(index, frame)?;
            eval_index(&b, &i, loc)
        }
        Operation::DotField { base, name, loc } => {
            let b = eval_operation(base, frame)?;
            let Some(record) = b.as_record() else {
                return Err(CurvError::hard(
                    Context::Phrase(loc.clone()),
                    format!("'.{name}': not a record"),
                ));
            };
            record.get(name)?.ok_or_else(|| {
                CurvError::hard(Context::Phrase(loc.clone()), format!("record has no field named '{name}'"))
            })
        }
        Operation::ListCtor(gens) => {
            let mut out = Vec::new();
            for gen in gens {
                eval_list_generator(gen, frame, &mut out)?;
            }
            Ok(Value::List(Rc::new(out)))
        }
        Operation::RecordCtor(gens) => {
            let mut out = IndexMap::new();
            for gen in gens {
                eval_record_generator(gen, frame, &mut out)?;
            }
            Ok(Value::Record(Module::new_eager(out)))
        }
        Operation::If {
            cond,
            then_branch,
            else_branch,
            loc,
        } => {
            let c = eval_operation(cond, frame)?;
            let Some(b) = c.as_bool() else {
                return Err(CurvError::hard(
                    Context::Phrase(loc.clone()),
                    format!("if: condition is a {}, not a boolean", c.type_name()),
                ));
            };
            if b {
                eval_operation(then_branch, frame)
            } else if let Some(e) = else_branch {
                eval_operation(e, frame)
            } else {
                Err(CurvError::hard(Context::Phrase(loc.clone()), "if: missing else branch"))
            }
        }
        Operation::Lambda {
            name,
            param,
            body,
            nslots,
            thunks,
            ..
        } => Ok(Value::Function(Rc::new(Closure::Lambda {
            name: name.clone(),
            param: Rc::clone(param),
            body: Rc::clone(body),
            captured: Rc::clone(frame),
            nslots: *nslots,
            thunks: thunks.clone(),
        }))),
        Operation::Piecewise { arms, .. } => {
            let mut closures = Vec::with_capacity(arms.len());
            for arm in arms {
                let Value::Function(closure) = eval_operation(arm, frame)? else {
                    unreachable!("a piecewise arm is always compiled to an Operation::Lambda")
                };
                closures.push(closure);
            }
            Ok(Value::Function(Rc::new(Closure::Piecewise(closures))))
        }
        Operation::Sequence(items) => {
            let mut last = Value::Bool(false);
            for item in items {
                last = eval_operation(item, frame)?;
            }
            Ok(last)
        }
        Operation::Include { path, loc } => {
            let p = eval_operation(path, frame)?;
            let Value::Str(path_text) = p else {
                return Err(CurvError::hard(
                    Context::Phrase(loc.clone()),
                    format!("include: path must be a string, got a {}", p.type_name()),
                ));
            };
            let system = frame.system().expect("every evaluation frame has a System, set at the program root");
            crate::directory_import::include(&path_text, loc, system)
        }
        Operation::ScTest { shape, point, loc } => {
            let shape_val = eval_operation(shape, frame)?;
            let point_val = eval_operation(point, frame)?;
            crate::sc::test_shape_at_point(&shape_val, &point_val, loc)
        }
    }
}

fn eval_list_generator(gen: &Generator, frame: &Rc<Frame>, out: &mut Vec<Value>) -> Result<()> {
    match gen {
        Generator::Item(op) => {
            out.push(eval_operation(op, frame)?);
            Ok(())
        }
        Generator::Field(name, op) => {
            let _ = (name, op);
            unreachable!("field generator inside list literal should be rejected by the analyser")
        }
        Generator::Spread(op) => {
            let v = eval_operation(op, frame)?;
            match v.as_list() {
                Some(items) => out.extend(items.iter().cloned()),
                None => {
                    return Err(CurvError::hard(
                        Context::None,
                        format!("...: cannot spread a {} into a list", v.type_name()),
                    ))
                }
            }
            Ok(())
        }
        Generator::If { cond, body } => {
            let c = eval_operation(cond, frame)?;
            if c.as_bool().unwrap_or(false) {
                eval_list_generator(body, frame, out)?;
            }
            Ok(())
        }
        Generator::For {
            pattern,
            nslots,
            thunks,
            iter,
            body,
            loc,
        } => {
            let iterable = eval_operation(iter, frame)?;
            let items = iterable.as_list().ok_or_else(|| {
                CurvError::hard(Context::Phrase(loc.clone()), format!("for: cannot iterate over a {}", iterable.type_name()))
            })?;
            debug_assert_eq!(thunks.len(), *nslots);
            for item in items.iter() {
                let loop_frame = Frame::new_with_thunks(thunks.clone(), Some(Rc::clone(frame)), Some(loc.clone()));
                pattern.bind(item, &loop_frame, loc)?;
                eval_list_generator(body, &loop_frame, out)?;
            }
            Ok(())
        }
    }
}

fn eval_record_generator(gen: &Generator, frame: &Rc<Frame>, out: &mut IndexMap<Rc<str>, Value>) -> Result<()> {
    match gen {
        Generator::Field(name, op) => {
            out.insert(Rc::clone(name), eval_operation(op, frame)?);
            Ok(())
        }
        Generator::Item(op) => {
            let v = eval_operation(op, frame)?;
            let Some(record) = v.as_record() else {
                return Err(CurvError::hard(
                    Context::None,
                    format!("record literal item must be a field, got a {}", v.type_name()),
                ));
            };
            for name in record.field_names() {
                if let Some(fv) = record.get(name)? {
                    out.insert(Rc::clone(name), fv);
                }
            }
            Ok(())
        }
        Generator::Spread(op) => {
            let v = eval_operation(op, frame)?;
            let Some(record) = v.as_record() else {
                return Err(CurvError::hard(
                    Context::None,
                    format!("...: cannot spread a {} into a record", v.type_name()),
                ));
            };
            for name in record.field_names() {
                if let Some(fv) = record.get(name)? {
                    out.insert(Rc::clone(name), fv);
                }
            }
            Ok(())
        }
        Generator::If { cond, body } => {
            let c = eval_operation(cond, frame)?;
            if c.as_bool().unwrap_or(false) {
                eval_record_generator(body, frame, out)?;
            }
            Ok(())
        }
        Generator::For {
            pattern,
            nslots,
            thunks,
            iter,
            body,
            loc,
        } => {
            let iterable = eval_operation(iter, frame)?;
            let items = iterable.as_list().ok_or_else(|| {
                CurvError::hard(Context::Phrase(loc.clone()), format!("for: cannot iterate over a {}", iterable.type_name()))
            })?;
            debug_assert_eq!(thunks.len(), *nslots);
            for item in items.iter() {
                let loop_frame = Frame::new_with_thunks(thunks.clone(), Some(Rc::clone(frame)), Some(loc.clone()));
                pattern.bind(item, &loop_frame, loc)?;
                eval_record_generator(body, &loop_frame, out)?;
            }
            Ok(())
        }
    }
}

fn eval_index(base: &Value, index: &Value, loc: &Location) -> Result<Value> {
    match (base, index) {
        (Value::List(items), Value::Num(n)) => {
            let i = *n as i64;
            if i < 0 || i as usize >= items.len() {
                return Err(CurvError::hard(Context::Phrase(loc.clone()), format!("index {i} out of bounds")));
            }
            Ok(items[i as usize].clone())
        }
        (Value::List(_), Value::List(idx)) => {
            let mut out = Vec::with_capacity(idx.len());
            for i in idx.iter() {
                out.push(eval_index(base, i, loc)?);
            }
            Ok(Value::List(Rc::new(out)))
        }
        (Value::Record(record), Value::Symbol(name) | Value::Str(name)) => record
            .get(name)?
            .ok_or_else(|| CurvError::hard(Context::Phrase(loc.clone()), format!("record has no field named '{name}'"))),
        _ => Err(CurvError::hard(
            Context::Phrase(loc.clone()),
            format!("cannot index a {} with a {}", base.type_name(), index.type_name()),
        )),
    }
}

fn eval_unary(op: UnaryOp, v: Value, loc: &Location) -> Result<Value> {
    use crate::reactive::ReactiveExpression;
    match (op, &v) {
        (UnaryOp::Negate, Value::Num(n)) => Ok(Value::Num(-n)),
        (UnaryOp::Plus, Value::Num(n)) => Ok(Value::Num(*n)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (_, Value::Reactive(expr)) => Ok(Value::Reactive(Rc::new(ReactiveExpression::Unary(op, Rc::clone(expr))))),
        _ => Err(CurvError::hard(
            Context::Phrase(loc.clone()),
            format!("{op:?}: wrong argument type {}", v.type_name()),
        )),
    }
}

fn eval_binary(op: BinaryOp, left: &Operation, right: &Operation, frame: &Rc<Frame>, loc: &Location) -> Result<Value> {
    use crate::reactive::ReactiveExpression;

    // `&&`/`||` short-circuit, so the right operand is evaluated lazily.
    if op == BinaryOp::And {
        let l = eval_operation(left, frame)?;
        return match l.as_bool() {
            Some(false) => Ok(Value::Bool(false)),
            Some(true) => eval_operation(right, frame),
            None => Err(CurvError::hard(Context::Phrase(loc.clone()), "&&: left operand is not a boolean")),
        };
    }
    if op == BinaryOp::Or {
        let l = eval_operation(left, frame)?;
        return match l.as_bool() {
            Some(true) => Ok(Value::Bool(true)),
            Some(false) => eval_operation(right, frame),
            None => Err(CurvError::hard(Context::Phrase(loc.clone()), "||: left operand is not a boolean")),
        };
    }

    let l = eval_operation(left, frame)?;
    let r = eval_operation(right, frame)?;

    if op == BinaryOp::Eq {
        return Ok(Value::Bool(l.equal(&r)));
    }
    if op == BinaryOp::Neq {
        return Ok(Value::Bool(!l.equal(&r)));
    }

    if let (Value::Num(a), Value::Num(b)) = (&l, &r) {
        return eval_numeric_binary(op, *a, *b, loc);
    }
    if matches!(l, Value::Reactive(_)) || matches!(r, Value::Reactive(_)) {
        if let (Some(_), Some(_)) = (as_reactive_operand(&l), as_reactive_operand(&r)) {
            let a = as_reactive_operand(&l).unwrap();
            let b = as_reactive_operand(&r).unwrap();
            return Ok(Value::Reactive(Rc::new(ReactiveExpression::Binary(op, a, b))));
        }
    }
    if op == BinaryOp::Add {
        if let (Value::Str(a), Value::Str(b)) = (&l, &r) {
            return Ok(Value::Str(Rc::from(format!("{a}{b}"))));
        }
        if let (Value::List(a), Value::List(b)) = (&l, &r) {
            let mut out = Vec::with_capacity(a.len() + b.len());
            out.extend(a.iter().cloned());
            out.extend(b.iter().cloned());
            return Ok(Value::List(Rc::new(out)));
        }
    }
    Err(CurvError::hard(
        Context::Phrase(loc.clone()),
        format!("{op:?}: wrong argument types ({}, {})", l.type_name(), r.type_name()),
    ))
}

fn as_reactive_operand(v: &Value) -> Option<Rc<crate::reactive::ReactiveExpression>> {
    match v {
        Value::Reactive(r) => Some(Rc::clone(r)),
        Value::Num(n) => Some(Rc::new(crate::reactive::ReactiveExpression::Const(*n))),
        _ => None,
    }
}

fn eval_numeric_binary(op: BinaryOp, a: f64, b: f64, loc: &Location) -> Result<Value> {
    let num = |x: f64| Ok(Value::Num(x));
    let boolean = |x: bool| Ok(Value::Bool(x));
    match op {
        BinaryOp::Add => num(a + b),
        BinaryOp::Sub => num(a - b),
        BinaryOp::Mul => num(a * b),
        BinaryOp::Div => num(a / b),
        BinaryOp::Pow => num(a.powf(b)),
        BinaryOp::Lt => boolean(a < b),
        BinaryOp::Le => boolean(a <= b),
        BinaryOp::Gt => boolean(a > b),
        BinaryOp::Ge => boolean(a >= b),
        BinaryOp::Range => {
            let mut out = Vec::new();
            let mut x = a;
            while x < b {
                out.push(Value::Num(x));
                x += 1.0;
            }
            Ok(Value::List(Rc::new(out)))
        }
        BinaryOp::Eq | BinaryOp::Neq | BinaryOp::And | BinaryOp::Or => {
            unreachable!("handled before reaching eval_numeric_binary")
        }
        BinaryOp::Field | BinaryOp::MatchArm | BinaryOp::Dot => Err(CurvError::hard(
            Context::Phrase(loc.clone()),
            format!("{op:?}: not a numeric operator"),
        )),
    }
}
