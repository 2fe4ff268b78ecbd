//! The Shape Compiler: a partial evaluator that lowers a restricted subset
//! of Curv functions (arithmetic, comparisons, `if`, and a handful of
//! builtin calls over a shape's point parameter) to GLSL/C++ shader source.
//!
//! Unlike the tree-walking evaluator in [`crate::meaning::operation`], which
//! always produces a concrete [`Value`], the Shape Compiler produces a
//! [`SymExpr`]: a symbolic expression tree it can print as source text. A
//! function can only be compiled this way if every value it touches is
//! either a point coordinate, a plain constant captured from its defining
//! scope, or the result of a small set of recognised builtin calls —
//! anything else (in particular, self-recursion with no static bound) is
//! rejected with a diagnostic pointing at the offending call.

pub mod cpp;
pub mod glsl;

use std::{cell::RefCell, rc::Rc};

use smallvec::SmallVec;

use crate::{
    closure::Closure,
    error::{Context, CurvError, Result},
    location::Location,
    meaning::operation::{Generator, Operation},
    pattern::Pattern,
    phrase::{BinaryOp, UnaryOp},
    value::Value,
};

#[derive(Debug, Clone)]
pub enum SymExpr {
    Num(f64),
    Bool(bool),
    /// One named component of the point being evaluated (`x`, `y`, `z`,
    /// `w`).
    Param(Rc<str>),
    Unary(UnaryOp, Box<SymExpr>),
    Binary(BinaryOp, Box<SymExpr>, Box<SymExpr>),
    Call(&'static str, Vec<SymExpr>),
    Ternary(Box<SymExpr>, Box<SymExpr>, Box<SymExpr>),
    /// A fixed-size vector literal, e.g. a `colour` field's `[r, g, b]`
    /// result. Only a flat list of plain items compiles this way; anything
    /// with a `for`/`if`/spread clause is rejected earlier.
    Vec(Vec<SymExpr>),
}

impl SymExpr {
    /// Folds a fully-constant symbolic expression down to a concrete value;
    /// used both by `sc_test` (to check SC's output against plain
    /// evaluation) and by anything embedding a compiled shape's `dist` at a
    /// known point.
    pub fn fold(&self) -> Result<Value> {
        Ok(match self {
            SymExpr::Num(n) => Value::Num(*n),
            SymExpr::Bool(b) => Value::Bool(*b),
            SymExpr::Param(name) => {
                return Err(CurvError::hard(Context::None, format!("cannot fold unbound parameter '{name}'")))
            }
            SymExpr::Unary(op, a) => {
                let a = a.fold()?;
                match (op, &a) {
                    (UnaryOp::Negate, Value::Num(n)) => Value::Num(-n),
                    (UnaryOp::Plus, Value::Num(n)) => Value::Num(*n),
                    (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
                    _ => return Err(CurvError::hard(Context::None, "bad unary operand while folding")),
                }
            }
            SymExpr::Binary(op, a, b) => {
                let (a, b) = (a.fold()?, b.fold()?);
                fold_binary(*op, a, b)?
            }
            SymExpr::Call(name, args) => {
                let folded = args.iter().map(SymExpr::fold).collect::<Result<Vec<_>>>()?;
                fold_call(name, &folded)?
            }
            SymExpr::Ternary(c, t, e) => {
                let c = c.fold()?;
                if c.as_bool().unwrap_or(false) {
                    t.fold()?
                } else {
                    e.fold()?
                }
            }
            SymExpr::Vec(items) => {
                let folded = items.iter().map(SymExpr::fold).collect::<Result<Vec<_>>>()?;
                Value::List(Rc::new(folded))
            }
        })
    }
}

fn fold_binary(op: BinaryOp, a: Value, b: Value) -> Result<Value> {
    let (Value::Num(a), Value::Num(b)) = (&a, &b) else {
        return Err(CurvError::hard(Context::None, "non-numeric operand while folding"));
    };
    Ok(match op {
        BinaryOp::Add => Value::Num(a + b),
        BinaryOp::Sub => Value::Num(a - b),
        BinaryOp::Mul => Value::Num(a * b),
        BinaryOp::Div => Value::Num(a / b),
        BinaryOp::Pow => Value::Num(a.powf(*b)),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Neq => Value::Bool(a != b),
        _ => return Err(CurvError::hard(Context::None, format!("{op:?}: not foldable"))),
    })
}

fn fold_call(name: &str, args: &[Value]) -> Result<Value> {
    let n = |i: usize| args[i].as_num().ok_or_else(|| CurvError::hard(Context::None, format!("{name}: non-numeric argument")));
    Ok(match name {
        "sqrt" => Value::Num(n(0)?.sqrt()),
        "abs" => Value::Num(n(0)?.abs()),
        "sin" => Value::Num(n(0)?.sin()),
        "cos" => Value::Num(n(0)?.cos()),
        "tan" => Value::Num(n(0)?.tan()),
        "min" => Value::Num(n(0)?.min(n(1)?)),
        "max" => Value::Num(n(0)?.max(n(1)?)),
        _ => return Err(CurvError::hard(Context::None, format!("'{name}' is not a Shape-Compiler builtin"))),
    })
}

/// A symbolic environment: one slot per slot of the frame currently being
/// compiled. Nested lambdas inside a Shape-Compiled function are not
/// supported, so there is no parent chain to walk — a `NonlocalRef` always
/// resolves directly against the closure's own captured (real) frame.
///
/// A slot starts out `Bound` only for the ones `bind_param_as_coordinates`
/// fills with a point component; every other slot (a `let`/`where` binding
/// flattened into this same frame by the analyser) is `Empty` until its
/// thunk is compiled and cached on first read, mirroring the eager/lazy
/// split `Frame::read_local` does at evaluation time. `Forcing` catches a
/// self-referential binding (`x = x + 1`) before it recurses forever.
#[derive(Clone)]
enum SymSlot {
    Empty,
    Forcing,
    Bound(SymExpr),
}

struct SymFrame {
    values: RefCell<Vec<SymSlot>>,
    thunks: Vec<Option<Rc<Operation>>>,
}

struct ScCompiler {
    /// Identity stack of closures currently being compiled, used to reject
    /// self-recursive `dist` functions rather than recursing forever.
    in_progress: Vec<*const Closure>,
}

/// Compiles `closure`'s body into a symbolic expression, with its parameter
/// bound to point components named `x`, `y`, `z`, and (for 4D / time-aware
/// shapes) `w`.
pub fn compile_function(closure: &Rc<Closure>, loc: &Location) -> Result<SymExpr> {
    let mut compiler = ScCompiler { in_progress: Vec::new() };
    compiler.compile_closure_call(closure, loc)
}

impl ScCompiler {
    fn compile_closure_call(&mut self, closure: &Rc<Closure>, loc: &Location) -> Result<SymExpr> {
        let ptr = Rc::as_ptr(closure);
        if self.in_progress.contains(&ptr) {
            return Err(CurvError::hard(
                Context::ScFrame(loc.clone()),
                "recursive shape function is not supported by the Shape Compiler",
            ));
        }
        let Closure::Lambda {
            param, body, captured, nslots, thunks, ..
        } = closure.as_ref()
        else {
            return Err(CurvError::hard(Context::ScFrame(loc.clone()), "builtin functions cannot be Shape-Compiled"));
        };
        self.in_progress.push(ptr);
        let mut values = vec![SymSlot::Empty; *nslots];
        bind_param_as_coordinates(param, &mut values);
        let sym_frame = Rc::new(SymFrame {
            values: RefCell::new(values),
            thunks: thunks.clone(),
        });
        let result = self.compile_op(body, &sym_frame, captured);
        self.in_progress.pop();
        result
    }

    fn compile_op(&mut self, op: &Operation, sym: &Rc<SymFrame>, real_parent: &Rc<crate::frame::Frame>) -> Result<SymExpr> {
        match op {
            Operation::Literal(v) | Operation::BuiltinRef(v) => literal_to_sym(v),
            Operation::LocalRef { index, name } => self.read_sym_local(sym, real_parent, *index, name),
            Operation::NonlocalRef { depth, index, name } => {
                if *depth == 1 {
                    let value = real_parent.read_local(*index, name)?;
                    literal_to_sym(&value)
                } else {
                    Err(CurvError::hard(Context::None, "Shape Compiler supports only one level of nonlocal capture"))
                }
            }
            Operation::Unary { op, arg, .. } => Ok(SymExpr::Unary(*op, Box::new(self.compile_op(arg, sym, real_parent)?))),
            Operation::Binary { op, left, right, loc } => {
                if matches!(op, BinaryOp::Field | BinaryOp::MatchArm | BinaryOp::Dot | BinaryOp::Range) {
                    return Err(CurvError::hard(Context::ScFrame(loc.clone()), format!("{op:?} is not Shape-Compilable")));
                }
                Ok(SymExpr::Binary(
                    *op,
                    Box::new(self.compile_op(left, sym, real_parent)?),
                    Box::new(self.compile_op(right, sym, real_parent)?),
                ))
            }
            Operation::If {
                cond,
                then_branch,
                else_branch,
                loc,
            } => {
                let Some(else_branch) = else_branch else {
                    return Err(CurvError::hard(Context::ScFrame(loc.clone()), "if without else is not Shape-Compilable"));
                };
                Ok(SymExpr::Ternary(
                    Box::new(self.compile_op(cond, sym, real_parent)?),
                    Box::new(self.compile_op(then_branch, sym, real_parent)?),
                    Box::new(self.compile_op(else_branch, sym, real_parent)?),
                ))
            }
            Operation::Call { func, arg, loc } => self.compile_call(func, arg, sym, real_parent, loc),
            Operation::ListCtor(gens) if gens.iter().all(|g| matches!(g, Generator::Item(_))) => {
                let items = gens
                    .iter()
                    .map(|g| {
                        let Generator::Item(item_op) = g else { unreachable!() };
                        self.compile_op(item_op, sym, real_parent)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SymExpr::Vec(items))
            }
            _ => Err(CurvError::hard(Context::None, "this construct is not Shape-Compilable")),
        }
    }

    /// Reads local slot `index`, compiling and caching its thunk on first
    /// read if it is one of the `let`/`where` bindings the analyser
    /// flattened into this same frame (a Shape-Compiled function's point
    /// parameter itself is always pre-filled by `bind_param_as_coordinates`
    /// before this is ever called).
    fn read_sym_local(&mut self, sym: &Rc<SymFrame>, real_parent: &Rc<crate::frame::Frame>, index: usize, name: &str) -> Result<SymExpr> {
        match sym.values.borrow().get(index) {
            Some(SymSlot::Bound(v)) => return Ok(v.clone()),
            Some(SymSlot::Forcing) => {
                return Err(CurvError::hard(Context::None, format!("illegal recursive reference to '{name}'")))
            }
            Some(SymSlot::Empty) => {}
            None => return Err(CurvError::hard(Context::None, format!("Shape Compiler: slot '{name}' is out of range"))),
        }
        let op = sym
            .thunks
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| CurvError::hard(Context::None, format!("Shape Compiler: '{name}' has no Shape-Compilable definition")))?
            .clone();
        sym.values.borrow_mut()[index] = SymSlot::Forcing;
        let value = self.compile_op(&op, sym, real_parent)?;
        sym.values.borrow_mut()[index] = SymSlot::Bound(value.clone());
        Ok(value)
    }

    fn compile_call(
        &mut self,
        func: &Operation,
        arg: &Operation,
        sym: &Rc<SymFrame>,
        real_parent: &Rc<crate::frame::Frame>,
        loc: &Location,
    ) -> Result<SymExpr> {
        let Operation::BuiltinRef(Value::Function(closure)) = func else {
            return Err(CurvError::hard(Context::ScFrame(loc.clone()), "only calls to recognised builtins or the shape's own function are Shape-Compilable"));
        };
        match closure.as_ref() {
            Closure::Builtin { name, .. } => {
                if !matches!(*name, "sqrt" | "abs" | "sin" | "cos" | "tan" | "min" | "max") {
                    return Err(CurvError::hard(Context::ScFrame(loc.clone()), format!("'{name}' is not a Shape-Compiler builtin")));
                }
                let args = self.compile_call_args(arg, sym, real_parent)?;
                Ok(SymExpr::Call(name, args))
            }
            Closure::Lambda { .. } => self.compile_closure_call(closure, loc),
        }
    }

    /// A builtin call's argument is a single `Operation`; a two-argument
    /// builtin like `min`/`max` receives it as a two-element list literal
    /// (mirroring how [`crate::builtins::pair`] unpacks it at runtime), so a
    /// bare `ListCtor` of plain items is split back into separate symbolic
    /// arguments here instead of being treated as one opaque list value.
    fn compile_call_args(&mut self, arg: &Operation, sym: &Rc<SymFrame>, real_parent: &Rc<crate::frame::Frame>) -> Result<Vec<SymExpr>> {
        // Every recognised Shape-Compiler builtin (`sqrt`, `min`, `max`, ...)
        // takes at most two arguments, so the common case never touches the
        // heap.
        let mut out: SmallVec<[SymExpr; 2]> = SmallVec::new();
        if let Operation::ListCtor(gens) = arg {
            if gens.iter().all(|g| matches!(g, Generator::Item(_))) {
                for g in gens {
                    let Generator::Item(op) = g else { unreachable!() };
                    out.push(self.compile_op(op, sym, real_parent)?);
                }
                return Ok(out.into_vec());
            }
        }
        out.push(self.compile_op(arg, sym, real_parent)?);
        Ok(out.into_vec())
    }
}

fn literal_to_sym(v: &Value) -> Result<SymExpr> {
    match v {
        Value::Num(n) => Ok(SymExpr::Num(*n)),
        Value::Bool(b) => Ok(SymExpr::Bool(*b)),
        _ => Err(CurvError::hard(Context::None, format!("a {} cannot appear inside a Shape-Compiled function", v.type_name()))),
    }
}

/// Binds a radial-shape parameter pattern (`[x, y, z, ...]`) to symbolic
/// point-component names, writing each matched slot of `out` (sized to the
/// call frame's full `nslots`, not just the pattern's own arity) to
/// `SymSlot::Bound`, for `compile_function`.
fn bind_param_as_coordinates(param: &Pattern, out: &mut [SymSlot]) {
    let names = ["x", "y", "z", "w"];
    if let Pattern::List { items, .. } = param {
        for (i, item) in items.iter().enumerate() {
            if let Pattern::Slot { index, .. } = item {
                if let Some(slot) = out.get_mut(*index) {
                    *slot = SymSlot::Bound(SymExpr::Param(Rc::from(names[i.min(3)])));
                }
            }
        }
    }
}

/// Cross-checks the Shape Compiler's symbolic evaluation of `shape.dist`
/// against plain evaluation at `point`, returning `true` if they agree
/// within floating-point tolerance.
pub fn test_shape_at_point(shape: &Value, point: &Value, loc: &Location) -> Result<Value> {
    let Some(info) = crate::shape::recognise(shape) else {
        return Err(CurvError::hard(Context::Phrase(loc.clone()), "sc_test: first argument is not a shape"));
    };
    let direct = info.dist.call(point, loc)?;
    let Value::Num(direct) = direct else {
        return Err(CurvError::hard(Context::Phrase(loc.clone()), "sc_test: dist did not return a number"));
    };

    let sym = compile_function(&info.dist, loc)?;
    let point_components = point.as_list().ok_or_else(|| CurvError::hard(Context::Phrase(loc.clone()), "sc_test: point must be a list"))?;
    let substituted = substitute_params(&sym, point_components);
    let Value::Num(compiled) = substituted.fold()? else {
        return Err(CurvError::hard(Context::Phrase(loc.clone()), "sc_test: compiled dist did not fold to a number"));
    };

    Ok(Value::Bool((direct - compiled).abs() < 1e-9))
}

fn substitute_params(expr: &SymExpr, point: &[Value]) -> SymExpr {
    let names = ["x", "y", "z", "w"];
    match expr {
        SymExpr::Param(name) => {
            let i = names.iter().position(|n| *n == name.as_ref()).unwrap_or(0);
            match point.get(i).and_then(Value::as_num) {
                Some(n) => SymExpr::Num(n),
                None => expr.clone(),
            }
        }
        SymExpr::Num(_) | SymExpr::Bool(_) => expr.clone(),
        SymExpr::Unary(op, a) => SymExpr::Unary(*op, Box::new(substitute_params(a, point))),
        SymExpr::Binary(op, a, b) => SymExpr::Binary(*op, Box::new(substitute_params(a, point)), Box::new(substitute_params(b, point))),
        SymExpr::Call(name, args) => SymExpr::Call(name, args.iter().map(|a| substitute_params(a, point)).collect()),
        SymExpr::Ternary(c, t, e) => SymExpr::Ternary(
            Box::new(substitute_params(c, point)),
            Box::new(substitute_params(t, point)),
            Box::new(substitute_params(e, point)),
        ),
        SymExpr::Vec(items) => SymExpr::Vec(items.iter().map(|i| substitute_params(i, point)).collect()),
    }
}
