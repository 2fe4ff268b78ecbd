//! Turns a [`Phrase`] tree into an [`Operation`] tree.
//!
//! Analysis resolves every identifier to either a builtin value, a local
//! slot, or a nonlocal slot reached by walking a statically-known number of
//! lexical scopes. A scope only counts as a hop when it crosses a genuine
//! evaluator boundary — a lambda call, a `for`-loop iteration, or the
//! program root. `let`, `where`, and `parametric` groups do not open a new
//! Frame at evaluation time: their bindings are reserved directly into
//! whichever boundary's [`FrameBuilder`] encloses them, via
//! [`Env::child_same_frame`], so a name bound three `let`s deep inside a
//! lambda body still resolves as a depth-0 local, and a nonlocal reference
//! crossing that lambda's call boundary is still exactly one hop. Lambda
//! parameters and `for`-loop patterns are the only things that open a fresh
//! [`FrameBuilder`] (via [`Env::child_new_frame`]), because they are the
//! only things a real evaluator Frame gets allocated for.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    meaning::{
        metafunction::Metafunction,
        operation::{Generator, Operation},
    },
    pattern::Pattern,
    phrase::{BinaryOp, Phrase},
    value::Value,
};

pub type Namespace = IndexMap<Rc<str>, Value>;

/// Accumulates the thunks of one Frame boundary while it is being analysed.
/// `reserve` allocates a slot (eager by default, i.e. backed by `None`);
/// `set_thunk` backs a reserved slot with a lazy expression once it has been
/// compiled.
#[derive(Default)]
struct FrameBuilder {
    thunks: Vec<Option<Rc<Operation>>>,
}

impl FrameBuilder {
    fn reserve(&mut self) -> usize {
        let index = self.thunks.len();
        self.thunks.push(None);
        index
    }

    fn set_thunk(&mut self, index: usize, op: Rc<Operation>) {
        self.thunks[index] = Some(op);
    }
}

#[derive(Clone)]
struct Env {
    bindings: Rc<IndexMap<Rc<str>, usize>>,
    frame: Rc<RefCell<FrameBuilder>>,
    outer: Option<Rc<Env>>,
}

impl Env {
    fn root(frame: Rc<RefCell<FrameBuilder>>) -> Self {
        Self {
            bindings: Rc::new(IndexMap::new()),
            frame,
            outer: None,
        }
    }

    /// A child scope that shares its parent's Frame boundary: used for
    /// `let`/`where`/`parametric` groups, whose bindings are flattened into
    /// whichever lambda/loop/root frame encloses them.
    fn child_same_frame(&self, bindings: IndexMap<Rc<str>, usize>) -> Self {
        Self {
            bindings: Rc::new(bindings),
            frame: Rc::clone(&self.frame),
            outer: Some(Rc::new(self.clone())),
        }
    }

    /// A child scope that opens a new Frame boundary: used for lambda
    /// parameters and `for`-loop patterns, the only constructs a real
    /// evaluator Frame gets allocated for.
    fn child_new_frame(&self, bindings: IndexMap<Rc<str>, usize>, frame: Rc<RefCell<FrameBuilder>>) -> Self {
        Self {
            bindings: Rc::new(bindings),
            frame,
            outer: Some(Rc::new(self.clone())),
        }
    }

    /// Returns `(depth, slot_index)`: `depth` Frame boundaries crossed to
    /// reach the scope that binds `name`, `slot_index` within that
    /// boundary's frame. `depth` only increments when a step crosses to a
    /// genuinely different Frame, not for every lexical `Env` link.
    fn resolve(&self, name: &str) -> Option<(usize, usize)> {
        let mut depth = 0;
        let mut env = self;
        loop {
            if let Some(&index) = env.bindings.get(name) {
                return Some((depth, index));
            }
            match &env.outer {
                Some(outer) => {
                    if !Rc::ptr_eq(&env.frame, &outer.frame) {
                        depth += 1;
                    }
                    env = outer;
                }
                None => return None,
            }
        }
    }
}

pub struct Analyser<'a> {
    namespace: &'a Namespace,
}

/// Analyses a whole program against `namespace`, returning its root
/// operation and the thunks of its (possibly empty) top-level `let`/`where`
/// bindings, flattened into the program's root Frame.
pub fn analyse_program(phrase: &Phrase, namespace: &Namespace) -> Result<(Rc<Operation>, Vec<Option<Rc<Operation>>>)> {
    let analyser = Analyser { namespace };
    let Phrase::Program { body, .. } = phrase else {
        return Err(CurvError::hard(Context::Phrase(phrase.location().clone()), "expected a program"));
    };
    let frame = Rc::new(RefCell::new(FrameBuilder::default()));
    let operation = {
        let env = Env::root(Rc::clone(&frame));
        analyser.compile_expr(body, &env)?
    };
    let thunks = Rc::try_unwrap(frame)
        .unwrap_or_else(|_| panic!("root frame builder escaped analysis"))
        .into_inner()
        .thunks;
    Ok((Rc::new(operation), thunks))
}

impl Analyser<'_> {
    fn identifier_op(&self, name: &str, env: &Env, loc: &Location) -> Result<Operation> {
        if let Some((depth, index)) = env.resolve(name) {
            let name: Rc<str> = Rc::from(name);
            return Ok(if depth == 0 {
                Operation::LocalRef { index, name }
            } else {
                Operation::NonlocalRef { depth, index, name }
            });
        }
        if let Some(value) = self.namespace.get(name) {
            return Ok(Operation::BuiltinRef(value.clone()));
        }
        Err(CurvError::hard(Context::Phrase(loc.clone()), format!("'{name}' is not defined")))
    }

    fn compile_expr(&self, phrase: &Phrase, env: &Env) -> Result<Operation> {
        match phrase {
            Phrase::Empty(_) => unreachable!("the parser never produces Phrase::Empty"),
            Phrase::Identifier(loc, name) => self.identifier_op(name, env, loc),
            Phrase::Numeral(loc) => {
                let n: f64 = loc
                    .text()
                    .parse()
                    .map_err(|_| CurvError::hard(Context::Phrase(loc.clone()), "invalid numeral"))?;
                Ok(Operation::Literal(Value::Num(n)))
            }
            Phrase::Str(_, text) => Ok(Operation::Literal(Value::Str(Rc::clone(text)))),
            Phrase::Wildcard(loc) => Err(CurvError::hard(Context::Phrase(loc.clone()), "'_' cannot be used as a value")),
            Phrase::Unary { op, arg, loc } => Ok(Operation::Unary {
                op: *op,
                arg: Box::new(self.compile_expr(arg, env)?),
                loc: loc.clone(),
            }),
            Phrase::Binary {
                op: BinaryOp::MatchArm, ..
            } => self.compile_piecewise(std::slice::from_ref(phrase), env, phrase.location()),
            Phrase::Binary { op, left, right, loc } => self.compile_binary(*op, left, right, env, loc),
            Phrase::Call { func, arg, loc } => self.compile_call(func, arg, env, loc),
            Phrase::Index { base, index, loc } => Ok(Operation::Index {
                base: Box::new(self.compile_expr(base, env)?),
                index: Box::new(self.compile_expr(index, env)?),
                loc: loc.clone(),
            }),
            Phrase::List { items, .. } => {
                let gens = items.iter().map(|p| self.compile_list_generator(p, env)).collect::<Result<Vec<_>>>()?;
                Ok(Operation::ListCtor(gens))
            }
            Phrase::Record { fields, .. } => {
                let gens = fields.iter().map(|p| self.compile_record_generator(p, env)).collect::<Result<Vec<_>>>()?;
                Ok(Operation::RecordCtor(gens))
            }
            Phrase::Paren { inner, .. } => self.compile_expr(inner, env),
            Phrase::Comma { items, loc } if !items.is_empty() && items.iter().all(is_match_arm) => {
                self.compile_piecewise(items, env, loc)
            }
            Phrase::Comma { items, .. } => {
                let gens = items.iter().map(|p| self.compile_list_generator(p, env)).collect::<Result<Vec<_>>>()?;
                Ok(Operation::ListCtor(gens))
            }
            Phrase::Semicolon { items, .. } => {
                let ops = items.iter().map(|p| self.compile_expr(p, env)).collect::<Result<Vec<_>>>()?;
                Ok(Operation::Sequence(ops))
            }
            Phrase::Program { body, .. } => self.compile_expr(body, env),
            Phrase::Let { defs, body, .. } | Phrase::Parametric { defs, body, .. } => {
                let child_env = self.compile_definition_group(defs, env)?;
                self.compile_expr(body, &child_env)
            }
            Phrase::Where { body, defs, .. } => {
                let child_env = self.compile_definition_group(defs, env)?;
                self.compile_expr(body, &child_env)
            }
            Phrase::If {
                cond,
                then_branch,
                else_branch,
                loc,
            } => Ok(Operation::If {
                cond: Box::new(self.compile_expr(cond, env)?),
                then_branch: Box::new(self.compile_expr(then_branch, env)?),
                else_branch: else_branch.as_ref().map(|e| self.compile_expr(e, env)).transpose()?.map(Box::new),
                loc: loc.clone(),
            }),
            Phrase::Assignment { loc, .. } => Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                "assignment is only valid inside a 'do' block with a 'var' binding",
            )),
            Phrase::Definition { loc, .. } => {
                Err(CurvError::hard(Context::Phrase(loc.clone()), "a definition is not a value"))
            }
            Phrase::Lambda { pattern, body, loc } => self.compile_lambda(None, pattern, body, env, loc),
            Phrase::TypeAnnotation { loc, .. } => {
                Err(CurvError::hard(Context::Phrase(loc.clone()), "'::' is only valid in a pattern"))
            }
            Phrase::Spread { loc, .. } => Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                "'...' is only valid inside a list or record literal",
            )),
            Phrase::For { .. } => Ok(Operation::ListCtor(vec![self.compile_list_generator(phrase, env)?])),
            Phrase::While { loc, .. } => Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                "'while' generators are not yet supported",
            )),
            Phrase::Do { actions, body, .. } => {
                let mut ops = actions.iter().map(|p| self.compile_expr(p, env)).collect::<Result<Vec<_>>>()?;
                ops.push(self.compile_expr(body, env)?);
                Ok(Operation::Sequence(ops))
            }
        }
    }

    /// Compiles a chain of `pattern => body` match arms into a
    /// `Closure::Piecewise` built from `Operation::Lambda` arms, tried in
    /// order at call time (see `Closure::call`).
    fn compile_piecewise(&self, arms: &[Phrase], env: &Env, loc: &Location) -> Result<Operation> {
        let mut compiled = Vec::with_capacity(arms.len());
        for arm in arms {
            let Phrase::Binary {
                op: BinaryOp::MatchArm,
                left: pattern,
                right: body,
                loc: arm_loc,
            } = arm
            else {
                return Err(CurvError::hard(Context::Phrase(arm.location().clone()), "expected a '=>' match arm"));
            };
            compiled.push(self.compile_lambda(None, pattern, body, env, arm_loc)?);
        }
        Ok(Operation::Piecewise { arms: compiled, loc: loc.clone() })
    }

    fn compile_binary(&self, op: BinaryOp, left: &Phrase, right: &Phrase, env: &Env, loc: &Location) -> Result<Operation> {
        match op {
            BinaryOp::Dot => {
                let Phrase::Identifier(_, name) = right.nub() else {
                    return Err(CurvError::hard(Context::Phrase(loc.clone()), "expected a field name after '.'"));
                };
                Ok(Operation::DotField {
                    base: Box::new(self.compile_expr(left, env)?),
                    name: Rc::clone(name),
                    loc: loc.clone(),
                })
            }
            BinaryOp::Field => Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                "':' is only valid inside a record literal",
            )),
            BinaryOp::MatchArm => Err(CurvError::hard(
                Context::Phrase(loc.clone()),
                "'=>' match arms are only valid directly inside a piecewise function",
            )),
            _ => Ok(Operation::Binary {
                op,
                left: Box::new(self.compile_expr(left, env)?),
                right: Box::new(self.compile_expr(right, env)?),
                loc: loc.clone(),
            }),
        }
    }

    fn compile_call(&self, func: &Phrase, arg: &Phrase, env: &Env, loc: &Location) -> Result<Operation> {
        if let Phrase::Identifier(_, name) = func.nub() {
            if env.resolve(name).is_none() && !self.namespace.contains_key(name.as_ref()) {
                match Metafunction::from_name(name) {
                    Some(Metafunction::Include) => {
                        return Ok(Operation::Include {
                            path: Box::new(self.compile_expr(arg, env)?),
                            loc: loc.clone(),
                        });
                    }
                    Some(Metafunction::ScTest) => {
                        let Phrase::Comma { items, .. } | Phrase::List { items, .. } = arg.nub() else {
                            return Err(CurvError::hard(Context::Phrase(loc.clone()), "sc_test(shape, point): expected two arguments"));
                        };
                        let [shape, point] = &items[..] else {
                            return Err(CurvError::hard(Context::Phrase(loc.clone()), "sc_test(shape, point): expected two arguments"));
                        };
                        return Ok(Operation::ScTest {
                            shape: Box::new(self.compile_expr(shape, env)?),
                            point: Box::new(self.compile_expr(point, env)?),
                            loc: loc.clone(),
                        });
                    }
                    None => {}
                }
            }
        }
        Ok(Operation::Call {
            func: Box::new(self.compile_expr(func, env)?),
            arg: Box::new(self.compile_expr(arg, env)?),
            loc: loc.clone(),
        })
    }

    /// Compiles a lambda: the parameter pattern reserves slots into a fresh
    /// `FrameBuilder` (a new Frame boundary), then the body is compiled
    /// against a child `Env` sharing that same builder, so any `let`/`where`
    /// bindings inside the body land in the same call frame as the
    /// parameters rather than opening another hop.
    fn compile_lambda(&self, name: Option<Rc<str>>, pattern: &Phrase, body: &Phrase, env: &Env, loc: &Location) -> Result<Operation> {
        let frame = Rc::new(RefCell::new(FrameBuilder::default()));
        let mut bindings = IndexMap::new();
        let compiled_pattern = self.compile_pattern(pattern, env, &frame, &mut bindings)?;
        let body_op = {
            let child_env = env.child_new_frame(bindings, Rc::clone(&frame));
            self.compile_expr(body, &child_env)?
        };
        let thunks = Rc::try_unwrap(frame)
            .unwrap_or_else(|_| panic!("lambda frame builder escaped analysis"))
            .into_inner()
            .thunks;
        Ok(Operation::Lambda {
            name,
            param: Rc::new(compiled_pattern),
            body: Rc::new(body_op),
            nslots: thunks.len(),
            thunks,
            loc: loc.clone(),
        })
    }

    /// Compiles a pattern phrase, reserving a fresh slot in `frame` for
    /// every identifier it binds and recording it in `bindings`. Predicate
    /// sub-expressions (`pattern :: type_expr`) and default-value
    /// expressions (`pattern = default_expr`) are compiled against `env`
    /// (the scope *outside* the pattern), since they should not see the
    /// pattern's own bindings.
    fn compile_pattern(
        &self,
        phrase: &Phrase,
        env: &Env,
        frame: &Rc<RefCell<FrameBuilder>>,
        bindings: &mut IndexMap<Rc<str>, usize>,
    ) -> Result<Pattern> {
        match phrase {
            Phrase::Wildcard(_) => Ok(Pattern::Wildcard),
            Phrase::Numeral(loc) => {
                let n: f64 = loc
                    .text()
                    .parse()
                    .map_err(|_| CurvError::hard(Context::Phrase(loc.clone()), "invalid numeral"))?;
                Ok(Pattern::Literal(Value::Num(n)))
            }
            Phrase::Str(_, text) => Ok(Pattern::Literal(Value::Symbol(Rc::clone(text)))),
            Phrase::Identifier(_, name) if name.as_ref() == "true" => Ok(Pattern::Literal(Value::Bool(true))),
            Phrase::Identifier(_, name) if name.as_ref() == "false" => Ok(Pattern::Literal(Value::Bool(false))),
            Phrase::Identifier(_, name) => {
                let index = frame.borrow_mut().reserve();
                bindings.insert(Rc::clone(name), index);
                Ok(Pattern::Slot {
                    index,
                    name: Rc::clone(name),
                })
            }
            Phrase::Definition { pattern, value, .. } => {
                let inner = self.compile_pattern(pattern, env, frame, bindings)?;
                let default = self.compile_expr(value, env)?;
                Ok(Pattern::Optional {
                    inner: Box::new(inner),
                    default: Rc::new(default),
                })
            }
            Phrase::Paren { inner, .. } => self.compile_pattern(inner, env, frame, bindings),
            Phrase::List { items, .. } => {
                let mut out = Vec::new();
                let mut spread = None;
                for (i, item) in items.iter().enumerate() {
                    if let Phrase::Spread { arg, .. } = item {
                        if i != items.len() - 1 {
                            return Err(CurvError::hard(Context::Phrase(item.location().clone()), "'...' must be the last list-pattern element"));
                        }
                        spread = Some(Box::new(self.compile_pattern(arg, env, frame, bindings)?));
                    } else {
                        out.push(self.compile_pattern(item, env, frame, bindings)?);
                    }
                }
                Ok(Pattern::List { items: out, spread })
            }
            Phrase::Record { fields, .. } => {
                let mut out = Vec::new();
                let mut spread = None;
                for field in fields {
                    match field {
                        Phrase::Spread { arg, .. } => {
                            spread = Some(Box::new(self.compile_pattern(arg, env, frame, bindings)?));
                        }
                        Phrase::Binary {
                            op: BinaryOp::Field,
                            left,
                            right,
                            ..
                        } => {
                            let Phrase::Identifier(_, key) = left.nub() else {
                                return Err(CurvError::hard(Context::Phrase(field.location().clone()), "record-pattern field name must be an identifier"));
                            };
                            out.push((Rc::clone(key), self.compile_pattern(right, env, frame, bindings)?));
                        }
                        Phrase::Definition { pattern, .. } => {
                            let Phrase::Identifier(_, key) = pattern.nub() else {
                                return Err(CurvError::hard(Context::Phrase(field.location().clone()), "record-pattern field name must be an identifier"));
                            };
                            out.push((Rc::clone(key), self.compile_pattern(field, env, frame, bindings)?));
                        }
                        Phrase::Identifier(_, name) => {
                            out.push((Rc::clone(name), self.compile_pattern(field, env, frame, bindings)?));
                        }
                        _ => {
                            return Err(CurvError::hard(Context::Phrase(field.location().clone()), "invalid record-pattern field"));
                        }
                    }
                }
                Ok(Pattern::Record { fields: out, spread })
            }
            Phrase::TypeAnnotation { pattern, type_expr, .. } => {
                let inner = self.compile_pattern(pattern, env, frame, bindings)?;
                let predicate = self.compile_expr(type_expr, env)?;
                Ok(Pattern::Predicate {
                    inner: Box::new(inner),
                    predicate: Rc::new(predicate),
                })
            }
            other => Err(CurvError::hard(Context::Phrase(other.location().clone()), "unsupported pattern")),
        }
    }

    /// Compiles a `let`/`where`/`parametric` binding group. Each definition
    /// must be a plain `identifier = value`; see the module-level doc for
    /// why destructuring is not allowed here. Slots are reserved directly
    /// into the current scope's Frame boundary (shared with whatever
    /// lambda/loop/root frame encloses this group), not a new one, so
    /// nested `let`s do not add a resolution hop.
    fn compile_definition_group(&self, group: &crate::phrase::DefinitionGroup, env: &Env) -> Result<Env> {
        let mut bindings = IndexMap::new();
        let mut reserved = Vec::with_capacity(group.items.len());
        for item in &group.items {
            let Phrase::Definition { pattern, value, loc } = item else {
                return Err(CurvError::hard(Context::Phrase(item.location().clone()), "expected a definition"));
            };
            let Phrase::Identifier(_, name) = pattern.nub() else {
                return Err(CurvError::hard(
                    Context::Phrase(loc.clone()),
                    "destructuring patterns are not supported in let/where/parametric definitions",
                ));
            };
            if bindings.contains_key(name.as_ref()) {
                return Err(CurvError::hard(Context::Phrase(loc.clone()), format!("duplicate definition of '{name}'")));
            }
            let index = env.frame.borrow_mut().reserve();
            bindings.insert(Rc::clone(name), index);
            reserved.push((index, value.as_ref()));
        }
        let child_env = env.child_same_frame(bindings);
        for (index, value_phrase) in reserved {
            let op = self.compile_expr(value_phrase, &child_env)?;
            env.frame.borrow_mut().set_thunk(index, Rc::new(op));
        }
        Ok(child_env)
    }

    fn compile_list_generator(&self, phrase: &Phrase, env: &Env) -> Result<Generator> {
        match phrase {
            Phrase::Spread { arg, .. } => Ok(Generator::Spread(self.compile_expr(arg, env)?)),
            Phrase::If {
                cond,
                then_branch,
                else_branch: None,
                ..
            } => Ok(Generator::If {
                cond: self.compile_expr(cond, env)?,
                body: Box::new(self.compile_list_generator(then_branch, env)?),
            }),
            Phrase::For { pattern, iter, body, loc } => self.compile_for_generator(pattern, iter, body, env, loc, true),
            _ => Ok(Generator::Item(self.compile_expr(phrase, env)?)),
        }
    }

    fn compile_record_generator(&self, phrase: &Phrase, env: &Env) -> Result<Generator> {
        match phrase {
            Phrase::Spread { arg, .. } => Ok(Generator::Spread(self.compile_expr(arg, env)?)),
            Phrase::Binary {
                op: BinaryOp::Field,
                left,
                right,
                ..
            } => {
                let Phrase::Identifier(_, key) = left.nub() else {
                    return Err(CurvError::hard(Context::Phrase(phrase.location().clone()), "record field name must be an identifier"));
                };
                Ok(Generator::Field(Rc::clone(key), self.compile_expr(right, env)?))
            }
            Phrase::Identifier(_, name) => Ok(Generator::Field(Rc::clone(name), self.compile_expr(phrase, env)?)),
            Phrase::If {
                cond,
                then_branch,
                else_branch: None,
                ..
            } => Ok(Generator::If {
                cond: self.compile_expr(cond, env)?,
                body: Box::new(self.compile_record_generator(then_branch, env)?),
            }),
            Phrase::For { pattern, iter, body, loc } => self.compile_for_generator(pattern, iter, body, env, loc, false),
            _ => Err(CurvError::hard(Context::Phrase(phrase.location().clone()), "invalid record-literal field")),
        }
    }

    /// Compiles a `for` generator. Like a lambda, the loop pattern opens a
    /// fresh `FrameBuilder` (a new Frame, allocated once per iteration at
    /// eval time — see `Generator::For`'s evaluator — so a closure created
    /// inside the loop body captures that iteration's own values rather
    /// than aliasing the next iteration's); `let`s inside the body flatten
    /// into that same per-iteration frame.
    fn compile_for_generator(
        &self,
        pattern: &Phrase,
        iter: &Phrase,
        body: &Phrase,
        env: &Env,
        loc: &Location,
        list_context: bool,
    ) -> Result<Generator> {
        let iter_op = self.compile_expr(iter, env)?;
        let frame = Rc::new(RefCell::new(FrameBuilder::default()));
        let mut bindings = IndexMap::new();
        let compiled_pattern = self.compile_pattern(pattern, env, &frame, &mut bindings)?;
        let body_gen = {
            let child_env = env.child_new_frame(bindings, Rc::clone(&frame));
            if list_context {
                self.compile_list_generator(body, &child_env)?
            } else {
                self.compile_record_generator(body, &child_env)?
            }
        };
        let thunks = Rc::try_unwrap(frame)
            .unwrap_or_else(|_| panic!("for-loop frame builder escaped analysis"))
            .into_inner()
            .thunks;
        Ok(Generator::For {
            pattern: Rc::new(compiled_pattern),
            nslots: thunks.len(),
            thunks,
            iter: iter_op,
            body: Box::new(body_gen),
            loc: loc.clone(),
        })
    }
}

fn is_match_arm(phrase: &Phrase) -> bool {
    matches!(phrase, Phrase::Binary { op: BinaryOp::MatchArm, .. })
}
