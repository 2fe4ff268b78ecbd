//! Renders a [`super::SymExpr`] as a GLSL expression.

use crate::phrase::{BinaryOp, UnaryOp};

use super::SymExpr;

/// Prints `expr` as a single GLSL expression, with point components read
/// from `p.x`/`p.y`/`p.z`/`p.w`.
#[must_use]
pub fn render(expr: &SymExpr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_expr(expr: &SymExpr, out: &mut String) {
    match expr {
        SymExpr::Num(n) => out.push_str(&format_float(*n)),
        SymExpr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        SymExpr::Param(name) => {
            out.push_str("p.");
            out.push_str(name);
        }
        SymExpr::Unary(op, a) => {
            out.push_str(unary_op(*op));
            out.push('(');
            write_expr(a, out);
            out.push(')');
        }
        SymExpr::Binary(BinaryOp::Pow, a, b) => {
            out.push_str("pow(");
            write_expr(a, out);
            out.push_str(", ");
            write_expr(b, out);
            out.push(')');
        }
        SymExpr::Binary(op, a, b) => {
            out.push('(');
            write_expr(a, out);
            out.push_str(binary_op(*op));
            write_expr(b, out);
            out.push(')');
        }
        SymExpr::Call(name, args) => {
            out.push_str(glsl_builtin_name(name));
            out.push('(');
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(a, out);
            }
            out.push(')');
        }
        SymExpr::Ternary(c, t, e) => {
            out.push('(');
            write_expr(c, out);
            out.push_str(" ? ");
            write_expr(t, out);
            out.push_str(" : ");
            write_expr(e, out);
            out.push(')');
        }
        SymExpr::Vec(items) => {
            out.push_str(vec_constructor(items.len()));
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(item, out);
            }
            out.push(')');
        }
    }
}

fn vec_constructor(len: usize) -> &'static str {
    match len {
        2 => "vec2",
        3 => "vec3",
        4 => "vec4",
        _ => panic!("{len}: no GLSL vector constructor of this arity"),
    }
}

fn unary_op(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Negate => "-",
        UnaryOp::Plus => "+",
        UnaryOp::Not => "!",
    }
}

fn binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Pow => panic!("pow is rendered via a function call, not an operator"),
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        op => panic!("{op:?}: not renderable to GLSL"),
    }
}

fn glsl_builtin_name(name: &str) -> &str {
    // GLSL's standard library names match Curv's one-for-one here.
    name
}

/// GLSL requires a decimal point on every float literal (`1.0`, not `1`).
fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}
