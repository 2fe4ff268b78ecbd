//! Renders a [`super::SymExpr`] as a C++ expression, for the CPU-side
//! reference renderer that mirrors every GLSL shape.

use crate::phrase::{BinaryOp, UnaryOp};

use super::SymExpr;

/// Prints `expr` as a single C++ expression, with point components read
/// from `p.x`/`p.y`/`p.z`/`p.w` (a `glm::vec4`-like point struct).
#[must_use]
pub fn render(expr: &SymExpr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_expr(expr: &SymExpr, out: &mut String) {
    match expr {
        SymExpr::Num(n) => out.push_str(&format!("{n}")),
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
            out.push_str("std::pow(");
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
            out.push_str("std::");
            out.push_str(name);
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
        2 => "glm::vec2",
        3 => "glm::vec3",
        4 => "glm::vec4",
        _ => panic!("{len}: no C++ vector constructor of this arity"),
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
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        op => panic!("{op:?}: not renderable to C++"),
    }
}
