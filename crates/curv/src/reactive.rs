//! Reactive values: symbolic expressions over shader uniform parameters.
//!
//! A picker-bound parameter (see [`crate::shape::picker`]) evaluates, inside
//! ordinary Curv evaluation, to a [`Value::Reactive`] wrapping a
//! [`ReactiveExpression`] rather than a concrete number. Arithmetic on a
//! reactive value builds a bigger symbolic expression instead of computing a
//! result; the Shape Compiler later lowers the whole tree to a GLSL/C++
//! uniform-variable reference plus the matching arithmetic, so a shape's
//! `dist` function can depend on a value that is only known at render time.

use std::{fmt, rc::Rc};

use crate::phrase::{BinaryOp, UnaryOp};

/// The GLSL/C++ attribute type a value occupies, from `GL_Type` in the
/// original implementation's shape compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlType {
    Bool,
    Num,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl GlType {
    #[must_use]
    pub fn glsl_name(self) -> &'static str {
        match self {
            GlType::Bool => "bool",
            GlType::Num => "float",
            GlType::Vec2 => "vec2",
            GlType::Vec3 => "vec3",
            GlType::Vec4 => "vec4",
            GlType::Mat2 => "mat2",
            GlType::Mat3 => "mat3",
            GlType::Mat4 => "mat4",
        }
    }

    #[must_use]
    pub fn cpp_name(self) -> &'static str {
        match self {
            GlType::Bool => "bool",
            GlType::Num => "double",
            GlType::Vec2 => "glm::dvec2",
            GlType::Vec3 => "glm::dvec3",
            GlType::Vec4 => "glm::dvec4",
            GlType::Mat2 => "glm::dmat2",
            GlType::Mat3 => "glm::dmat3",
            GlType::Mat4 => "glm::dmat4",
        }
    }
}

#[derive(Debug)]
pub enum ReactiveExpression {
    /// A named uniform parameter, fed by a picker's live value at render
    /// time.
    Uniform { name: Rc<str>, gl_type: GlType },
    Const(f64),
    Unary(UnaryOp, Rc<ReactiveExpression>),
    Binary(BinaryOp, Rc<ReactiveExpression>, Rc<ReactiveExpression>),
}

impl ReactiveExpression {
    #[must_use]
    pub fn gl_type(&self) -> GlType {
        match self {
            ReactiveExpression::Uniform { gl_type, .. } => *gl_type,
            ReactiveExpression::Const(_) => GlType::Num,
            ReactiveExpression::Unary(_, a) => a.gl_type(),
            ReactiveExpression::Binary(op, a, b) => match op {
                BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    GlType::Bool
                }
                _ => {
                    if a.gl_type() == GlType::Num {
                        b.gl_type()
                    } else {
                        a.gl_type()
                    }
                }
            },
        }
    }
}

impl fmt::Display for ReactiveExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactiveExpression::Uniform { name, .. } => write!(f, "${name}"),
            ReactiveExpression::Const(n) => write!(f, "{n}"),
            ReactiveExpression::Unary(op, a) => write!(f, "{op:?}({a})"),
            ReactiveExpression::Binary(op, a, b) => write!(f, "({a} {op:?} {b})"),
        }
    }
}
