//! Shape recognition: a shape is any record carrying the right fields, not a
//! distinguished runtime type. [`recognise`] checks for that shape
//! structurally, the same way record-vs-module duck typing works everywhere
//! else in the language.

pub mod picker;

use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    D2,
    D3,
}

pub struct ShapeInfo {
    pub dimension: Dimension,
    pub dist: Rc<crate::closure::Closure>,
    /// `vec4 -> vec3` colour field. Not every shape defines one; a shape
    /// with no `colour` field still recognises, and callers fall back to a
    /// default material (see [`crate::gpu_json`]).
    pub colour: Option<Rc<crate::closure::Closure>>,
}

/// Returns shape metadata if `value` is a record with a callable `dist`
/// field and a `is_2d`/`is_3d` tag, or `None` if it is not shaped like a
/// shape at all.
#[must_use]
pub fn recognise(value: &Value) -> Option<ShapeInfo> {
    let record = value.as_record()?;
    let dist = record.get("dist").ok()??;
    let dist = dist.as_function()?.clone();
    let is_2d = record.get("is_2d").ok()??.as_bool().unwrap_or(false);
    let is_3d = record.get("is_3d").ok()??.as_bool().unwrap_or(false);
    let dimension = if is_3d {
        Dimension::D3
    } else if is_2d {
        Dimension::D2
    } else {
        return None;
    };
    let colour = record.get("colour").ok().flatten().and_then(|v| v.as_function().cloned());
    Some(ShapeInfo { dimension, dist, colour })
}
