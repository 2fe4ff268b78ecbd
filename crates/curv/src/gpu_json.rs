//! The `.gpu` cache format and the CLI's JSON program output: either
//! `{"value": <v>}` for a plain result, or
//! `{"shape": {"is_2d", "is_3d", "bbox", "shader", "parameters"}}` for a
//! recognised shape, matching the RFC-8259-tolerant extension described for
//! `spec.md` §6 (`Infinity` as `1e9999`, `NaN` as `null`).

use serde::Serialize;
use serde_json::Value as Json;

use crate::{
    error::{Context, CurvError, Result},
    location::Location,
    shape::{self, Dimension},
    value::Value,
};

#[derive(Serialize)]
#[serde(untagged)]
enum GpuOutput {
    Value { value: Json },
    Shape { shape: ShapeJson },
}

#[derive(Serialize)]
struct ShapeJson {
    is_2d: bool,
    is_3d: bool,
    bbox: Json,
    shader: String,
    parameters: Vec<Json>,
}

/// Encodes `value` as the CLI's `-o json` output: a shape (if the value is
/// recognised as one) compiles to GLSL and reports its bounding box;
/// anything else is wrapped as a plain value.
pub fn encode(value: &Value, loc: &Location) -> Result<String> {
    let json = if let Some(info) = shape::recognise(value) {
        let dist_sym = crate::sc::compile_function(&info.dist, loc)?;
        let colour_sym = info.colour.as_ref().map(|c| crate::sc::compile_function(c, loc)).transpose()?;
        let shader = build_shader(&dist_sym, colour_sym.as_ref());
        let bbox = value
            .as_record()
            .and_then(|record| record.get("bbox").ok().flatten())
            .map_or(Json::Null, |v| number_tolerant_json(&v));
        GpuOutput::Shape {
            shape: ShapeJson {
                is_2d: matches!(info.dimension, Dimension::D2),
                is_3d: matches!(info.dimension, Dimension::D3),
                bbox,
                shader,
                parameters: Vec::new(),
            },
        }
    } else {
        GpuOutput::Value {
            value: number_tolerant_json(value),
        }
    };
    let text = serde_json::to_string_pretty(&json)
        .map_err(|err| CurvError::hard(Context::Phrase(loc.clone()), format!("failed to encode JSON: {err}")))?;
    // `serde_json` has no number variant for +-Infinity (Rust's own f64 ->
    // JSON-number conversion rejects it), so they are round-tripped through
    // these sentinel strings and patched back into the oversized-exponent
    // literal the RFC-8259-tolerant extension wants, post-serialisation.
    Ok(text.replace("\"__curv_inf__\"", "1e9999").replace("\"__curv_neg_inf__\"", "-1e9999"))
}

/// `dist` and `colour` both take the full `vec4` point (x, y, z, t) per
/// spec; a shape with no `colour` field gets a constant mid-grey `colour`
/// entry point so every shader exposes the same two functions.
fn build_shader(dist: &crate::sc::SymExpr, colour: Option<&crate::sc::SymExpr>) -> String {
    let dist_body = crate::sc::glsl::render(dist);
    let colour_body = colour.map_or_else(|| "vec3(0.5, 0.5, 0.5)".to_string(), crate::sc::glsl::render);
    format!(
        "float dist(vec4 p) {{\n    return {dist_body};\n}}\n\nvec3 colour(vec4 p) {{\n    return {colour_body};\n}}\n"
    )
}

/// Converts a `Value` to `serde_json::Value`, writing `Infinity`/`-Infinity`
/// as the oversized-exponent literal `1e9999`/`-1e9999` and `NaN` as `null`
/// since strict JSON has no token for either.
fn number_tolerant_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Num(n) => number_tolerant_float(*n),
        Value::Symbol(s) | Value::Str(s) => Json::String(s.to_string()),
        Value::List(items) => Json::Array(items.iter().map(number_tolerant_json).collect()),
        Value::Record(record) => {
            let mut map = serde_json::Map::new();
            for name in record.field_names() {
                if let Ok(Some(v)) = record.get(name) {
                    map.insert(name.to_string(), number_tolerant_json(&v));
                }
            }
            Json::Object(map)
        }
        Value::Function(_) | Value::Reactive(_) => Json::Null,
    }
}

fn number_tolerant_float(n: f64) -> Json {
    if n.is_nan() {
        Json::Null
    } else if n == f64::INFINITY {
        Json::String("__curv_inf__".to_string())
    } else if n == f64::NEG_INFINITY {
        Json::String("__curv_neg_inf__".to_string())
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}
