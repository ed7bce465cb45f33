//! Value terms.
//!
//! Integral values narrower than 32 bits are written with their own width
//! inside graphs but widened to 32 bits when they are a parameter or a
//! result, matching how the host machine passes them.

use crate::error::{ExportError, Result};
use veriopt_ir::{Graph, NodeKind, Value};

/// Encode a concrete value.
///
/// `param_or_result` widens sub-int integrals to 32 bits. `heap_ref` means
/// the value denotes a slot in the test heap and is written as an object
/// reference.
pub fn encode_value(value: &Value, param_or_result: bool, heap_ref: bool) -> Result<String> {
    if heap_ref {
        return heap_reference(value);
    }
    let text = match value {
        Value::Double(d) => format!("(FloatVal 64 ({}))", java_double_text(*d)),
        Value::Float(f) => format!("(FloatVal 32 ({}))", java_float_text(*f)),
        Value::Long(v) => format!("(IntVal 64 ({}))", v),
        Value::Int(v) => int_val(32, *v as i64, param_or_result),
        Value::Short(v) => int_val(16, *v as i64, param_or_result),
        Value::Char(v) => int_val(16, *v as i64, param_or_result),
        Value::Byte(v) => int_val(8, *v as i64, param_or_result),
        Value::Bool(v) => int_val(1, *v as i64, param_or_result),
        Value::Str(s) => format!("(ObjStr ''{}'')", string_literal(s)?),
        Value::Null => "(ObjRef None)".to_string(),
        Value::HeapRef(_) => heap_reference(value)?,
        Value::Other(_) => {
            return Err(ExportError::unsupported_value(format!(
                "unsupported value type: {} ({})",
                value,
                value.type_name()
            )))
        }
    };
    Ok(text)
}

fn heap_reference(value: &Value) -> Result<String> {
    match value {
        Value::HeapRef(Some(slot)) => Ok(format!("(ObjRef (Some {}))", slot)),
        Value::HeapRef(None) | Value::Null => Ok("(ObjRef None)".to_string()),
        other => Err(ExportError::unsupported_value(format!(
            "expected a heap reference, found {} ({})",
            other,
            other.type_name()
        ))),
    }
}

#[inline]
fn int_val(bits: u32, v: i64, param_or_result: bool) -> String {
    let bits = if param_or_result && bits < 32 { 32 } else { bits };
    format!("(new_int {} ({}))", bits, v)
}

/// Escape a string for a `''...''` literal.
///
/// Printable ASCII and newlines pass through; a backslash becomes `\"`.
/// Anything else is rejected.
pub fn string_literal(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch as u32 {
            10 => out.push('\n'),
            92 => out.push_str("\\\""),
            32..=126 => out.push(ch),
            code => {
                return Err(ExportError::unsupported_value(format!(
                    "unsupported string literal, code point: {} in: {}",
                    code, s
                )))
            }
        }
    }
    Ok(out)
}

/// Result term of a test that throws: `(Exception id ''Class'')`.
///
/// The id is that of the graph's first bytecode-exception node, or empty
/// when it has none.
pub fn exception_term(exception_class: &str, graph: &Graph) -> String {
    let id = graph
        .find(|k| matches!(k, NodeKind::BytecodeException { .. }))
        .map(|id| id.to_string())
        .unwrap_or_default();
    format!("(Exception {} ''{}'')", id, exception_class)
}

/// `[v1, v2, ...]` of parameter values; positions listed in `heap_indexes`
/// are heap references.
pub fn value_list(values: &[Value], heap_indexes: &[usize]) -> Result<String> {
    let mut parts = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        parts.push(encode_value(value, true, heap_indexes.contains(&i))?);
    }
    Ok(format!("[{}]", parts.join(", ")))
}

// =============================================================================
// Floating-Point Text
// =============================================================================

/// Text of a double the way the host language prints it: `1.5`, `1.0E10`,
/// `NaN`, `-Infinity`.
pub fn java_double_text(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = d.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        format!("{:?}", d)
    } else {
        scientific(&format!("{:e}", d))
    }
}

/// Same as [`java_double_text`] with single-precision digits.
pub fn java_float_text(f: f32) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = f.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        format!("{:?}", f)
    } else {
        scientific(&format!("{:e}", f))
    }
}

/// `1.5e-5` -> `1.5E-5`, `1e10` -> `1.0E10`.
fn scientific(rust: &str) -> String {
    match rust.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => rust.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
