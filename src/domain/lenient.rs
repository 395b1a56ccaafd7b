//! Lenient decoders for API payloads.
//!
//! The calculation service is allowed to omit measurements, send `null`, or
//! (through upstream bugs) send junk in numeric columns. Absent stays absent;
//! anything present but unusable becomes an explicit `0.0` so a summary can
//! always be rendered.

use serde_json::{Map, Value};

pub fn coerce_measure(raw: &Value) -> Option<f64> {
    match raw {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().filter(|x| x.is_finite()).unwrap_or(0.0)),
        Value::String(s) => Some(
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .unwrap_or(0.0),
        ),
        _ => Some(0.0),
    }
}

pub fn coerce_count(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|x| x.is_finite() && *x >= 0.0)
                .map(|x| x.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Looks up a field the service spells two ways. The canonical key wins
/// whenever it carries a value; the alias is only a fallback.
pub fn pick<'a>(map: &'a Map<String, Value>, canonical: &str, alias: &str) -> Option<&'a Value> {
    map.get(canonical)
        .filter(|v| !v.is_null())
        .or_else(|| map.get(alias))
}

/// Optional measurement: absent or `null` is `None`, junk is `Some(0.0)`.
pub fn measure(raw: Option<&Value>) -> Option<f64> {
    raw.and_then(coerce_measure)
}

/// Summary value: anything unusable reads as `0.0`.
pub fn value(raw: Option<&Value>) -> f64 {
    measure(raw).unwrap_or(0.0)
}

pub fn text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
