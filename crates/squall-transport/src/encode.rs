// ── Bracketed form encoding ──
//
// Nested request data flattens to `parent[child]=value` pairs, with the
// whole key path percent-encoded at emission. Arrays use their indices as
// child keys. This matches what form-driven endpoints expect from
// x-www-form-urlencoded bodies.

use serde_json::Value;

/// Serialize a JSON value as an `application/x-www-form-urlencoded` body.
///
/// Objects flatten recursively into bracketed key paths, so
/// `{"a": 1, "b": {"c": 2}}` becomes `a=1&b%5Bc%5D=2`. Arrays use numeric
/// child keys (`tags%5B0%5D=x`). A bare scalar encodes as its text alone.
pub fn form_urlencode(data: &Value) -> String {
    let mut pairs = Vec::new();
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                push_pairs(&mut pairs, key, value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                push_pairs(&mut pairs, &index.to_string(), value);
            }
        }
        scalar => return percent_encode(&scalar_text(scalar)),
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child_key, child) in map {
                push_pairs(pairs, &format!("{key}[{child_key}]"), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                push_pairs(pairs, &format!("{key}[{index}]"), child);
            }
        }
        scalar => {
            pairs.push(format!(
                "{}={}",
                percent_encode(key),
                percent_encode(&scalar_text(scalar))
            ));
        }
    }
}

/// Render a scalar the way it should appear on the wire: strings as-is,
/// numbers and booleans as their literals, null as `null`.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn percent_encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
