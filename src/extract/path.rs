use serde_json::Value;

/// Walk `path` through nested objects. A missing key, a `null`, or a
/// non-object on the way yields `None` instead of an error.
pub fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = doc;
    for key in path {
        node = node.as_object()?.get(*key)?;
    }
    (!node.is_null()).then_some(node)
}

/// Leaf as text. Numbers and booleans are rendered, nested values become JSON.
pub fn lookup_str(doc: &Value, path: &[&str]) -> Option<String> {
    lookup(doc, path).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

pub fn lookup_f64(doc: &Value, path: &[&str]) -> Option<f64> {
    lookup(doc, path).and_then(Value::as_f64)
}

pub fn lookup_bool(doc: &Value, path: &[&str]) -> Option<bool> {
    lookup(doc, path).and_then(Value::as_bool)
}

/// Array leaf, or an empty slice when absent or not an array.
pub fn lookup_array<'a>(doc: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(doc, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
