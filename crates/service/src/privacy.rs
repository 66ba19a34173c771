use serde_json::Value;

/// Remove `fields` from an object, or from every object in an array.
/// Other values are returned untouched.
pub fn strip_fields(value: Value, fields: &[&str]) -> Value {
    if fields.is_empty() {
        return value;
    }
    match value {
        Value::Object(mut map) => {
            for field in fields {
                map.remove(*field);
            }
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|item| strip_fields(item, fields)).collect()),
        other => other,
    }
}
