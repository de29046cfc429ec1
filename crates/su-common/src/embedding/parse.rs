use serde_json::Value;
use tracing::warn;

/// Adapt a persisted embedding value into a vector.
///
/// The store hands back either a native JSON array or the same array encoded as a string
/// (pgvector text form `"[0.1,0.2,...]"`). `null`, malformed input and vectors of the wrong
/// length all become `None`; scoring treats that as "no embedding".
pub fn parse_embedding(raw: &Value, expected_dimension: usize) -> Option<Vec<f32>> {
    let vector = match raw {
        Value::Null => return None,
        Value::Array(items) => numbers_from_array(items)?,
        Value::String(encoded) => {
            let trimmed = encoded.trim();
            if trimmed.is_empty() {
                return None;
            }
            match serde_json::from_str::<Vec<f32>>(trimmed) {
                Ok(vector) => vector,
                Err(err) => {
                    warn!(error = %err, "embedding string is not a JSON number array");
                    return None;
                }
            }
        }
        other => {
            warn!(kind = value_kind(other), "unsupported embedding value");
            return None;
        }
    };

    if vector.len() != expected_dimension {
        warn!(
            expected = expected_dimension,
            actual = vector.len(),
            "discarding embedding with unexpected dimension"
        );
        return None;
    }

    if vector.iter().any(|v| !v.is_finite()) {
        warn!("discarding embedding with non-finite values");
        return None;
    }

    Some(vector)
}

fn numbers_from_array(items: &[Value]) -> Option<Vec<f32>> {
    let mut vector = Vec::with_capacity(items.len());
    for item in items {
        match item.as_f64() {
            Some(v) => vector.push(v as f32),
            None => {
                warn!(kind = value_kind(item), "embedding array contains a non-number");
                return None;
            }
        }
    }
    Some(vector)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_native_arrays() {
        assert_eq!(
            parse_embedding(&json!([0.5, -1, 2.25]), 3),
            Some(vec![0.5, -1.0, 2.25])
        );
    }

    #[test]
    fn accepts_json_encoded_strings() {
        assert_eq!(
            parse_embedding(&json!("[0.5, -1, 2.25]"), 3),
            Some(vec![0.5, -1.0, 2.25])
        );
    }

    #[test]
    fn rejects_wrong_dimension_and_garbage() {
        assert_eq!(parse_embedding(&json!([1.0, 2.0]), 3), None);
        assert_eq!(parse_embedding(&json!("not a vector"), 3), None);
        assert_eq!(parse_embedding(&json!([1.0, "x", 2.0]), 3), None);
        assert_eq!(parse_embedding(&json!({"v": [1, 2, 3]}), 3), None);
        assert_eq!(parse_embedding(&Value::Null, 3), None);
        assert_eq!(parse_embedding(&json!(""), 3), None);
    }
}
