// ABOUTME: Update policy for partial user updates
// ABOUTME: An update must carry at least one populated field before any per-field checks run

use serde_json::{Map, Value};

use crate::validation::ValidationError;

/// A submitted value counts as empty when it is null, an empty string, `false`,
/// zero, or an empty array/object.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Reject a raw update payload whose every value is empty or absent.
pub fn check_at_least_one_value(fields: &Map<String, Value>) -> Result<(), ValidationError> {
    if fields.values().any(|value| !is_empty_value(value)) {
        Ok(())
    } else {
        Err(ValidationError::EmptyUpdate)
    }
}
