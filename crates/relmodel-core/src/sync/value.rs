//! Runtime attribute values.

use serde::{Deserialize, Serialize};

/// A scalar value held by an entity instance attribute.
///
/// Serializable so change-tracking collaborators can ship recorded
/// mutations across process boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// UUID (128-bit identifier).
    Uuid([u8; 16]),
    /// Timestamp (microseconds since Unix epoch).
    Timestamp(u64),
    /// Arbitrary JSON document.
    Json(serde_json::Value),
}

impl Value {
    /// Check if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from("D1"), Value::String("D1".into()));
        assert!(Value::Null.is_null());
        assert!(!Value::from(0i64).is_null());
    }

    #[test]
    fn test_json_value_serializes() {
        let value = Value::Json(serde_json::json!({"active": true}));
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, back);
    }
}
