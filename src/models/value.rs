// src/models/value.rs

use std::fmt;

use serde::Serialize;

/// Untyped value handed to the scalar by the host: a resolver result on the
/// output side, or a client-supplied variable on the input side.
pub use serde_json::Value as RawValue;

/// Runtime shape of a [`RawValue`].
/// Reported back in `TypeMismatch` errors so hosts can tell what arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueShape {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueShape {
    pub fn of(value: &RawValue) -> Self {
        match value {
            RawValue::Null => ValueShape::Null,
            RawValue::Bool(_) => ValueShape::Boolean,
            RawValue::Number(_) => ValueShape::Number,
            RawValue::String(_) => ValueShape::String,
            RawValue::Array(_) => ValueShape::Array,
            RawValue::Object(_) => ValueShape::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueShape::Null => "null",
            ValueShape::Boolean => "boolean",
            ValueShape::Number => "number",
            ValueShape::String => "string",
            ValueShape::Array => "array",
            ValueShape::Object => "object",
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
