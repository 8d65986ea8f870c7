//! raw document representation
//!
//! A build description is read as JSON and converted into a [Value] before anything is validated.
//! The loader walks this loosely-typed tree section by section and only binds it to the typed
//! [crate::document::ConfigDocument] once a section passed validation and substitution.
//!
//! The model contains the following data types
//! - null (treated like an absent key by the loader)
//! - boolean
//! - number (kept as [serde_json::Number], the loader never inspects numbers)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map", where the key is of type string)

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(indexmap::IndexMap<String, Value>),
}

impl Value {
    /// Human readable name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(a) => a.into(),
            // `preserve_order` keeps the declared key order
            serde_json::Value::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
