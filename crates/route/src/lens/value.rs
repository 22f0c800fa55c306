use std::fmt;

/// A decoded token staged in the context, waiting to be written into a field.
///
/// The lens that produced the value knows the true field type; the value only
/// carries the representation. Aggregates stay as [`Value::Raw`] text until the
/// morphism is applied, so dropping a staged value costs nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Double(f64),
    Raw(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Raw(s) => Some(s),
            Value::Integer(_) | Value::Double(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Raw(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
        }
    }
}
