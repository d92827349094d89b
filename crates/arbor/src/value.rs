//! Dynamic property values.

use crate::{
    error::{Error, Result},
    geom::Edges,
    layout::Align,
};

/// Canonical dynamic representation for property values and command payloads.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
    /// Box insets.
    Edges(Edges),
    /// Alignment along one axis.
    Align(Align),
    /// Array value.
    List(Vec<Self>),
}

impl Value {
    /// Human-readable variant name for diagnostics.
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Number(_) => "Number",
            Self::Text(_) => "Text",
            Self::Edges(_) => "Edges",
            Self::Align(_) => "Align",
            Self::List(_) => "List",
        }
    }

    /// True for the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Decode into a typed value.
    pub fn get<T: FromValue>(&self) -> Result<T> {
        T::from_value(self)
    }
}

/// Convert a typed value into a [`Value`].
pub trait ToValue {
    /// Encode the value.
    fn to_value(self) -> Value;
}

/// Convert a [`Value`] into a typed value.
pub trait FromValue: Sized {
    /// Decode the value.
    fn from_value(v: &Value) -> Result<Self>;
}

/// Build the error for a value of the wrong kind.
fn mismatch(expected: &str, v: &Value) -> Error {
    Error::InvalidValue(format!("expected {expected}, got {}", v.kind_name()))
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Number(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Number(f64::from(self))
    }
}

/// Implement `ToValue` for integer primitives that widen losslessly to f64.
macro_rules! impl_int_to_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(self) -> Value {
                    Value::Number(f64::from(self))
                }
            }
        )+
    };
}

impl_int_to_value!(i8, i16, i32, u8, u16, u32);

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for Edges {
    fn to_value(self) -> Value {
        Value::Edges(self)
    }
}

impl ToValue for Align {
    fn to_value(self) -> Value {
        Value::Align(self)
    }
}

impl<T> ToValue for Option<T>
where
    T: ToValue,
{
    fn to_value(self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T> ToValue for Vec<T>
where
    T: ToValue,
{
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}

impl FromValue for Value {
    fn from_value(v: &Value) -> Result<Self> {
        Ok(v.clone())
    }
}

impl FromValue for bool {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("Bool", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Number(n) => Ok(*n),
            other => Err(mismatch("Number", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch("Text", other)),
        }
    }
}

impl FromValue for Edges {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Edges(e) => Ok(*e),
            Value::Number(n) => Ok(Self::all(*n)),
            other => Err(mismatch("Edges", other)),
        }
    }
}

impl FromValue for Align {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Align(a) => Ok(*a),
            other => Err(mismatch("Align", other)),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T> FromValue for Vec<T>
where
    T: FromValue,
{
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("List", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_round_trip() -> Result<()> {
        assert!(true.to_value().get::<bool>()?);
        assert_eq!(3u32.to_value().get::<f64>()?, 3.0);
        assert_eq!(Edges::all(2.0).to_value().get::<Edges>()?, Edges::all(2.0));
        assert_eq!(None::<f64>.to_value(), Value::Null);
        assert_eq!(Value::Null.get::<Option<f64>>()?, None);
        Ok(())
    }

    #[test]
    fn number_widens_to_uniform_edges() -> Result<()> {
        assert_eq!(Value::Number(4.0).get::<Edges>()?, Edges::all(4.0));
        Ok(())
    }

    #[test]
    fn mismatch_reports_kinds() {
        let err = Value::Text("x".into()).get::<bool>().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidValue("expected Bool, got Text".into())
        );
    }
}
