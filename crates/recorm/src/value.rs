//! Scalar values and builder parameters.
//!
//! Entities only ever hold scalars: text, numbers, booleans and NULL.
//! [`Value`] is that scalar. [`Param`] is what the query builder accepts for
//! template markers: a scalar, a (possibly nested) list that is flattened
//! before substitution, or an object, which is rejected.

use crate::error::{OrmError, OrmResult};
use serde::Serialize;
use std::fmt;

/// A scalar column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value counts as "not set" for primary key probing.
    ///
    /// NULL, the empty string, `"0"`, zero and `false` are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty() || s == "0",
        }
    }

    /// Integer view of the value, parsing text when needed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A query builder argument bound to a template marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A scalar value; consumes one marker.
    Scalar(Value),
    /// A list of parameters, flattened in order before substitution.
    List(Vec<Param>),
    /// A structured value. Never substitutable.
    Object(serde_json::Map<String, serde_json::Value>),
}

impl Param {
    /// Flatten nested lists into a single ordered sequence.
    ///
    /// Objects are kept as-is so substitution can reject them.
    pub fn flatten(params: impl IntoIterator<Item = Param>) -> Vec<Param> {
        let mut out = Vec::new();
        for param in params {
            param.flatten_into(&mut out);
        }
        out
    }

    fn flatten_into(self, out: &mut Vec<Param>) {
        match self {
            Param::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

/// Build a `Vec<Param>` from heterogeneous values.
///
/// ```ignore
/// model.where_("age > ? and name = ?", params![18, "Alice"])?;
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Param::from($value)),+]
    };
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Scalar(value)
    }
}

impl From<&Value> for Param {
    fn from(value: &Value) -> Self {
        Param::Scalar(value.clone())
    }
}

impl<T> From<Option<T>> for Param
where
    T: Into<Param>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Param::Scalar(Value::Null),
        }
    }
}

impl<T> From<Vec<T>> for Param
where
    T: Into<Param>,
{
    fn from(values: Vec<T>) -> Self {
        Param::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Param {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Param::Scalar(Value::Null),
            serde_json::Value::Bool(b) => Param::Scalar(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Scalar(Value::Int(i)),
                None => Param::Scalar(Value::Float(n.as_f64().unwrap_or_default())),
            },
            serde_json::Value::String(s) => Param::Scalar(Value::Text(s)),
            serde_json::Value::Array(items) => {
                Param::List(items.into_iter().map(Param::from).collect())
            }
            serde_json::Value::Object(map) => Param::Object(map),
        }
    }
}

macro_rules! impl_scalar_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(value: $ty) -> Self {
                    Param::Scalar(value.to_value())
                }
            }
        )*
    };
}

impl_scalar_param!(i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, String, &str, &String);

/// Convert a field into a scalar [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Build a field from a scalar [`Value`] read out of a row.
///
/// Conversions are lenient in the direction drivers usually need: numeric
/// text parses into numbers and numbers render into text.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

fn mismatch(expected: &str, got: &Value) -> OrmError {
    OrmError::decode("", format!("expected {expected}, got {}", got.kind()))
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(if b { "1" } else { "0" }.to_string()),
            Value::Null => Err(mismatch("text", &value)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> OrmResult<Self> {
        match &value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Text(s) if s == "0" || s == "1" => Ok(s == "1"),
            _ => Err(mismatch("bool", &value)),
        }
    }
}

macro_rules! impl_int_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> OrmResult<Self> {
                    let int = value
                        .as_i64()
                        .ok_or_else(|| mismatch(stringify!($ty), &value))?;
                    <$ty>::try_from(int).map_err(|_| {
                        OrmError::decode("", format!("{int} out of range for {}", stringify!($ty)))
                    })
                }
            }
        )*
    };
}

impl_int_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for u64 {
    fn to_value(&self) -> Value {
        match i64::try_from(*self) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(self.to_string()),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match &value {
            Value::Text(s) => s.trim().parse().map_err(|_| mismatch("u64", &value)),
            _ => {
                let int = value.as_i64().ok_or_else(|| mismatch("u64", &value))?;
                u64::try_from(int)
                    .map_err(|_| OrmError::decode("", format!("{int} out of range for u64")))
            }
        }
    }
}

macro_rules! impl_float_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Float(f64::from(*self))
                }
            }
        )*
    };
}

impl_float_value!(f32, f64);

impl FromValue for f64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match &value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Text(s) => s.trim().parse().map_err(|_| mismatch("f64", &value)),
            _ => Err(mismatch("f64", &value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> OrmResult<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

#[cfg(feature = "chrono")]
mod chrono_values {
    use super::*;

    const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const DATE_FORMAT: &str = "%Y-%m-%d";

    impl ToValue for chrono::NaiveDateTime {
        fn to_value(&self) -> Value {
            Value::Text(self.format(DATETIME_FORMAT).to_string())
        }
    }

    impl FromValue for chrono::NaiveDateTime {
        fn from_value(value: Value) -> OrmResult<Self> {
            let text = String::from_value(value)?;
            chrono::NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
                .map_err(|e| OrmError::decode("", e.to_string()))
        }
    }

    impl ToValue for chrono::NaiveDate {
        fn to_value(&self) -> Value {
            Value::Text(self.format(DATE_FORMAT).to_string())
        }
    }

    impl FromValue for chrono::NaiveDate {
        fn from_value(value: Value) -> OrmResult<Self> {
            let text = String::from_value(value)?;
            chrono::NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map_err(|e| OrmError::decode("", e.to_string()))
        }
    }

    impl From<chrono::NaiveDateTime> for Param {
        fn from(value: chrono::NaiveDateTime) -> Self {
            Param::Scalar(value.to_value())
        }
    }

    impl From<chrono::NaiveDate> for Param {
        fn from(value: chrono::NaiveDate) -> Self {
            Param::Scalar(value.to_value())
        }
    }
}

#[cfg(feature = "uuid")]
mod uuid_values {
    use super::*;

    impl ToValue for uuid::Uuid {
        fn to_value(&self) -> Value {
            Value::Text(self.to_string())
        }
    }

    impl FromValue for uuid::Uuid {
        fn from_value(value: Value) -> OrmResult<Self> {
            let text = String::from_value(value)?;
            uuid::Uuid::parse_str(&text).map_err(|e| OrmError::decode("", e.to_string()))
        }
    }

    impl From<uuid::Uuid> for Param {
        fn from(value: uuid::Uuid) -> Self {
            Param::Scalar(value.to_value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_nested_lists_in_order() {
        let flat = Param::flatten(params![1, vec![2, 3], vec![vec![4]], "x"]);
        assert_eq!(
            flat,
            vec![
                Param::Scalar(Value::Int(1)),
                Param::Scalar(Value::Int(2)),
                Param::Scalar(Value::Int(3)),
                Param::Scalar(Value::Int(4)),
                Param::Scalar(Value::Text("x".into())),
            ]
        );
    }

    #[test]
    fn json_objects_stay_non_scalar() {
        let p = Param::from(serde_json::json!({"a": 1}));
        assert!(matches!(p, Param::Object(_)));

        let p = Param::from(serde_json::json!([1, "b", null]));
        assert_eq!(Param::flatten([p]).len(), 3);
    }

    #[test]
    fn empty_values_follow_probe_rule() {
        assert!(Value::Null.is_empty());
        assert!(Value::Int(0).is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(Value::Text("0".into()).is_empty());
        assert!(!Value::Int(42).is_empty());
        assert!(!Value::Text("abc".into()).is_empty());
    }

    #[test]
    fn lenient_numeric_decoding() {
        assert_eq!(i64::from_value(Value::Text("42".into())).unwrap(), 42);
        assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(String::from_value(Value::Int(7)).unwrap(), "7");
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert!(i8::from_value(Value::Int(1000)).is_err());
        assert!(String::from_value(Value::Null).is_err());
    }
}
