//! Argument stream tokens and typed values.
//!
//! A statement is described by an ordered stream of [`Arg`]s: literal SQL
//! fragments, typed [`Value`]s and explicit modifier markers. Plain text is
//! always SQL; text meant as data is a [`Value::Text`] (or follows a `%s`
//! marker).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::modifier::Modifier;

/// A value that renders itself given the active engine.
///
/// Expressible values are accepted by every modifier; the modifier is
/// handed over so the value can decide what it means for itself.
pub trait SqlExpressible: fmt::Debug + Send + Sync {
    /// Renders the value as SQL text.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot format the value.
    fn render(
        &self,
        engine: &dyn Engine,
        modifier: Option<Modifier>,
    ) -> Result<String, EngineError>;
}

/// A typed value in the argument stream.
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Binary(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day.
    DateTime(NaiveDateTime),
    /// Raw SQL inserted verbatim.
    Literal(String),
    /// Ordered list of values.
    List(Vec<Self>),
    /// Ordered mapping; keys may carry a `%code` suffix.
    Map(Vec<(String, Self)>),
    /// A nested argument stream translated as a sub-statement.
    Fragment(Vec<Arg>),
    /// A value that renders itself through the engine.
    Expr(Arc<dyn SqlExpressible>),
}

impl Value {
    /// Creates a raw SQL literal.
    #[must_use]
    pub fn literal(sql: impl Into<String>) -> Self {
        Self::Literal(sql.into())
    }

    /// Creates a list from any iterator of convertible values.
    #[must_use]
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates an ordered mapping.
    #[must_use]
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates a nested sub-statement.
    #[must_use]
    pub fn fragment<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Self::Fragment(args.into_iter().map(Into::into).collect())
    }

    /// Wraps an expressible value.
    #[must_use]
    pub fn expr(value: impl SqlExpressible + 'static) -> Self {
        Self::Expr(Arc::new(value))
    }

    /// Returns a short name of the value's kind, used in issue messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Literal(_) => "literal",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Fragment(_) => "fragment",
            Self::Expr(_) => "expression",
        }
    }

    /// Returns true if the value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the truthiness of the value, as used by `%if`.
    ///
    /// NULL, `false`, zero, empty text and empty collections are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) | Self::Literal(s) => !s.is_empty(),
            Self::Binary(b) => !b.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
            Self::Fragment(args) => !args.is_empty(),
            Self::Date(_) | Self::DateTime(_) | Self::Expr(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) | (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Fragment(a), Self::Fragment(b)) => a == b,
            (Self::Expr(a), Self::Expr(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.naive_utc())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

/// One token of the argument stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Literal SQL text, scanned for quoting, identifiers and markers.
    Sql(String),
    /// A typed value.
    Value(Value),
    /// An explicit modifier code bound to the next token.
    Modifier(String),
}

impl Arg {
    /// Creates a literal SQL fragment.
    #[must_use]
    pub fn sql(text: impl Into<String>) -> Self {
        Self::Sql(text.into())
    }

    /// Creates an explicit modifier marker (code without `%`).
    #[must_use]
    pub fn modifier(code: impl Into<String>) -> Self {
        Self::Modifier(code.into())
    }

    /// Creates a value token.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Converts an element of an expanded list back into a stream token.
    ///
    /// Text elements become SQL fragments; everything else stays a value.
    #[must_use]
    pub fn from_expanded(value: Value) -> Self {
        match value {
            Value::Text(text) => Self::Sql(text),
            other => Self::Value(other),
        }
    }

    /// Turns the token into a value, as needed when a modifier or
    /// placeholder consumes it. Literal text becomes a text value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Sql(text) | Self::Modifier(text) => Value::Text(text),
            Self::Value(value) => value,
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Sql(String::from(value))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Sql(value)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! arg_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

arg_from_value!(bool, i64, i32, i16, i8, u32, u16, u8, f64, f32, NaiveDate, NaiveDateTime);

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(value: Vec<T>) -> Self {
        Self::Value(Value::list(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        Self::Value(Value::from(value))
    }
}

/// Builds a `Vec<Arg>` from a mixed list of fragments and values.
///
/// String literals become SQL fragments; anything else goes through
/// `Arg::from`.
///
/// ```rust
/// use oxide_translator::{args, Arg, Value};
///
/// let stream = args!["SELECT * FROM t WHERE id =", 5];
/// assert_eq!(stream, vec![Arg::sql("SELECT * FROM t WHERE id ="), Arg::Value(Value::Int(5))]);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}
