use chrono::NaiveDateTime;
use duckdb::types::TimeUnit;
use duckdb::types::ToSqlOutput;
use duckdb::types::Value as DuckValue;
use duckdb::types::ValueRef;
use duckdb::ToSql;
use std::fmt::Display;

/// Semantic kind of a column, decided once when the dataset is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 64-bit signed integers
    Integer,
    /// Double precision floating point numbers
    Float,
    /// true / false
    Boolean,
    /// Dates and date-times
    Timestamp,
    /// Character strings
    Text,
    /// Values of more than one kind, stored as their text form
    Mixed,
}

impl ValueKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
            Self::Mixed => "mixed",
        }
    }

    /// Detects the common kind of a column from the kinds of its non-null values.
    ///
    /// Integers widen to floats; any other disagreement yields `Mixed`.
    /// A column without values is `Text`.
    pub fn detect<I>(kinds: I) -> ValueKind
    where
        I: IntoIterator<Item = ValueKind>,
    {
        let mut detected = None::<ValueKind>;
        for kind in kinds {
            detected = Some(match (detected, kind) {
                (None, kind) => kind,
                (Some(current), kind) if current == kind => current,
                (Some(ValueKind::Integer), ValueKind::Float) | (Some(ValueKind::Float), ValueKind::Integer) => ValueKind::Float,
                _ => return ValueKind::Mixed,
            });
        }
        detected.unwrap_or(ValueKind::Text)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dataset cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Kind of the value, `None` for `Null`.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Boolean(_) => Some(ValueKind::Boolean),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Text(_) => Some(ValueKind::Text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to the representation of a column of `kind`.
    ///
    /// Integers become floats in a `Float` column; in `Mixed` and `Text` columns every
    /// value becomes its text form. Values already of the column kind are unchanged.
    pub fn coerce(self, kind: ValueKind) -> Value {
        match (self, kind) {
            (Value::Null, _) => Value::Null,
            (Value::Integer(value), ValueKind::Float) => Value::Float(value as f64),
            (value @ Value::Text(_), _) => value,
            (value, ValueKind::Text | ValueKind::Mixed) => Value::Text(value.to_string()),
            (value, _) => value,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(DuckValue::Null),
            Value::Integer(value) => ToSqlOutput::Owned(DuckValue::BigInt(*value)),
            Value::Float(value) => ToSqlOutput::Owned(DuckValue::Double(*value)),
            Value::Boolean(value) => ToSqlOutput::Owned(DuckValue::Boolean(*value)),
            Value::Timestamp(value) => ToSqlOutput::Owned(DuckValue::Timestamp(
                TimeUnit::Microsecond,
                value.and_utc().timestamp_micros(),
            )),
            Value::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}
