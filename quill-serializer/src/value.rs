use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use uuid::Uuid;

use crate::formats;
use crate::types::{EnumMember, TypeDescriptor, TypeKind};

/// A resolved enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    name: Arc<str>,
    value: i64,
}

impl EnumValue {
    pub fn new(name: &str, value: i64) -> Self {
        Self {
            name: Arc::from(name),
            value,
        }
    }

    pub(crate) fn from_member(member: &EnumMember) -> Self {
        Self::new(&member.name, member.value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// A date and time that either carries no zone information or is pinned to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeValue {
    Unspecified(NaiveDateTime),
    Utc(DateTime<Utc>),
}

impl DateTimeValue {
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            DateTimeValue::Unspecified(naive) => *naive,
            DateTimeValue::Utc(dt) => dt.naive_utc(),
        }
    }
}

/// Dynamically-typed leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    DateTime(DateTimeValue),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(chrono::Duration),
    Guid(Uuid),
    Char(char),
    Enum(EnumValue),
}

/// 0001-01-01T00:00:00, the zero of the date/time families.
fn min_naive() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

impl ScalarValue {
    /// What an empty input parses to for `ty`.
    pub fn zero_for(ty: &TypeDescriptor) -> ScalarValue {
        if ty.accepts_null() {
            return ScalarValue::Null;
        }
        match ty.kind() {
            TypeKind::Numeric(kind) if kind.is_float() => ScalarValue::Float(0.0),
            TypeKind::Numeric(kind) if kind.is_unsigned() => ScalarValue::UInt(0),
            TypeKind::Numeric(_) => ScalarValue::Int(0),
            TypeKind::Bool => ScalarValue::Bool(false),
            TypeKind::DateTime => {
                ScalarValue::DateTime(DateTimeValue::Unspecified(min_naive()))
            }
            TypeKind::DateTimeOffset => {
                ScalarValue::DateTimeOffset(Utc.fix().from_utc_datetime(&min_naive()))
            }
            TypeKind::Duration => ScalarValue::Duration(chrono::Duration::zero()),
            TypeKind::Guid => ScalarValue::Guid(Uuid::nil()),
            TypeKind::Char => ScalarValue::Char('\0'),
            TypeKind::Enum(desc) => ScalarValue::Enum(desc.zero()),
            TypeKind::Dynamic | TypeKind::String | TypeKind::Object => ScalarValue::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::String(_) => "string",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int(_) => "int",
            ScalarValue::UInt(_) => "uint",
            ScalarValue::Float(_) => "float",
            ScalarValue::DateTime(_) => "datetime",
            ScalarValue::DateTimeOffset(_) => "datetimeoffset",
            ScalarValue::Duration(_) => "duration",
            ScalarValue::Guid(_) => "guid",
            ScalarValue::Char(_) => "char",
            ScalarValue::Enum(_) => "enum",
        }
    }
}

/// Canonical text of any value, used by the untyped and fallback converters.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => Ok(()),
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Bool(b) => f.write_str(formats::bool_text(*b)),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::UInt(u) => write!(f, "{u}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::DateTime(dt) => f.write_str(&formats::format_date_time(dt)),
            ScalarValue::DateTimeOffset(dt) => {
                f.write_str(&formats::format_date_time_offset(dt))
            }
            ScalarValue::Duration(d) => f.write_str(&formats::format_duration(d)),
            ScalarValue::Guid(g) => write!(f, "{}", g.hyphenated()),
            ScalarValue::Char(c) => write!(f, "{c}"),
            ScalarValue::Enum(e) => f.write_str(e.name()),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int(value.into())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::UInt(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<char> for ScalarValue {
    fn from(value: char) -> Self {
        ScalarValue::Char(value)
    }
}

impl From<Uuid> for ScalarValue {
    fn from(value: Uuid) -> Self {
        ScalarValue::Guid(value)
    }
}

impl From<chrono::Duration> for ScalarValue {
    fn from(value: chrono::Duration) -> Self {
        ScalarValue::Duration(value)
    }
}

impl From<DateTime<FixedOffset>> for ScalarValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        ScalarValue::DateTimeOffset(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(value: DateTime<Utc>) -> Self {
        ScalarValue::DateTime(DateTimeValue::Utc(value))
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(value: NaiveDateTime) -> Self {
        ScalarValue::DateTime(DateTimeValue::Unspecified(value))
    }
}

impl From<EnumValue> for ScalarValue {
    fn from(value: EnumValue) -> Self {
        ScalarValue::Enum(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}
