//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is the comparable, hashable stand-in for a runtime
//! type. It is what the resolver and the converter registry key their caches
//! on, so equality is purely structural: two descriptors built independently
//! from the same parts are interchangeable.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::value::EnumValue;

/// Width and signedness of a numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericKind {
    pub fn is_float(self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            NumericKind::U8 | NumericKind::U16 | NumericKind::U32 | NumericKind::U64
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }
}

/// One declared member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    /// Alternate wire text accepted on parse when the name does not match.
    pub alias: Option<String>,
}

/// Declared shape of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumDescriptor {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
            alias: None,
        });
        self
    }

    pub fn member_with_alias(
        mut self,
        name: impl Into<String>,
        value: i64,
        alias: impl Into<String>,
    ) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
            alias: Some(alias.into()),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn find_by_name(&self, text: &str, ignore_case: bool) -> Option<&EnumMember> {
        if ignore_case {
            self.members
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(text))
        } else {
            self.members.iter().find(|m| m.name == text)
        }
    }

    pub fn find_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    pub fn find_by_alias(&self, text: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.alias.as_deref() == Some(text))
    }

    /// The value a missing input maps to: the member declared with value 0,
    /// or the first declared member when none is.
    pub fn zero(&self) -> EnumValue {
        self.find_by_value(0)
            .or_else(|| self.members.first())
            .map(EnumValue::from_member)
            .unwrap_or_else(|| EnumValue::new("0", 0))
    }
}

/// Concrete kind behind a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    /// The untyped marker: values whose type is only known at runtime.
    Dynamic,
    String,
    Numeric(NumericKind),
    Bool,
    DateTime,
    DateTimeOffset,
    Duration,
    Guid,
    Char,
    Enum(Arc<EnumDescriptor>),
    /// Any user-defined or container type.
    Object,
}

/// Interfaces a type can be used through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capabilities {
    /// Keyed lookup (dictionary-like).
    pub keyed_mapping: bool,
    /// Iteration (sequence-like).
    pub iterable: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        keyed_mapping: false,
        iterable: false,
    };
    pub const ITERABLE: Capabilities = Capabilities {
        keyed_mapping: false,
        iterable: true,
    };
    pub const MAPPING: Capabilities = Capabilities {
        keyed_mapping: true,
        iterable: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeDescriptor {
    name: Arc<str>,
    kind: TypeKind,
    nullable: bool,
    capabilities: Capabilities,
}

impl TypeDescriptor {
    fn build(name: &str, kind: TypeKind, capabilities: Capabilities) -> Self {
        Self {
            name: Arc::from(name),
            kind,
            nullable: false,
            capabilities,
        }
    }

    pub fn dynamic() -> Self {
        Self::build("object", TypeKind::Dynamic, Capabilities::NONE)
    }

    /// Strings are iterable over their characters but always classify as strings.
    pub fn string() -> Self {
        Self::build("string", TypeKind::String, Capabilities::ITERABLE)
    }

    pub fn numeric(kind: NumericKind) -> Self {
        Self::build(kind.as_str(), TypeKind::Numeric(kind), Capabilities::NONE)
    }

    pub fn bool() -> Self {
        Self::build("bool", TypeKind::Bool, Capabilities::NONE)
    }

    pub fn date_time() -> Self {
        Self::build("datetime", TypeKind::DateTime, Capabilities::NONE)
    }

    pub fn date_time_offset() -> Self {
        Self::build("datetimeoffset", TypeKind::DateTimeOffset, Capabilities::NONE)
    }

    pub fn duration() -> Self {
        Self::build("duration", TypeKind::Duration, Capabilities::NONE)
    }

    pub fn guid() -> Self {
        Self::build("guid", TypeKind::Guid, Capabilities::NONE)
    }

    pub fn char() -> Self {
        Self::build("char", TypeKind::Char, Capabilities::NONE)
    }

    pub fn enumeration(descriptor: Arc<EnumDescriptor>) -> Self {
        let name = descriptor.name().to_string();
        Self::build(&name, TypeKind::Enum(descriptor), Capabilities::NONE)
    }

    /// A user-defined type with no container capabilities.
    pub fn object(name: &str) -> Self {
        Self::build(name, TypeKind::Object, Capabilities::NONE)
    }

    pub fn sequence(name: &str) -> Self {
        Self::build(name, TypeKind::Object, Capabilities::ITERABLE)
    }

    pub fn dictionary(name: &str) -> Self {
        Self::build(name, TypeKind::Object, Capabilities::MAPPING)
    }

    /// A user-defined type exposing an arbitrary capability set.
    pub fn with_capabilities(name: &str, capabilities: Capabilities) -> Self {
        Self::build(name, TypeKind::Object, capabilities)
    }

    /// The optional variant of a value type. Reference-like types (strings,
    /// objects, the dynamic marker) already admit absence and are returned
    /// unchanged so that `T` and `T?` stay one cache entry.
    pub fn nullable(&self) -> Self {
        if !self.is_value_type() || self.nullable {
            return self.clone();
        }
        Self {
            name: Arc::from(format!("{}?", self.name)),
            kind: self.kind.clone(),
            nullable: true,
            capabilities: self.capabilities,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    /// Value types have a zero value; everything else defaults to absent.
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self.kind,
            TypeKind::Dynamic | TypeKind::String | TypeKind::Object
        )
    }

    /// Whether an empty input maps to `Null` rather than a zero value.
    pub fn accepts_null(&self) -> bool {
        self.nullable || !self.is_value_type()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Static Rust types with a known descriptor.
pub trait DescribeType {
    fn describe() -> TypeDescriptor;
}

impl TypeDescriptor {
    pub fn of<T: DescribeType>() -> Self {
        T::describe()
    }
}

macro_rules! describe_numeric {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl DescribeType for $t {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::numeric(NumericKind::$kind)
                }
            }
        )*
    };
}

describe_numeric!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64,
);

impl DescribeType for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::bool()
    }
}

impl DescribeType for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::string()
    }
}

impl DescribeType for char {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::char()
    }
}

impl DescribeType for NaiveDateTime {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::date_time()
    }
}

impl DescribeType for DateTime<Utc> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::date_time()
    }
}

impl DescribeType for DateTime<FixedOffset> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::date_time_offset()
    }
}

impl DescribeType for chrono::Duration {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::duration()
    }
}

impl DescribeType for Uuid {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::guid()
    }
}

impl DescribeType for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dynamic()
    }
}

impl<T: DescribeType> DescribeType for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe().nullable()
    }
}

impl<T: DescribeType> DescribeType for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(&format!("Vec<{}>", T::describe()))
    }
}

impl<K: DescribeType, V: DescribeType> DescribeType for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dictionary(&format!("HashMap<{}, {}>", K::describe(), V::describe()))
    }
}

impl<K: DescribeType, V: DescribeType> DescribeType for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dictionary(&format!("BTreeMap<{}, {}>", K::describe(), V::describe()))
    }
}
