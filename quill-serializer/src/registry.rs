//! Global scalar converter registry.
//!
//! Conversion rules are data: a table from [`ScalarFamily`] to a pair of
//! function pointers. Converters are built from a rule once per
//! [`ScalarConverterKey`] and shared from then on.
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use quill_common::logging::{Component, Logger};

use crate::error::Result;
use crate::formats;
use crate::options::ConversionOptions;
use crate::redaction::{self, RedactionRule};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::ScalarValue;

/// Parse rule for one family. Never sees empty input.
pub type ParseFn = fn(&str, &TypeDescriptor, &ConversionOptions) -> Result<ScalarValue>;

/// Format rule for one family. Never sees `Null`.
pub type FormatFn = fn(&ScalarValue, &TypeDescriptor, &ConversionOptions) -> Result<String>;

type ParseClosure = dyn Fn(&str, &ConversionOptions) -> Result<ScalarValue> + Send + Sync;

type FormatClosure = dyn Fn(&ScalarValue, &ConversionOptions) -> Result<Option<String>> + Send + Sync;

/// Group of types sharing one parse/format rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFamily {
    Enum,
    Bool,
    DateTime,
    DateTimeOffset,
    Duration,
    Guid,
    Char,
    Numeric,
    /// Strings, the untyped marker and any other type: generic text coercion.
    Text,
}

impl ScalarFamily {
    pub fn of(ty: &TypeDescriptor) -> Self {
        match ty.kind() {
            TypeKind::Enum(_) => ScalarFamily::Enum,
            TypeKind::Bool => ScalarFamily::Bool,
            TypeKind::DateTime => ScalarFamily::DateTime,
            TypeKind::DateTimeOffset => ScalarFamily::DateTimeOffset,
            TypeKind::Duration => ScalarFamily::Duration,
            TypeKind::Guid => ScalarFamily::Guid,
            TypeKind::Char => ScalarFamily::Char,
            TypeKind::Numeric(_) => ScalarFamily::Numeric,
            TypeKind::Dynamic | TypeKind::String | TypeKind::Object => ScalarFamily::Text,
        }
    }
}

#[derive(Clone, Copy)]
pub struct ConversionRule {
    pub parse: ParseFn,
    pub format: FormatFn,
}

impl fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRule").finish_non_exhaustive()
    }
}

/// The rule registered for a family. Exhaustive over [`ScalarFamily`].
fn rule_for(family: ScalarFamily) -> ConversionRule {
    let (parse, format): (ParseFn, FormatFn) = match family {
        ScalarFamily::Enum => (formats::parse_enum, formats::format_enum),
        ScalarFamily::Bool => (formats::parse_bool, formats::format_bool),
        ScalarFamily::DateTime => (formats::parse_date_time, formats::format_date_time_value),
        ScalarFamily::DateTimeOffset => (
            formats::parse_date_time_offset,
            formats::format_date_time_offset_value,
        ),
        ScalarFamily::Duration => (formats::parse_duration, formats::format_duration_value),
        ScalarFamily::Guid => (formats::parse_guid, formats::format_guid),
        ScalarFamily::Char => (formats::parse_char, formats::format_char),
        ScalarFamily::Numeric => (formats::parse_numeric, formats::format_numeric),
        ScalarFamily::Text => (formats::parse_text, formats::format_text),
    };
    ConversionRule { parse, format }
}

/// Cache key for converters: the target type plus the redaction rule, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalarConverterKey {
    pub ty: TypeDescriptor,
    pub redaction: Option<RedactionRule>,
}

impl ScalarConverterKey {
    pub fn has_redaction(&self) -> bool {
        self.redaction.is_some()
    }
}

/// Immutable parse/format pair bound to one type.
pub struct ScalarConverter {
    target: TypeDescriptor,
    parse_fn: Box<ParseClosure>,
    format_fn: Box<FormatClosure>,
}

impl fmt::Debug for ScalarConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarConverter")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl ScalarConverter {
    pub(crate) fn new(
        target: TypeDescriptor,
        parse_fn: Box<ParseClosure>,
        format_fn: Box<FormatClosure>,
    ) -> Self {
        Self {
            target,
            parse_fn,
            format_fn,
        }
    }

    /// Bind a family rule to `ty`. Empty input yields the zero value, or
    /// `Null` for types that admit absence; `Null` formats to `None`.
    pub fn from_rule(ty: TypeDescriptor, rule: ConversionRule) -> Self {
        let parse_ty = ty.clone();
        let format_ty = ty.clone();
        Self::new(
            ty,
            Box::new(move |text: &str, options: &ConversionOptions| {
                if text.is_empty() {
                    return Ok(ScalarValue::zero_for(&parse_ty));
                }
                (rule.parse)(text, &parse_ty, options)
            }),
            Box::new(move |value: &ScalarValue, options: &ConversionOptions| {
                if value.is_null() {
                    return Ok(None);
                }
                (rule.format)(value, &format_ty, options).map(Some)
            }),
        )
    }

    pub fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    pub fn parse(&self, text: &str, options: &ConversionOptions) -> Result<ScalarValue> {
        (self.parse_fn)(text, options)
    }

    /// `None` means the value is absent and the writer emits its null literal.
    pub fn format(&self, value: &ScalarValue, options: &ConversionOptions) -> Result<Option<String>> {
        (self.format_fn)(value, options)
    }
}

static LOGGER: Lazy<Logger> = Lazy::new(|| {
    Logger::new_root(Component::Serializer, "quill").with_component(Component::Registry)
});

/// Global, thread-safe map: (type, redaction) -> converter.
static CONVERTERS: Lazy<DashMap<ScalarConverterKey, Arc<ScalarConverter>>> =
    Lazy::new(DashMap::new);

/// Get the converter for `ty`, building and publishing it on first use.
///
/// Construction runs outside the map's locks; if two threads race on the same
/// key the first published converter is kept and returned to both.
pub fn get_converter(ty: &TypeDescriptor, rule: Option<&RedactionRule>) -> Arc<ScalarConverter> {
    let key = ScalarConverterKey {
        ty: ty.clone(),
        redaction: rule.cloned(),
    };
    if let Some(existing) = CONVERTERS.get(&key) {
        return existing.value().clone();
    }

    let converter = match rule {
        Some(rule) => {
            LOGGER
                .with_component(Component::Redaction)
                .debug_args(format_args!("Masking {} with {:?}", ty, rule.mask()));
            redaction::wrap(get_converter(ty, None), rule.clone())
        }
        None => {
            let family = ScalarFamily::of(ty);
            LOGGER.debug_args(format_args!("Built {:?} converter for {}", family, ty));
            ScalarConverter::from_rule(ty.clone(), rule_for(family))
        }
    };

    CONVERTERS
        .entry(key)
        .or_insert_with(|| Arc::new(converter))
        .value()
        .clone()
}

/// Number of converters published so far.
pub fn converter_count() -> usize {
    CONVERTERS.len()
}
