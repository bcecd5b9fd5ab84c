//! Per-family parse and format rules.
//!
//! Every function here handles a non-empty input only; empty input and
//! `Null` values are dealt with once, in [`crate::registry`], for all
//! families. All formats are culture-invariant.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};
use uuid::Uuid;

use crate::error::{Result, SerializerError};
use crate::options::ConversionOptions;
use crate::types::{NumericKind, TypeDescriptor, TypeKind};
use crate::value::{DateTimeValue, EnumValue, ScalarValue};

/// Largest day count a duration may carry on the wire.
const MAX_DURATION_DAYS: i64 = 10_675_199;

/// Fractional digits in the round-trip formats (100ns ticks).
const TICK_DIGITS: usize = 7;

const NANOS_PER_TICK: u32 = 100;

fn mismatch(ty: &TypeDescriptor, value: &ScalarValue) -> SerializerError {
    SerializerError::mismatch(ty.name(), value.kind_name())
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

pub(crate) fn parse_enum(
    text: &str,
    ty: &TypeDescriptor,
    options: &ConversionOptions,
) -> Result<ScalarValue> {
    let TypeKind::Enum(desc) = ty.kind() else {
        return Err(SerializerError::mismatch(ty.name(), "enum"));
    };
    let trimmed = text.trim();

    if let Some(member) = desc.find_by_name(trimmed, options.ignore_case_for_enum) {
        return Ok(ScalarValue::Enum(EnumValue::from_member(member)));
    }
    if let Some(member) = trimmed
        .parse::<i64>()
        .ok()
        .and_then(|value| desc.find_by_value(value))
    {
        return Ok(ScalarValue::Enum(EnumValue::from_member(member)));
    }
    // Aliases are consulted only after both name and value miss.
    match desc.find_by_alias(trimmed) {
        Some(member) => Ok(ScalarValue::Enum(EnumValue::from_member(member))),
        None => Err(SerializerError::UnknownEnumMember {
            enum_name: desc.name().to_string(),
            input: text.to_string(),
        }),
    }
}

pub(crate) fn format_enum(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    let TypeKind::Enum(desc) = ty.kind() else {
        return Err(mismatch(ty, value));
    };
    match value {
        ScalarValue::Enum(e) => desc
            .members()
            .iter()
            .find(|m| m.name == e.name() && m.value == e.value())
            .map(|m| m.name.clone())
            .ok_or_else(|| {
                SerializerError::mismatch(ty.name(), &format!("{}({})", e.name(), e.value()))
            }),
        ScalarValue::Int(n) => desc
            .find_by_value(*n)
            .map(|m| m.name.clone())
            .ok_or_else(|| SerializerError::Format {
                type_name: ty.name().to_string(),
                reason: format!("{n} is not a declared member value"),
            }),
        _ => Err(mismatch(ty, value)),
    }
}

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

pub(crate) fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub(crate) fn parse_bool(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    match text {
        "1" => return Ok(ScalarValue::Bool(true)),
        "0" => return Ok(ScalarValue::Bool(false)),
        _ => {}
    }
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(ScalarValue::Bool(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(ScalarValue::Bool(false))
    } else {
        Err(SerializerError::parse(
            ty.name(),
            text,
            "expected true, false, 1 or 0",
        ))
    }
}

pub(crate) fn format_bool(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match value {
        ScalarValue::Bool(b) => Ok(bool_text(*b).to_string()),
        _ => Err(mismatch(ty, value)),
    }
}

// ---------------------------------------------------------------------------
// Date and time
// ---------------------------------------------------------------------------

fn round_trip_body(naive: &NaiveDateTime) -> String {
    format!(
        "{}.{:0width$}",
        naive.format("%Y-%m-%dT%H:%M:%S"),
        naive.nanosecond() / 100,
        width = TICK_DIGITS
    )
}

/// Reject instants the round-trip text cannot carry exactly: years outside
/// 1..=9999 and sub-tick precision.
fn check_round_trip(naive: &NaiveDateTime, ty: &TypeDescriptor) -> Result<()> {
    let reason = if !(1..=9999).contains(&naive.year()) {
        format!("year {} is outside 1..=9999", naive.year())
    } else if naive.nanosecond() % NANOS_PER_TICK != 0 {
        format!("{}ns is finer than 100ns ticks", naive.nanosecond())
    } else {
        return Ok(());
    };
    Err(SerializerError::Format {
        type_name: ty.name().to_string(),
        reason,
    })
}

pub(crate) fn format_date_time(value: &DateTimeValue) -> String {
    match value {
        DateTimeValue::Unspecified(naive) => round_trip_body(naive),
        DateTimeValue::Utc(dt) => format!("{}Z", round_trip_body(&dt.naive_utc())),
    }
}

pub(crate) fn format_date_time_offset(value: &DateTime<FixedOffset>) -> String {
    format!(
        "{}{}",
        round_trip_body(&value.naive_local()),
        value.format("%:z")
    )
}

fn naive_from_text(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Round-trip-kind parse: a zone designator pins the value to UTC, its
/// absence leaves it unspecified.
pub(crate) fn parse_date_time(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ScalarValue::DateTime(DateTimeValue::Utc(
            dt.with_timezone(&Utc),
        )));
    }
    naive_from_text(trimmed)
        .map(|naive| ScalarValue::DateTime(DateTimeValue::Unspecified(naive)))
        .ok_or_else(|| SerializerError::parse(ty.name(), text, "not a round-trip date/time"))
}

pub(crate) fn format_date_time_value(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match value {
        ScalarValue::DateTime(dt) => {
            check_round_trip(&dt.naive(), ty)?;
            Ok(format_date_time(dt))
        }
        _ => Err(mismatch(ty, value)),
    }
}

/// Inputs without an offset are taken as UTC.
pub(crate) fn parse_date_time_offset(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ScalarValue::DateTimeOffset(dt));
    }
    naive_from_text(trimmed)
        .map(|naive| ScalarValue::DateTimeOffset(Utc.fix().from_utc_datetime(&naive)))
        .ok_or_else(|| {
            SerializerError::parse(ty.name(), text, "not a round-trip date/time with offset")
        })
}

pub(crate) fn format_date_time_offset_value(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match value {
        ScalarValue::DateTimeOffset(dt) => {
            check_round_trip(&dt.naive_local(), ty)?;
            if dt.offset().local_minus_utc() % 60 != 0 {
                return Err(SerializerError::Format {
                    type_name: ty.name().to_string(),
                    reason: format!("offset {} is not a whole minute", dt.offset()),
                });
            }
            Ok(format_date_time_offset(dt))
        }
        _ => Err(mismatch(ty, value)),
    }
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// General long form: `[-]d:hh:mm:ss.fffffff`.
pub(crate) fn format_duration(value: &chrono::Duration) -> String {
    let negative = *value < chrono::Duration::zero();
    let abs = if negative { -*value } else { *value };

    let days = abs.num_days();
    let rem = abs - chrono::Duration::days(days);
    let hours = rem.num_hours();
    let rem = rem - chrono::Duration::hours(hours);
    let minutes = rem.num_minutes();
    let rem = rem - chrono::Duration::minutes(minutes);
    let seconds = rem.num_seconds();
    let rem = rem - chrono::Duration::seconds(seconds);
    let ticks = rem.num_nanoseconds().unwrap_or(0) / 100;

    format!(
        "{}{}:{:02}:{:02}:{:02}.{:0width$}",
        if negative { "-" } else { "" },
        days,
        hours,
        minutes,
        seconds,
        ticks,
        width = TICK_DIGITS
    )
}

fn component(text: &str, what: &str) -> std::result::Result<i64, String> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {what} component {text:?}"));
    }
    text.parse::<i64>().map_err(|e| format!("invalid {what}: {e}"))
}

/// `"d.hh"` or `"hh"`.
fn days_and_hours(text: &str) -> std::result::Result<(i64, i64), String> {
    match text.split_once('.') {
        Some((days, hours)) => Ok((component(days, "days")?, component(hours, "hours")?)),
        None => Ok((0, component(text, "hours")?)),
    }
}

/// `"ss"` or `"ss.fffffff"` into whole seconds and 100ns ticks.
fn seconds_and_ticks(text: &str) -> std::result::Result<(i64, i64), String> {
    let (secs, frac) = match text.split_once('.') {
        Some((secs, frac)) => (secs, Some(frac)),
        None => (text, None),
    };
    let seconds = component(secs, "seconds")?;
    let ticks = match frac {
        None => 0,
        Some(frac) if frac.len() > TICK_DIGITS => {
            return Err(format!("more than {TICK_DIGITS} fractional digits"));
        }
        Some(frac) => component(frac, "fraction")? * 10_i64.pow((TICK_DIGITS - frac.len()) as u32),
    };
    Ok((seconds, ticks))
}

pub(crate) fn duration_from_text(text: &str) -> std::result::Result<chrono::Duration, String> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let (days, hours, minutes, seconds, ticks) = match parts.as_slice() {
        [days] => (component(days, "days")?, 0, 0, 0, 0),
        [hours, minutes] => {
            let (d, h) = days_and_hours(hours)?;
            (d, h, component(minutes, "minutes")?, 0, 0)
        }
        [hours, minutes, seconds] => {
            let (d, h) = days_and_hours(hours)?;
            let (s, t) = seconds_and_ticks(seconds)?;
            (d, h, component(minutes, "minutes")?, s, t)
        }
        [days, hours, minutes, seconds] => {
            let (s, t) = seconds_and_ticks(seconds)?;
            (
                component(days, "days")?,
                component(hours, "hours")?,
                component(minutes, "minutes")?,
                s,
                t,
            )
        }
        _ => return Err("too many components".to_string()),
    };

    if days > MAX_DURATION_DAYS {
        return Err(format!("more than {MAX_DURATION_DAYS} days"));
    }
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err("component out of range".to_string());
    }

    let total = chrono::Duration::days(days)
        + chrono::Duration::hours(hours)
        + chrono::Duration::minutes(minutes)
        + chrono::Duration::seconds(seconds)
        + chrono::Duration::nanoseconds(ticks * 100);
    Ok(if negative { -total } else { total })
}

pub(crate) fn parse_duration(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    duration_from_text(text)
        .map(ScalarValue::Duration)
        .map_err(|reason| SerializerError::parse(ty.name(), text, reason))
}

pub(crate) fn format_duration_value(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match value {
        ScalarValue::Duration(d) => {
            let abs = if *d < chrono::Duration::zero() { -*d } else { *d };
            let reason = if abs.num_days() > MAX_DURATION_DAYS {
                format!("more than {MAX_DURATION_DAYS} days")
            } else if abs.subsec_nanos() % NANOS_PER_TICK as i32 != 0 {
                format!("{}ns is finer than 100ns ticks", abs.subsec_nanos())
            } else {
                return Ok(format_duration(d));
            };
            Err(SerializerError::Format {
                type_name: ty.name().to_string(),
                reason,
            })
        }
        _ => Err(mismatch(ty, value)),
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub(crate) fn parse_guid(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    Uuid::parse_str(text.trim())
        .map(ScalarValue::Guid)
        .map_err(|e| SerializerError::parse(ty.name(), text, e))
}

pub(crate) fn format_guid(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match value {
        ScalarValue::Guid(g) => Ok(g.hyphenated().to_string()),
        _ => Err(mismatch(ty, value)),
    }
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

pub(crate) fn parse_char(
    text: &str,
    ty: &TypeDescriptor,
    options: &ConversionOptions,
) -> Result<ScalarValue> {
    if options.serialize_char_as_int {
        let unit = text
            .trim()
            .parse::<u16>()
            .map_err(|e| SerializerError::parse(ty.name(), text, e))?;
        return char::from_u32(u32::from(unit))
            .map(ScalarValue::Char)
            .ok_or_else(|| SerializerError::parse(ty.name(), text, "lone surrogate code unit"));
    }

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(ScalarValue::Char(c)),
        _ => Err(SerializerError::parse(
            ty.name(),
            text,
            "expected exactly one character",
        )),
    }
}

pub(crate) fn format_char(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    options: &ConversionOptions,
) -> Result<String> {
    let ScalarValue::Char(c) = value else {
        return Err(mismatch(ty, value));
    };
    if !options.serialize_char_as_int {
        return Ok(c.to_string());
    }
    u16::try_from(u32::from(*c))
        .map(|unit| unit.to_string())
        .map_err(|_| SerializerError::Format {
            type_name: ty.name().to_string(),
            reason: format!("{c:?} does not fit a 16-bit code unit"),
        })
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

fn parse_as<T>(text: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>().map_err(|e| e.to_string())
}

fn int_bounds(kind: NumericKind) -> (i128, i128) {
    match kind {
        NumericKind::I8 => (i8::MIN.into(), i8::MAX.into()),
        NumericKind::I16 => (i16::MIN.into(), i16::MAX.into()),
        NumericKind::I32 => (i32::MIN.into(), i32::MAX.into()),
        NumericKind::I64 => (i64::MIN.into(), i64::MAX.into()),
        NumericKind::U8 => (0, u8::MAX.into()),
        NumericKind::U16 => (0, u16::MAX.into()),
        NumericKind::U32 => (0, u32::MAX.into()),
        NumericKind::U64 => (0, u64::MAX.into()),
        NumericKind::F32 | NumericKind::F64 => (i128::MIN, i128::MAX),
    }
}

pub(crate) fn parse_numeric(
    text: &str,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    let TypeKind::Numeric(kind) = ty.kind() else {
        return Err(SerializerError::mismatch(ty.name(), "number"));
    };
    let t = text.trim();
    let parsed = match kind {
        NumericKind::I8 => parse_as::<i8>(t).map(|v| ScalarValue::Int(v.into())),
        NumericKind::I16 => parse_as::<i16>(t).map(|v| ScalarValue::Int(v.into())),
        NumericKind::I32 => parse_as::<i32>(t).map(|v| ScalarValue::Int(v.into())),
        NumericKind::I64 => parse_as::<i64>(t).map(ScalarValue::Int),
        NumericKind::U8 => parse_as::<u8>(t).map(|v| ScalarValue::UInt(v.into())),
        NumericKind::U16 => parse_as::<u16>(t).map(|v| ScalarValue::UInt(v.into())),
        NumericKind::U32 => parse_as::<u32>(t).map(|v| ScalarValue::UInt(v.into())),
        NumericKind::U64 => parse_as::<u64>(t).map(ScalarValue::UInt),
        NumericKind::F32 => parse_as::<f32>(t).map(|v| ScalarValue::Float(v.into())),
        NumericKind::F64 => parse_as::<f64>(t).map(ScalarValue::Float),
    };
    parsed.map_err(|reason| SerializerError::parse(ty.name(), text, reason))
}

pub(crate) fn format_numeric(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    let TypeKind::Numeric(kind) = ty.kind() else {
        return Err(mismatch(ty, value));
    };
    let integer = match value {
        ScalarValue::Float(x) if *kind == NumericKind::F32 => return Ok((*x as f32).to_string()),
        ScalarValue::Float(x) if kind.is_float() => return Ok(x.to_string()),
        ScalarValue::Int(i) => i128::from(*i),
        ScalarValue::UInt(u) => i128::from(*u),
        _ => return Err(mismatch(ty, value)),
    };
    let (min, max) = int_bounds(*kind);
    if integer < min || integer > max {
        return Err(SerializerError::Format {
            type_name: ty.name().to_string(),
            reason: format!("{integer} is out of range"),
        });
    }
    Ok(integer.to_string())
}

// ---------------------------------------------------------------------------
// Strings, the untyped marker, and everything else
// ---------------------------------------------------------------------------

pub(crate) fn parse_text(
    text: &str,
    _ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<ScalarValue> {
    Ok(ScalarValue::String(text.to_string()))
}

/// Strings accept only string values; the untyped marker and other types
/// write any value's canonical text.
pub(crate) fn format_text(
    value: &ScalarValue,
    ty: &TypeDescriptor,
    _options: &ConversionOptions,
) -> Result<String> {
    match (ty.kind(), value) {
        (TypeKind::String, ScalarValue::String(s)) => Ok(s.clone()),
        (TypeKind::String, _) => Err(mismatch(ty, value)),
        _ => Ok(value.to_string()),
    }
}
