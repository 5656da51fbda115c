//! Extraction of typed values from grouped fields

use crate::error::{DecodeError, DecodeResult};
use crate::fields::FieldMap;
use chrono::{FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Layout of the `d:` timestamp field, always UTC with millisecond precision
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3fZ";

/// The entity named by the first `e:` field, or empty when there is none.
pub fn resolve_entity(fields: &FieldMap) -> String {
    fields.first("e").unwrap_or_default().to_string()
}

/// Resolve the command timestamp in epoch milliseconds.
///
/// `ms:` wins over `d:`, and the current time is used when neither is present.
pub fn resolve_time(fields: &FieldMap) -> DecodeResult<i64> {
    if let Some(ms) = fields.first("ms") {
        return ms
            .parse::<i64>()
            .map_err(|e| DecodeError::InvalidTimestamp {
                value: ms.to_string(),
                reason: e.to_string(),
            });
    }

    if let Some(date) = fields.first("d") {
        return parse_iso_millis(date);
    }

    Ok(Utc::now().timestamp_millis())
}

pub fn parse_iso_millis(date: &str) -> DecodeResult<i64> {
    NaiveDateTime::parse_from_str(date, ISO_FORMAT)
        .map(|dt| dt.and_utc().timestamp_millis())
        .map_err(|e| DecodeError::InvalidTimestamp {
            value: date.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a numeric field value.
///
/// Accepts `NaN`, finite decimal integers and floats with optional sign and
/// exponent, and `0x` hexadecimal integers. The sign goes before the `0x`.
pub fn resolve_number(text: &str) -> DecodeResult<f64> {
    if text == "NaN" {
        return Ok(f64::NAN);
    }

    let invalid = || DecodeError::InvalidNumber {
        value: text.to_string(),
    };

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        // from_str_radix would take a second sign after the prefix
        if hex.starts_with(['+', '-']) {
            return Err(invalid());
        }
        let value = i64::from_str_radix(hex, 16).map_err(|_| invalid())? as f64;
        return Ok(if negative { -value } else { value });
    }

    // f64's parser also takes words like "inf" and "nan"
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }

    let value = text.parse::<f64>().map_err(|_| invalid())?;
    // overflow such as 1e999 parses to infinity, which has no wire form
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Split a `key=value` entry on its first `=`; a missing `=` yields an empty value.
pub fn split_key_value(entry: &str) -> (&str, &str) {
    entry.split_once('=').unwrap_or((entry, ""))
}

/// Collect every entry under `prefix` as `key=value` pairs.
///
/// Later duplicates of a key replace earlier ones. An absent prefix yields an
/// empty map.
pub fn resolve_key_values(fields: &FieldMap, prefix: &str) -> BTreeMap<String, String> {
    fields
        .get(prefix)
        .unwrap_or_default()
        .iter()
        .map(|entry| {
            let (key, value) = split_key_value(entry);
            (key.to_string(), value.to_string())
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Short,
    Integer,
    Float,
    Long,
    Double,
    Decimal,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Short,
        DataType::Integer,
        DataType::Float,
        DataType::Long,
        DataType::Double,
        DataType::Decimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Short => "SHORT",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Long => "LONG",
            DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterpolateType {
    None,
    Linear,
    Previous,
}

impl InterpolateType {
    pub const ALL: [InterpolateType; 3] = [
        InterpolateType::None,
        InterpolateType::Linear,
        InterpolateType::Previous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolateType::None => "NONE",
            InterpolateType::Linear => "LINEAR",
            InterpolateType::Previous => "PREVIOUS",
        }
    }
}

fn lookup<T: Copy>(
    kind: &'static str,
    value: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> DecodeResult<T> {
    let upper = value.to_uppercase();
    all.iter()
        .copied()
        .find(|candidate| name(candidate) == upper)
        .ok_or_else(|| DecodeError::UnknownEnumValue {
            kind,
            value: value.to_string(),
        })
}

/// Case-insensitive lookup; an absent value resolves to `None`.
pub fn resolve_data_type(value: Option<&str>) -> DecodeResult<Option<DataType>> {
    value
        .map(|v| lookup("data type", v, &DataType::ALL, DataType::as_str))
        .transpose()
}

pub fn resolve_interpolate_type(value: Option<&str>) -> DecodeResult<Option<InterpolateType>> {
    value
        .map(|v| lookup("interpolate type", v, &InterpolateType::ALL, InterpolateType::as_str))
        .transpose()
}

/// Resolve `UTC`, `GMT`, `Z`, or `UTC+HH:MM` / `GMT-HH:MM` to a fixed offset.
pub fn resolve_time_zone(value: Option<&str>) -> DecodeResult<Option<FixedOffset>> {
    value.map(parse_time_zone).transpose()
}

fn parse_time_zone(value: &str) -> DecodeResult<FixedOffset> {
    let unknown = || DecodeError::UnknownEnumValue {
        kind: "time zone",
        value: value.to_string(),
    };

    let upper = value.to_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z") {
        return FixedOffset::east_opt(0).ok_or_else(unknown);
    }

    let offset = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .ok_or_else(unknown)?;

    let (sign, hhmm) = if let Some(rest) = offset.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = offset.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(unknown());
    };

    let (hours, minutes) = hhmm.split_once(':').ok_or_else(unknown)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(unknown());
    }
    let hours: i32 = hours.parse().map_err(|_| unknown())?;
    let minutes: i32 = minutes.parse().map_err(|_| unknown())?;
    if hours > 18 || minutes > 59 {
        return Err(unknown());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(unknown)
}
