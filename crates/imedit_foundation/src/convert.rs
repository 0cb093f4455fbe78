//! Value coercion.
//!
//! Properties hold untyped [`Value`]s. The typed accessors go through a
//! [`Converter`], which is injected into each property rather than looked up
//! from global state so tests can substitute their own.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::{Money, Value};

/// Type requested from a converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TargetType {
    /// `bool`.
    Bool,
    /// `i32`.
    Int,
    /// `i64`.
    Long,
    /// String.
    String,
    /// Decimal.
    Decimal,
    /// Money.
    Money,
    /// Date-time.
    Date,
    /// Object reference.
    Reference,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::String => "string",
            Self::Decimal => "decimal",
            Self::Money => "money",
            Self::Date => "date",
            Self::Reference => "reference",
        };
        write!(f, "{name}")
    }
}

/// Failure to coerce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value's type has no conversion to the target.
    #[error("cannot convert {from} to {to}")]
    Unsupported {
        /// Description of the source type.
        from: String,
        /// The target type.
        to: TargetType,
    },
    /// A string could not be parsed as the target.
    #[error("cannot parse {text:?} as {to}")]
    Unparseable {
        /// The offending text.
        text: String,
        /// The target type.
        to: TargetType,
    },
    /// The value does not fit in the target.
    #[error("{value} is out of range for {to}")]
    OutOfRange {
        /// The offending value.
        value: String,
        /// The target type.
        to: TargetType,
    },
}

/// Coerces values between representations.
///
/// Implementations never receive [`Value::Null`]; callers substitute their
/// default before converting.
pub trait Converter {
    /// Converts `value` to `target`, returning the converted value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the value cannot be represented as
    /// `target`.
    fn convert(&self, value: &Value, target: TargetType) -> Result<Value, ConversionError>;
}

/// The standard converter.
///
/// - Numbers widen and narrow between integer, decimal and money, failing if
///   a fractional or out-of-range value would be truncated into an integer.
/// - Strings parse into every scalar target.
/// - Every scalar renders to a string.
/// - Booleans accept `true`/`false`/`1`/`0`/`yes`/`no` when parsed from text.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConverter;

impl DefaultConverter {
    /// Creates a new converter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn to_bool(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Int(n) => Ok(Value::Bool(*n != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "n" => Ok(Value::Bool(false)),
                _ => Err(unparseable(s, TargetType::Bool)),
            },
            other => Err(unsupported(other, TargetType::Bool)),
        }
    }

    fn to_long(value: &Value, target: TargetType) -> Result<i64, ConversionError> {
        match value {
            Value::Int(n) => Ok(*n),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Decimal(_) | Value::Money(_) => {
                let d = value.as_decimal().unwrap_or_default();
                if d.fract().is_zero() {
                    d.to_i64().ok_or_else(|| out_of_range(value, target))
                } else {
                    Err(out_of_range(value, target))
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| unparseable(s, target)),
            other => Err(unsupported(other, target)),
        }
    }

    fn to_decimal(value: &Value, target: TargetType) -> Result<Decimal, ConversionError> {
        match value {
            Value::Int(_) | Value::Decimal(_) | Value::Money(_) => {
                Ok(value.as_decimal().unwrap_or_default())
            }
            Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| unparseable(s, target)),
            other => Err(unsupported(other, target)),
        }
    }

    fn to_date(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Date(d) => Ok(Value::Date(*d)),
            Value::String(s) => parse_date_time(s.trim())
                .map(Value::Date)
                .ok_or_else(|| unparseable(s, TargetType::Date)),
            other => Err(unsupported(other, TargetType::Date)),
        }
    }
}

impl Converter for DefaultConverter {
    fn convert(&self, value: &Value, target: TargetType) -> Result<Value, ConversionError> {
        match target {
            TargetType::Bool => Self::to_bool(value),
            TargetType::Int => {
                let n = Self::to_long(value, target)?;
                i32::try_from(n)
                    .map(|_| Value::Int(n))
                    .map_err(|_| out_of_range(value, target))
            }
            TargetType::Long => Self::to_long(value, target).map(Value::Int),
            TargetType::Decimal => Self::to_decimal(value, target).map(Value::Decimal),
            TargetType::Money => Self::to_decimal(value, target).map(|d| Value::Money(Money(d))),
            TargetType::String => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) => Ok(Value::String(s.clone())),
                other => Ok(Value::from(other.to_string())),
            },
            TargetType::Date => Self::to_date(value),
            TargetType::Reference => match value {
                Value::Reference(r) => Ok(Value::Reference(r.clone())),
                other => Err(unsupported(other, target)),
            },
        }
    }
}

/// Parses an ISO-8601 style date or date-time: `2024-03-01`,
/// `2024-03-01 10:15`, `2024-03-01 10:15:30` or `2024-03-01T10:15:30`.
#[must_use]
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    const PATTERNS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn describe(value: &Value) -> String {
    value
        .natural_type()
        .map_or_else(|| "null".to_string(), |t| t.to_string())
}

fn unsupported(value: &Value, to: TargetType) -> ConversionError {
    ConversionError::Unsupported {
        from: describe(value),
        to,
    }
}

fn unparseable(text: &str, to: TargetType) -> ConversionError {
    ConversionError::Unparseable {
        text: text.to_string(),
        to,
    }
}

fn out_of_range(value: &Value, to: TargetType) -> ConversionError {
    ConversionError::OutOfRange {
        value: value.to_string(),
        to,
    }
}
