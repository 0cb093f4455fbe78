//! Date and time transformer.
//!
//! Accepts dates, date-times or times of day depending on the mode, and
//! checks them against the configured date range.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseResult, Timelike};
use imedit_foundation::{Error, ErrorKind, Result, Value};

use super::{TransformInput, Transformer, blank};
use crate::config::TransformerConfig;
use crate::property::Property;

/// What a [`DateTimeTransformer`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateTimeMode {
    /// Dates only. Any time of day is discarded.
    Date,
    /// Dates or date-times. A date alone means midnight.
    DateTime,
    /// Times of day, merged onto the date the property already holds.
    Time,
}

/// Parses and range-checks dates, date-times and times of day.
#[derive(Clone, Debug)]
pub struct DateTimeTransformer {
    mode: DateTimeMode,
    min: Option<NaiveDateTime>,
    max: Option<NaiveDateTime>,
    keep_seconds: bool,
    config: TransformerConfig,
}

impl DateTimeTransformer {
    /// Creates an unbounded transformer.
    #[must_use]
    pub fn new(mode: DateTimeMode, config: TransformerConfig) -> Self {
        Self {
            mode,
            min: None,
            max: None,
            keep_seconds: config.keep_seconds,
            config,
        }
    }

    /// Sets the earliest accepted value (inclusive).
    #[must_use]
    pub fn with_min(mut self, min: NaiveDateTime) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the latest accepted value (inclusive).
    #[must_use]
    pub fn with_max(mut self, max: NaiveDateTime) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets whether seconds are kept.
    #[must_use]
    pub fn with_keep_seconds(mut self, keep: bool) -> Self {
        self.keep_seconds = keep;
        self
    }

    /// Returns the mode.
    #[must_use]
    pub fn mode(&self) -> DateTimeMode {
        self.mode
    }

    /// Returns the earliest accepted value.
    #[must_use]
    pub fn min(&self) -> Option<NaiveDateTime> {
        self.min
    }

    /// Returns the latest accepted value.
    #[must_use]
    pub fn max(&self) -> Option<NaiveDateTime> {
        self.max
    }

    fn parse(&self, property: &dyn Property, text: &str) -> Result<NaiveDateTime> {
        let parsed = match self.mode {
            DateTimeMode::Date => {
                parse_with(&self.config.date_formats, text, NaiveDate::parse_from_str).map(midnight)
            }
            DateTimeMode::DateTime => {
                parse_with(&self.config.date_time_formats, text, NaiveDateTime::parse_from_str)
                    .or_else(|_| {
                        parse_with(&self.config.date_formats, text, NaiveDate::parse_from_str)
                            .map(midnight)
                    })
            }
            DateTimeMode::Time => {
                parse_with(&self.config.time_formats, text, NaiveTime::parse_from_str)
                    .map(|time| current_date(property).and_time(time))
            }
        };
        parsed.map_err(|cause| match cause {
            Some(cause) => Error::invalid_value_caused_by(property.display_name(), cause),
            None => Error::invalid_value(property.display_name()),
        })
    }

    fn adopt(&self, property: &dyn Property, value: NaiveDateTime) -> NaiveDateTime {
        match self.mode {
            DateTimeMode::Date => midnight(value.date()),
            DateTimeMode::DateTime => value,
            DateTimeMode::Time => current_date(property).and_time(value.time()),
        }
    }

    fn check_range(&self, value: NaiveDateTime) -> Result<()> {
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Err(Error::new(ErrorKind::MinDate {
                value: self.display(value),
                min: self.display(min),
            }));
        }
        if let Some(max) = self.max.filter(|max| value > *max) {
            return Err(Error::new(ErrorKind::MaxDate {
                value: self.display(value),
                max: self.display(max),
            }));
        }
        Ok(())
    }

    fn display(&self, value: NaiveDateTime) -> String {
        let format = match self.mode {
            DateTimeMode::Date => &self.config.display_date_format,
            DateTimeMode::DateTime | DateTimeMode::Time => &self.config.display_date_time_format,
        };
        value.format(format).to_string()
    }
}

impl Transformer for DateTimeTransformer {
    fn apply(&self, property: &dyn Property, input: TransformInput) -> Result<Value> {
        if input.is_blank() {
            return blank(property);
        }
        let value = match input {
            TransformInput::Text(text) => self.parse(property, text.trim())?,
            TransformInput::Temporal(value) => self.adopt(property, value),
            TransformInput::Null | TransformInput::Other(_) => {
                return Err(Error::invalid_value(property.display_name()));
            }
        };
        let value = if self.keep_seconds {
            value
        } else {
            strip_seconds(value)
        };
        self.check_range(value)?;
        Ok(Value::Date(value))
    }
}

/// Tries each pattern in turn, returning the last failure if none match.
fn parse_with<T>(
    formats: &[String],
    text: &str,
    parse: impl Fn(&str, &str) -> ParseResult<T>,
) -> std::result::Result<T, Option<chrono::ParseError>> {
    let mut failure = None;
    for format in formats {
        match parse(text, format) {
            Ok(value) => return Ok(value),
            Err(err) => failure = Some(err),
        }
    }
    Err(failure)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn current_date(property: &dyn Property) -> NaiveDate {
    property
        .value()
        .as_date()
        .map_or(NaiveDate::default(), |current| current.date())
}

fn strip_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}
