//! Transformers: parse, coerce and validate values on their way into a
//! property.
//!
//! Every value handed to [`Property::set_value`](crate::Property::set_value)
//! passes through the property's transformer first. The input is resolved
//! once into a [`TransformInput`] so each transformer matches on a closed
//! set of shapes instead of inspecting the value's runtime type.

mod datetime;
mod numeric;
mod string;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDateTime;
use imedit_foundation::{Error, NodeType, Result, TargetType, Value};

use crate::config::TransformerConfig;
use crate::context::PropertyContext;
use crate::property::Property;

pub use datetime::{DateTimeMode, DateTimeTransformer};
pub use numeric::CoercingTransformer;
pub use string::StringTransformer;

/// Input to a transformer.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformInput {
    /// No value.
    Null,
    /// Text, as typed by a user or read from a text node.
    Text(Arc<str>),
    /// A date, date-time or time of day.
    Temporal(NaiveDateTime),
    /// Anything else.
    Other(Value),
}

impl TransformInput {
    /// Returns true for null and for text that is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Converts back into a value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(text) => Value::String(text),
            Self::Temporal(date) => Value::Date(date),
            Self::Other(value) => value,
        }
    }
}

impl From<Value> for TransformInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(text) => Self::Text(text),
            Value::Date(date) => Self::Temporal(date),
            other => Self::Other(other),
        }
    }
}

impl From<&Value> for TransformInput {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

/// Converts and validates values for a property.
pub trait Transformer {
    /// Transforms `input` into the value to store in `property`.
    ///
    /// # Errors
    ///
    /// Returns a validation error (required, invalid, range, length or
    /// invalid characters) if the input is unacceptable.
    fn apply(&self, property: &dyn Property, input: TransformInput) -> Result<Value>;
}

/// Returns the value for blank input: null, unless the property is required.
pub(crate) fn blank(property: &dyn Property) -> Result<Value> {
    if property.is_required() {
        Err(Error::required(property.display_name()))
    } else {
        Ok(Value::Null)
    }
}

/// Transformer that accepts any value unchanged.
///
/// Blank input is still subject to the required check.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTransformer;

impl Transformer for NoopTransformer {
    fn apply(&self, property: &dyn Property, input: TransformInput) -> Result<Value> {
        if input.is_blank() && !property.node_type().is_collection() {
            return blank(property);
        }
        Ok(input.into_value())
    }
}

/// Creates the default transformer for a property from its declared type.
#[derive(Clone, Debug, Default)]
pub struct TransformerFactory {
    config: TransformerConfig,
}

impl TransformerFactory {
    /// Creates a factory using `config`.
    #[must_use]
    pub fn new(config: TransformerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Creates a transformer for `property`.
    ///
    /// Strings and lookups get a [`StringTransformer`] without macros,
    /// dates a [`DateTimeTransformer`] accepting dates and date-times,
    /// scalars a [`CoercingTransformer`], and collections a
    /// [`NoopTransformer`].
    #[must_use]
    pub fn create(&self, property: &dyn Property, context: &PropertyContext) -> Rc<dyn Transformer> {
        let node_type = property.node_type();
        let coerce = |target| -> Rc<dyn Transformer> {
            Rc::new(CoercingTransformer::new(target, context.converter()))
        };
        match node_type {
            NodeType::String | NodeType::Lookup => {
                Rc::new(StringTransformer::new(self.config.clone()))
            }
            NodeType::Date => Rc::new(DateTimeTransformer::new(
                DateTimeMode::DateTime,
                self.config.clone(),
            )),
            NodeType::Boolean => coerce(TargetType::Bool),
            NodeType::Integer => coerce(TargetType::Int),
            NodeType::Long => coerce(TargetType::Long),
            NodeType::Decimal => coerce(TargetType::Decimal),
            NodeType::Money => coerce(TargetType::Money),
            NodeType::Reference => coerce(TargetType::Reference),
            NodeType::Collection => Rc::new(NoopTransformer),
        }
    }
}

impl fmt::Debug for dyn Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transformer")
    }
}
