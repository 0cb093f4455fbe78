//! Converter-backed transformer for scalar properties.

use std::fmt;
use std::rc::Rc;

use imedit_foundation::{Converter, Error, Result, TargetType, Value};

use super::{TransformInput, Transformer, blank};
use crate::property::Property;

/// Coerces input to a scalar type through a [`Converter`].
///
/// Used for booleans, numbers, money and references. References are also
/// checked against the property's archetype range.
#[derive(Clone)]
pub struct CoercingTransformer {
    target: TargetType,
    converter: Rc<dyn Converter>,
}

impl CoercingTransformer {
    /// Creates a transformer producing `target`.
    #[must_use]
    pub fn new(target: TargetType, converter: Rc<dyn Converter>) -> Self {
        Self { target, converter }
    }

    /// Returns the target type.
    #[must_use]
    pub fn target(&self) -> TargetType {
        self.target
    }
}

impl Transformer for CoercingTransformer {
    fn apply(&self, property: &dyn Property, input: TransformInput) -> Result<Value> {
        if input.is_blank() {
            return blank(property);
        }
        let value = self
            .converter
            .convert(&input.into_value(), self.target)
            .map_err(|err| Error::invalid_value_caused_by(property.display_name(), err))?;

        if let Value::Reference(reference) = &value {
            let range = property.archetype_range();
            if !range.is_empty() && !range.iter().any(|pattern| reference.is_a(pattern)) {
                return Err(Error::invalid_value(property.display_name()));
            }
        }
        Ok(value)
    }
}

impl fmt::Debug for CoercingTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoercingTransformer")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
