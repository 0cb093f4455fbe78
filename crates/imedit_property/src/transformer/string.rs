//! Text transformer: control character rejection, macro expansion,
//! trimming and length checks.

use std::fmt;
use std::rc::Rc;

use imedit_foundation::{Error, ErrorKind, Result, Value};
use imedit_store::SharedObject;

use super::{TransformInput, Transformer, blank};
use crate::config::TransformerConfig;
use crate::macros::{Macros, Variables};
use crate::property::Property;

/// Validates text.
///
/// Control characters other than tab, carriage return and line feed are
/// rejected outright. Macros are expanded when the property is editable,
/// surrounding whitespace is trimmed (blank text becoming null) and the
/// result is checked against the property's length bounds.
#[derive(Clone)]
pub struct StringTransformer {
    config: TransformerConfig,
    macros: Option<Rc<dyn Macros>>,
    variables: Rc<Variables>,
    context: Option<SharedObject>,
}

impl StringTransformer {
    /// Creates a transformer without macro support.
    #[must_use]
    pub fn new(config: TransformerConfig) -> Self {
        Self {
            config,
            macros: None,
            variables: Rc::new(Variables::new()),
            context: None,
        }
    }

    /// Enables macro expansion.
    #[must_use]
    pub fn with_macros(mut self, macros: Rc<dyn Macros>, variables: Rc<Variables>) -> Self {
        self.macros = Some(macros);
        self.variables = variables;
        self
    }

    /// Sets the object macros are evaluated against.
    #[must_use]
    pub fn with_context(mut self, context: SharedObject) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns true if this transformer expands macros for `property`.
    #[must_use]
    pub fn expands_macros(&self, property: &dyn Property) -> bool {
        self.config.expand_macros
            && self.macros.is_some()
            && !property.is_read_only()
            && !property.is_derived()
    }

    fn expand(&self, text: String) -> String {
        let Some(macros) = &self.macros else {
            return text;
        };
        let context = self.context.as_ref().map(|object| object.borrow());
        macros.run_all(&text, context.as_deref(), &self.variables)
    }
}

impl Transformer for StringTransformer {
    fn apply(&self, property: &dyn Property, input: TransformInput) -> Result<Value> {
        let text = match input {
            TransformInput::Null => return blank(property),
            TransformInput::Text(text) => text.to_string(),
            TransformInput::Temporal(date) => Value::Date(date).to_string(),
            TransformInput::Other(value) => value.to_string(),
        };
        if text.chars().any(is_invalid) {
            return Err(Error::new(ErrorKind::InvalidCharacters {
                property: property.display_name(),
            }));
        }
        let text = if self.expands_macros(property) {
            self.expand(text)
        } else {
            text
        };
        let text = if self.config.trim_strings {
            text.trim().to_string()
        } else {
            text
        };
        if text.is_empty() {
            return blank(property);
        }

        let length = text.chars().count();
        let min = property.min_length();
        if length < min {
            return Err(Error::new(ErrorKind::MinLength {
                property: property.display_name(),
                min,
            }));
        }
        if let Some(max) = property.max_length().filter(|max| length > *max) {
            return Err(Error::new(ErrorKind::MaxLength {
                property: property.display_name(),
                max,
            }));
        }
        Ok(Value::from(text))
    }
}

impl fmt::Debug for StringTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringTransformer")
            .field("config", &self.config)
            .field("macros", &self.macros.is_some())
            .field("context", &self.context.as_ref().map(|object| object.borrow().reference().clone()))
            .finish_non_exhaustive()
    }
}

fn is_invalid(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}
