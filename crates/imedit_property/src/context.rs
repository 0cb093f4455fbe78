//! Collaborators shared by the properties of one edit session.

use std::fmt;
use std::rc::Rc;

use imedit_foundation::{Converter, DefaultConverter};

use crate::config::TransformerConfig;
use crate::macros::{Macros, Variables};
use crate::transformer::TransformerFactory;

/// Services a property needs but does not own.
///
/// Cloning is cheap; every field is reference counted. Properties created
/// for the same object normally share one context.
#[derive(Clone)]
pub struct PropertyContext {
    converter: Rc<dyn Converter>,
    transformers: Rc<TransformerFactory>,
    macros: Option<Rc<dyn Macros>>,
    variables: Rc<Variables>,
}

impl Default for PropertyContext {
    fn default() -> Self {
        Self {
            converter: Rc::new(DefaultConverter::new()),
            transformers: Rc::new(TransformerFactory::default()),
            macros: None,
            variables: Rc::new(Variables::new()),
        }
    }
}

impl PropertyContext {
    /// Creates a context with the default converter and transformer factory,
    /// and no macros.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Rc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Replaces the transformer factory.
    #[must_use]
    pub fn with_transformers(mut self, transformers: TransformerFactory) -> Self {
        self.transformers = Rc::new(transformers);
        self
    }

    /// Uses a transformer factory built from `config`.
    #[must_use]
    pub fn with_config(self, config: TransformerConfig) -> Self {
        self.with_transformers(TransformerFactory::new(config))
    }

    /// Sets the macros used by string properties.
    #[must_use]
    pub fn with_macros(mut self, macros: Rc<dyn Macros>) -> Self {
        self.macros = Some(macros);
        self
    }

    /// Sets the variables made available to macros.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = Rc::new(variables);
        self
    }

    /// Returns the converter.
    #[must_use]
    pub fn converter(&self) -> Rc<dyn Converter> {
        Rc::clone(&self.converter)
    }

    /// Returns the transformer factory.
    #[must_use]
    pub fn transformers(&self) -> &TransformerFactory {
        &self.transformers
    }

    /// Returns the macros, if any.
    #[must_use]
    pub fn macros(&self) -> Option<Rc<dyn Macros>> {
        self.macros.clone()
    }

    /// Returns the macro variables.
    #[must_use]
    pub fn variables(&self) -> Rc<Variables> {
        Rc::clone(&self.variables)
    }
}

impl fmt::Debug for PropertyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyContext")
            .field("config", self.transformers.config())
            .field("macros", &self.macros.is_some())
            .finish_non_exhaustive()
    }
}
