//! Free-standing properties not bound to an object.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Converter, NodeType, Result, Value};
use imedit_store::NodeDescriptor;

use crate::context::PropertyContext;
use crate::modifiable::{Modifiable, ModifiableId, ModifiableListener};
use crate::property::{Property, PropertyCore};
use crate::transformer::Transformer;
use crate::validator::{ErrorListener, Validator};

/// A property holding its own value.
///
/// Used for editor-local fields such as search criteria or confirmation
/// inputs. Behaves like an object property: values pass through the
/// transformer, and changes mark it modified and notify listeners.
#[derive(Debug)]
pub struct SimpleProperty {
    core: PropertyCore,
    descriptor: NodeDescriptor,
    value: RefCell<Value>,
}

impl SimpleProperty {
    /// Creates an optional, empty property.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, node_type: NodeType) -> Self {
        Self {
            core: PropertyCore::new(PropertyContext::default()),
            descriptor: NodeDescriptor::new(name, node_type),
            value: RefCell::new(Value::Null),
        }
    }

    /// Uses `context` for conversion, transformation and macros.
    #[must_use]
    pub fn with_context(mut self, context: PropertyContext) -> Self {
        self.core = PropertyCore::new(context);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.descriptor = self.descriptor.with_display_name(display_name);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.descriptor = self.descriptor.with_description(description);
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.descriptor = self.descriptor.with_min_length(min);
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.descriptor = self.descriptor.with_max_length(max);
        self
    }

    /// Restricts references to archetypes matching `range`.
    #[must_use]
    pub fn with_archetype_range(mut self, range: &[&str]) -> Self {
        self.descriptor = self.descriptor.with_archetype_range(range);
        self
    }

    /// Makes the property required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.descriptor = self.descriptor.required();
        self
    }

    /// Makes the property read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.descriptor = self.descriptor.read_only();
        self
    }

    /// Makes the property derived.
    #[must_use]
    pub fn derived(mut self) -> Self {
        self.descriptor = self.descriptor.derived();
        self
    }

    /// Hides the property.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.descriptor = self.descriptor.hidden();
        self
    }

    /// Sets the initial value, bypassing the transformer. The property is
    /// not marked modified.
    #[must_use]
    pub fn with_value(self, value: impl Into<Value>) -> Self {
        *self.value.borrow_mut() = value.into();
        self
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }
}

impl Modifiable for SimpleProperty {
    fn id(&self) -> ModifiableId {
        self.core.state().id()
    }

    fn is_modified(&self) -> bool {
        self.core.state().is_dirty()
    }

    fn clear_modified(&self) {
        self.core.state().set_dirty(false);
    }

    fn add_modifiable_listener(&self, listener: ModifiableListener) {
        self.core.state().add_listener(listener);
    }

    fn add_modifiable_listener_at(&self, listener: ModifiableListener, index: usize) {
        self.core.state().add_listener_at(listener, index);
    }

    fn remove_modifiable_listener(&self, listener: &ModifiableListener) {
        self.core.state().remove_listener(listener);
    }

    fn set_error_listener(&self, listener: Option<Rc<dyn ErrorListener>>) {
        self.core.state().set_error_listener(listener);
    }

    fn error_listener(&self) -> Option<Rc<dyn ErrorListener>> {
        self.core.state().error_listener()
    }

    fn validate(&self, validator: &mut Validator) -> bool {
        self.core
            .validate(self, validator, || self.core.check_value(self))
    }

    fn reset_valid(&self, _descendants: bool) {
        self.core.state().reset_valid();
    }

    fn as_property(&self) -> Option<&dyn Property> {
        Some(self)
    }
}

impl Property for SimpleProperty {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn display_name(&self) -> String {
        self.descriptor.display_name()
    }

    fn description(&self) -> Option<String> {
        self.descriptor.description.as_deref().map(ToString::to_string)
    }

    fn node_type(&self) -> NodeType {
        self.descriptor.node_type
    }

    fn min_length(&self) -> usize {
        self.descriptor.min_length
    }

    fn max_length(&self) -> Option<usize> {
        self.descriptor.max_length
    }

    fn is_derived(&self) -> bool {
        self.descriptor.derived
    }

    fn is_read_only(&self) -> bool {
        self.descriptor.read_only
    }

    fn is_hidden(&self) -> bool {
        self.descriptor.hidden
    }

    fn is_required(&self) -> bool {
        self.descriptor.is_required()
    }

    fn archetype_range(&self) -> Vec<Arc<str>> {
        self.descriptor.archetype_range.clone()
    }

    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: Value) -> Result<bool> {
        self.core
            .set_value(self, value, |value| *self.value.borrow_mut() = value)
    }

    fn refresh(&self) {
        self.core.modified(self);
    }

    fn converter(&self) -> Rc<dyn Converter> {
        self.core.context().converter()
    }

    fn transformer(&self) -> Rc<dyn Transformer> {
        self.core.transformer(self)
    }

    fn set_transformer(&self, transformer: Option<Rc<dyn Transformer>>) {
        self.core.set_transformer(transformer);
    }
}
