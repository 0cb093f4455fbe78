//! Decorators over an existing property.
//!
//! A [`DelegatingProperty`] forwards everything to the wrapped property
//! except the handful of presentation flags a [`PropertyOverrides`]
//! implementation chooses to change.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Converter, Error, NodeType, Result, Value};

use crate::modifiable::{Modifiable, ModifiableId, ModifiableListener};
use crate::property::{CollectionProperty, Property};
use crate::transformer::Transformer;
use crate::validator::{ErrorListener, Validator};

/// The flags a decorator may override. Each defaults to the wrapped
/// property's answer.
pub trait PropertyOverrides {
    /// See [`Property::display_name`].
    fn display_name(&self, inner: &dyn Property) -> String {
        inner.display_name()
    }

    /// See [`Property::is_read_only`].
    fn is_read_only(&self, inner: &dyn Property) -> bool {
        inner.is_read_only()
    }

    /// See [`Property::is_required`].
    fn is_required(&self, inner: &dyn Property) -> bool {
        inner.is_required()
    }

    /// See [`Property::is_hidden`].
    fn is_hidden(&self, inner: &dyn Property) -> bool {
        inner.is_hidden()
    }
}

/// Marks the wrapped property read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOnly;

impl PropertyOverrides for ReadOnly {
    fn is_read_only(&self, _inner: &dyn Property) -> bool {
        true
    }
}

/// Replaces the wrapped property's display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labelled(pub String);

impl PropertyOverrides for Labelled {
    fn display_name(&self, _inner: &dyn Property) -> String {
        self.0.clone()
    }
}

/// A property that forwards to another.
///
/// Values, listeners and validity belong to the wrapped property, so
/// listeners registered through the decorator are notified with the wrapped
/// property as the source. A decorator that reports itself read-only
/// rejects writes; the wrapped property stays writable through its own
/// handle.
pub struct DelegatingProperty<O> {
    inner: Rc<dyn Property>,
    overrides: O,
}

/// A read-only view of a property.
pub type ReadOnlyProperty = DelegatingProperty<ReadOnly>;

impl<O: PropertyOverrides> DelegatingProperty<O> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Rc<dyn Property>, overrides: O) -> Self {
        Self { inner, overrides }
    }

    /// Returns the wrapped property.
    #[must_use]
    pub fn inner(&self) -> &Rc<dyn Property> {
        &self.inner
    }

    /// Returns the overrides.
    #[must_use]
    pub fn overrides(&self) -> &O {
        &self.overrides
    }
}

impl ReadOnlyProperty {
    /// Wraps `inner` as read-only.
    #[must_use]
    pub fn read_only(inner: Rc<dyn Property>) -> Self {
        Self::new(inner, ReadOnly)
    }
}

impl<O: PropertyOverrides> Modifiable for DelegatingProperty<O> {
    fn id(&self) -> ModifiableId {
        self.inner.id()
    }

    fn is_modified(&self) -> bool {
        self.inner.is_modified()
    }

    fn clear_modified(&self) {
        self.inner.clear_modified();
    }

    fn add_modifiable_listener(&self, listener: ModifiableListener) {
        self.inner.add_modifiable_listener(listener);
    }

    fn add_modifiable_listener_at(&self, listener: ModifiableListener, index: usize) {
        self.inner.add_modifiable_listener_at(listener, index);
    }

    fn remove_modifiable_listener(&self, listener: &ModifiableListener) {
        self.inner.remove_modifiable_listener(listener);
    }

    fn set_error_listener(&self, listener: Option<Rc<dyn ErrorListener>>) {
        self.inner.set_error_listener(listener);
    }

    fn error_listener(&self) -> Option<Rc<dyn ErrorListener>> {
        self.inner.error_listener()
    }

    fn validate(&self, validator: &mut Validator) -> bool {
        self.inner.validate(validator)
    }

    fn reset_valid(&self, descendants: bool) {
        self.inner.reset_valid(descendants);
    }

    fn as_property(&self) -> Option<&dyn Property> {
        Some(self)
    }
}

impl<O: PropertyOverrides> Property for DelegatingProperty<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn display_name(&self) -> String {
        self.overrides.display_name(self.inner.as_ref())
    }

    fn description(&self) -> Option<String> {
        self.inner.description()
    }

    fn node_type(&self) -> NodeType {
        self.inner.node_type()
    }

    fn min_length(&self) -> usize {
        self.inner.min_length()
    }

    fn max_length(&self) -> Option<usize> {
        self.inner.max_length()
    }

    fn is_derived(&self) -> bool {
        self.inner.is_derived()
    }

    fn is_read_only(&self) -> bool {
        self.overrides.is_read_only(self.inner.as_ref())
    }

    fn is_hidden(&self) -> bool {
        self.overrides.is_hidden(self.inner.as_ref())
    }

    fn is_required(&self) -> bool {
        self.overrides.is_required(self.inner.as_ref())
    }

    fn archetype_range(&self) -> Vec<Arc<str>> {
        self.inner.archetype_range()
    }

    fn value(&self) -> Value {
        self.inner.value()
    }

    fn set_value(&self, value: Value) -> Result<bool> {
        if self.is_read_only() {
            return Err(Error::read_only(self.display_name()));
        }
        self.inner.set_value(value)
    }

    fn refresh(&self) {
        self.inner.refresh();
    }

    fn converter(&self) -> Rc<dyn Converter> {
        self.inner.converter()
    }

    fn transformer(&self) -> Rc<dyn Transformer> {
        self.inner.transformer()
    }

    fn set_transformer(&self, transformer: Option<Rc<dyn Transformer>>) {
        self.inner.set_transformer(transformer);
    }

    fn as_collection(&self) -> Option<&dyn CollectionProperty> {
        self.inner.as_collection()
    }
}

impl<O: fmt::Debug> fmt::Debug for DelegatingProperty<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatingProperty")
            .field("inner", &self.inner)
            .field("overrides", &self.overrides)
            .finish()
    }
}
