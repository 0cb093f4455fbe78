//! Properties bound to a node of an object.

use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Converter, Error, ErrorKind, NodeType, Reference, Result, Value};
use imedit_store::{IMObject, NodeDescriptor, SharedObject};

use crate::context::PropertyContext;
use crate::modifiable::{Modifiable, ModifiableId, ModifiableListener};
use crate::property::{CollectionProperty, Property, PropertyCore};
use crate::transformer::Transformer;
use crate::validator::{ErrorListener, Validator};

/// A property reading and writing one node of a shared object.
///
/// Scalar nodes are read with [`Property::value`]; collection nodes are
/// read and written through [`CollectionProperty`], and their `value` is
/// null.
#[derive(Debug)]
pub struct ObjectProperty {
    core: PropertyCore,
    object: SharedObject,
    descriptor: NodeDescriptor,
}

impl ObjectProperty {
    /// Creates a property for the node `descriptor` of `object`.
    #[must_use]
    pub fn new(object: SharedObject, descriptor: NodeDescriptor, context: PropertyContext) -> Self {
        let archetype = Arc::<str>::from(object.borrow().archetype());
        Self {
            core: PropertyCore::new(context).with_archetype(archetype),
            object,
            descriptor,
        }
    }

    /// Returns the object.
    #[must_use]
    pub fn object(&self) -> &SharedObject {
        &self.object
    }

    /// Returns the node descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// Returns the shared core state.
    #[must_use]
    pub fn core(&self) -> &PropertyCore {
        &self.core
    }

    fn checks(&self) -> Vec<Error> {
        if !self.descriptor.node_type.is_collection() {
            return self.core.check_value(self);
        }
        let size = self.size();
        let mut errors = Vec::new();
        if size < self.descriptor.min_cardinality {
            errors.push(Error::new(ErrorKind::MinCardinality {
                property: self.display_name(),
                min: self.descriptor.min_cardinality,
            }));
        }
        if let Some(max) = self.descriptor.max_cardinality.filter(|max| size > *max) {
            errors.push(Error::new(ErrorKind::MaxCardinality {
                property: self.display_name(),
                max,
            }));
        }
        errors
    }
}

impl Modifiable for ObjectProperty {
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
        self.core.validate(self, validator, || self.checks())
    }

    fn reset_valid(&self, _descendants: bool) {
        self.core.state().reset_valid();
    }

    fn as_property(&self) -> Option<&dyn Property> {
        Some(self)
    }
}

impl Property for ObjectProperty {
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
        if self.descriptor.node_type.is_collection() {
            return Value::Null;
        }
        self.object.borrow().get(&self.descriptor.name)
    }

    fn set_value(&self, value: Value) -> Result<bool> {
        if self.descriptor.node_type.is_collection() {
            return Err(self.core.locate(
                self,
                Error::new(ErrorKind::Internal(format!(
                    "{} is a collection; use add or remove",
                    self.descriptor.name
                ))),
            ));
        }
        self.core.set_value(self, value, |value| {
            self.object.borrow_mut().set(&self.descriptor.name, value);
        })
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

    fn as_collection(&self) -> Option<&dyn CollectionProperty> {
        if self.descriptor.node_type.is_collection() {
            Some(self)
        } else {
            None
        }
    }
}

impl CollectionProperty for ObjectProperty {
    fn values(&self) -> Vec<IMObject> {
        self.object
            .borrow()
            .collection(&self.descriptor.name)
            .into_iter()
            .collect()
    }

    fn size(&self) -> usize {
        self.object.borrow().collection(&self.descriptor.name).len()
    }

    fn add(&self, object: IMObject) -> Result<bool> {
        self.core.check_modifiable(self)?;
        let grew = self.object.borrow_mut().add(&self.descriptor.name, object);
        self.core.modified(self);
        Ok(grew)
    }

    fn remove(&self, reference: &Reference) -> Result<bool> {
        self.core.check_modifiable(self)?;
        let removed = self
            .object
            .borrow_mut()
            .remove(&self.descriptor.name, reference);
        if removed {
            self.core.modified(self);
        }
        Ok(removed)
    }

    fn min_cardinality(&self) -> usize {
        self.descriptor.min_cardinality
    }

    fn max_cardinality(&self) -> Option<usize> {
        self.descriptor.max_cardinality
    }

    fn is_parent_child(&self) -> bool {
        self.descriptor.parent_child
    }

    fn contains(&self, reference: &Reference) -> bool {
        self.object.borrow().contains(&self.descriptor.name, reference)
    }
}
