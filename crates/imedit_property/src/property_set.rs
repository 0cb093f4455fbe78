//! The properties of one object.
//!
//! A [`PropertySet`] builds an [`ObjectProperty`] for every node of an
//! object's archetype and keeps derived nodes current: whenever a
//! non-derived property changes, the store recomputes derived values and
//! only the derived properties whose value actually changed are refreshed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use imedit_foundation::{Error, ErrorKind, Result, Value};
use imedit_store::{ArchetypeDescriptor, ObjectStore, SharedObject};
use indexmap::IndexMap;

use crate::context::PropertyContext;
use crate::modifiable::{Modifiable, listener};
use crate::object_property::ObjectProperty;
use crate::property::Property;
use crate::transformer::StringTransformer;
use crate::validator::Validator;

/// The properties of one object, keyed by node name in declaration order.
#[derive(Clone)]
pub struct PropertySet {
    inner: Rc<SetInner>,
}

struct SetInner {
    object: SharedObject,
    store: Rc<dyn ObjectStore>,
    properties: IndexMap<Arc<str>, Rc<ObjectProperty>>,
    derived: RefCell<HashMap<Arc<str>, Value>>,
    deriving: Cell<bool>,
}

impl PropertySet {
    /// Creates properties for `object`, looking its archetype up in the
    /// store.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::UnknownArchetype`] if the store has no
    /// descriptor for the object.
    pub fn new(
        object: SharedObject,
        store: Rc<dyn ObjectStore>,
        context: PropertyContext,
    ) -> Result<Self> {
        let archetype = object.borrow().archetype().to_string();
        let descriptor = store.archetypes().require(&archetype)?.clone();
        Ok(Self::with_descriptor(object, &descriptor, store, context))
    }

    /// Creates properties for `object` from an explicit descriptor.
    #[must_use]
    pub fn with_descriptor(
        object: SharedObject,
        descriptor: &ArchetypeDescriptor,
        store: Rc<dyn ObjectStore>,
        context: PropertyContext,
    ) -> Self {
        let mut properties = IndexMap::with_capacity(descriptor.nodes.len());
        let mut derived = HashMap::new();
        for node in &descriptor.nodes {
            let editable_text = node.node_type.is_string() && !node.derived && !node.read_only;
            let property = Rc::new(ObjectProperty::new(
                Rc::clone(&object),
                node.clone(),
                context.clone(),
            ));
            if let Some(macros) = context.macros().filter(|_| editable_text) {
                let transformer = StringTransformer::new(context.transformers().config().clone())
                    .with_macros(macros, context.variables())
                    .with_context(Rc::clone(&object));
                property.set_transformer(Some(Rc::new(transformer)));
            }
            if node.derived {
                derived.insert(Arc::clone(&node.name), property.value());
            }
            properties.insert(Arc::clone(&node.name), property);
        }

        let inner = Rc::new(SetInner {
            object,
            store,
            properties,
            derived: RefCell::new(derived),
            deriving: Cell::new(false),
        });
        let weak: Weak<SetInner> = Rc::downgrade(&inner);
        let on_change = listener(move |source| {
            if let Some(inner) = weak.upgrade() {
                inner.on_change(source);
            }
        });
        for property in inner.properties.values() {
            property.add_modifiable_listener(Rc::clone(&on_change));
        }
        Self { inner }
    }

    /// Returns the property for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<ObjectProperty>> {
        self.inner.properties.get(name).cloned()
    }

    /// Returns the property for `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::UnknownNode`] if the archetype has no such
    /// node.
    pub fn require(&self, name: &str) -> Result<Rc<ObjectProperty>> {
        self.get(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownNode {
                archetype: self.inner.object.borrow().archetype().to_string(),
                node: name.to_string(),
            })
        })
    }

    /// Returns the properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Rc<ObjectProperty>> {
        self.inner.properties.values()
    }

    /// Returns the node names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.properties.keys().map(|name| &**name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.properties.len()
    }

    /// Returns true if the archetype has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.properties.is_empty()
    }

    /// Returns the object.
    #[must_use]
    pub fn object(&self) -> &SharedObject {
        &self.inner.object
    }

    /// Returns true if any property is modified.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.properties().any(|property| property.is_modified())
    }

    /// Clears the modified flag of every property.
    pub fn clear_modified(&self) {
        for property in self.properties() {
            property.clear_modified();
        }
    }

    /// Validates every property, recording errors in `validator`.
    ///
    /// All properties are validated even after one fails.
    pub fn validate(&self, validator: &mut Validator) -> bool {
        let mut valid = true;
        for property in self.properties() {
            valid &= validator.validate(property.as_ref());
        }
        valid
    }
}

impl SetInner {
    fn on_change(&self, source: &dyn Modifiable) {
        let Some(property) = source.as_property() else {
            return;
        };
        if property.is_derived() || self.deriving.get() {
            return;
        }
        self.deriving.set(true);
        let changed = {
            let mut object = self.object.borrow_mut();
            self.store.derive_values(&mut object)
        };
        match changed {
            Ok(changed) => self.refresh_derived(&changed),
            Err(err) => {
                tracing::warn!(property = property.name(), error = %err, "failed to derive values");
            }
        }
        self.deriving.set(false);
    }

    fn refresh_derived(&self, changed: &[Arc<str>]) {
        for name in changed {
            let Some(property) = self.properties.get(name).filter(|p| p.is_derived()) else {
                continue;
            };
            let value = property.value();
            let previous = self
                .derived
                .borrow_mut()
                .insert(Arc::clone(name), value.clone());
            if previous.as_ref() != Some(&value) {
                tracing::trace!(property = &**name, value = %value, "derived value refreshed");
                property.refresh();
            }
        }
    }
}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySet")
            .field("object", self.inner.object.borrow().reference())
            .field("names", &self.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
