//! Object editors and relationship creation.

use std::fmt;
use std::rc::{Rc, Weak};

use imedit_foundation::{Reference, Result};
use imedit_property::{
    ErrorListener, Modifiable, ModifiableId, ModifiableListener, ModifiableState, PropertyContext,
    PropertySet, Validator, listener,
};
use imedit_store::{
    IMObject, ObjectStore, SharedObject,
    archetype::{SOURCE, TARGET},
};

/// Edits one object.
///
/// Collection editors save and delete elements through their editors when
/// one is registered, so an editor can cascade to objects it owns.
pub trait ObjectEditor: Modifiable {
    /// Returns the object as currently edited.
    fn object(&self) -> IMObject;

    /// Returns the object's reference.
    fn reference(&self) -> Reference {
        self.object().reference().clone()
    }

    /// Saves the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the object.
    fn save(&self) -> Result<()>;

    /// Deletes the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot delete the object.
    fn delete(&self) -> Result<()>;
}

/// Edits an object through its [`PropertySet`].
pub struct DefaultObjectEditor {
    state: ModifiableState,
    properties: PropertySet,
    store: Rc<dyn ObjectStore>,
}

impl DefaultObjectEditor {
    /// Creates an editor for `object`.
    ///
    /// # Errors
    ///
    /// Fails if the store has no descriptor for the object.
    pub fn new(
        object: SharedObject,
        store: Rc<dyn ObjectStore>,
        context: PropertyContext,
    ) -> Result<Rc<Self>> {
        let properties = PropertySet::new(object, Rc::clone(&store), context)?;
        let editor = Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let on_change = listener(move |_| {
                if let Some(editor) = weak.upgrade() {
                    editor.state.reset_valid();
                    editor.state.notify(editor.as_ref());
                }
            });
            for property in properties.properties() {
                property.add_modifiable_listener(Rc::clone(&on_change));
            }
            Self {
                state: ModifiableState::new(),
                properties,
                store,
            }
        });
        Ok(editor)
    }

    /// Returns the properties.
    #[must_use]
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Returns the edited object.
    #[must_use]
    pub fn shared(&self) -> &SharedObject {
        self.properties.object()
    }
}

impl Modifiable for DefaultObjectEditor {
    fn id(&self) -> ModifiableId {
        self.state.id()
    }

    fn is_modified(&self) -> bool {
        self.state.is_dirty() || self.properties.is_modified()
    }

    fn clear_modified(&self) {
        self.state.set_dirty(false);
        self.properties.clear_modified();
    }

    fn add_modifiable_listener(&self, listener: ModifiableListener) {
        self.state.add_listener(listener);
    }

    fn add_modifiable_listener_at(&self, listener: ModifiableListener, index: usize) {
        self.state.add_listener_at(listener, index);
    }

    fn remove_modifiable_listener(&self, listener: &ModifiableListener) {
        self.state.remove_listener(listener);
    }

    fn set_error_listener(&self, listener: Option<Rc<dyn ErrorListener>>) {
        self.state.set_error_listener(listener);
    }

    fn error_listener(&self) -> Option<Rc<dyn ErrorListener>> {
        self.state.error_listener()
    }

    fn validate(&self, validator: &mut Validator) -> bool {
        self.state
            .validate(validator, |validator| self.properties.validate(validator))
    }

    fn reset_valid(&self, descendants: bool) {
        self.state.reset_valid();
        if descendants {
            for property in self.properties.properties() {
                property.reset_valid(true);
            }
        }
    }
}

impl ObjectEditor for DefaultObjectEditor {
    fn object(&self) -> IMObject {
        self.shared().borrow().clone()
    }

    fn reference(&self) -> Reference {
        self.shared().borrow().reference().clone()
    }

    fn save(&self) -> Result<()> {
        self.store.save(&mut self.shared().borrow_mut())?;
        self.clear_modified();
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        let (reference, new) = {
            let object = self.shared().borrow();
            (object.reference().clone(), object.is_new())
        };
        if new {
            return Ok(());
        }
        self.store.remove(&reference)
    }
}

impl fmt::Debug for DefaultObjectEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultObjectEditor")
            .field("state", &self.state)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Creates relationship objects.
pub trait RelationshipFactory {
    /// Creates a relationship of archetype `short_name` from `source` to
    /// `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot create the archetype.
    fn create(
        &self,
        store: &dyn ObjectStore,
        short_name: &str,
        source: &Reference,
        target: &Reference,
    ) -> Result<IMObject>;
}

/// Creates relationships with the store defaults plus both endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRelationshipFactory;

impl RelationshipFactory for DefaultRelationshipFactory {
    fn create(
        &self,
        store: &dyn ObjectStore,
        short_name: &str,
        source: &Reference,
        target: &Reference,
    ) -> Result<IMObject> {
        let relationship = store
            .create(short_name)?
            .with(SOURCE, source.clone())
            .with(TARGET, target.clone());
        tracing::trace!(
            relationship = %relationship.reference(),
            %source,
            %target,
            "created relationship"
        );
        Ok(relationship)
    }
}
