//! Editing a collection node.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Reference, Result};
use imedit_property::{CollectionProperty, Modifiable, Property, Validator};
use imedit_store::{IMObject, ObjectStore};
use indexmap::IndexMap;

use crate::editor::ObjectEditor;

/// Edits the objects of a collection property.
///
/// Tracks which objects were edited since the last save and the editors
/// registered for individual objects. Saving saves every editor, then every
/// edited object without one.
pub struct CollectionPropertyEditor {
    property: Rc<dyn CollectionProperty>,
    store: Rc<dyn ObjectStore>,
    edited: IndexMap<Reference, IMObject>,
    editors: IndexMap<Reference, Rc<dyn ObjectEditor>>,
    saved: bool,
}

impl CollectionPropertyEditor {
    /// Creates an editor for `property`.
    #[must_use]
    pub fn new(property: Rc<dyn CollectionProperty>, store: Rc<dyn ObjectStore>) -> Self {
        Self {
            property,
            store,
            edited: IndexMap::new(),
            editors: IndexMap::new(),
            saved: false,
        }
    }

    /// Returns the collection property.
    #[must_use]
    pub fn property(&self) -> &Rc<dyn CollectionProperty> {
        &self.property
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &Rc<dyn ObjectStore> {
        &self.store
    }

    /// Returns the archetypes the collection may hold, wildcards expanded.
    #[must_use]
    pub fn archetype_range(&self) -> Vec<Arc<str>> {
        self.store.archetypes().expand(&self.property.archetype_range())
    }

    /// Returns the objects in the collection.
    #[must_use]
    pub fn objects(&self) -> Vec<IMObject> {
        self.property.values()
    }

    /// Returns the minimum number of objects.
    #[must_use]
    pub fn min_cardinality(&self) -> usize {
        self.property.min_cardinality()
    }

    /// Returns the maximum number of objects, if bounded.
    #[must_use]
    pub fn max_cardinality(&self) -> Option<usize> {
        self.property.max_cardinality()
    }

    /// Adds `object`, or replaces the element with the same reference, and
    /// marks it edited. Returns true if the collection grew.
    ///
    /// # Errors
    ///
    /// Fails if the property cannot be modified.
    pub fn add(&mut self, object: IMObject) -> Result<bool> {
        let grew = self.property.add(object.clone())?;
        self.mark_edited(object);
        Ok(grew)
    }

    /// Removes the object, forgetting any edits and its editor. Returns true
    /// if the collection held it.
    ///
    /// # Errors
    ///
    /// Fails if the property cannot be modified.
    pub fn remove(&mut self, reference: &Reference) -> Result<bool> {
        let removed = self.property.remove(reference)?;
        self.forget(reference);
        Ok(removed)
    }

    /// Records `object` as edited, to be saved with the collection.
    pub fn mark_edited(&mut self, object: IMObject) {
        self.edited.insert(object.reference().clone(), object);
    }

    /// Forgets the edits and the editor of an object, returning the editor.
    pub fn forget(&mut self, reference: &Reference) -> Option<Rc<dyn ObjectEditor>> {
        self.edited.shift_remove(reference);
        self.editors.shift_remove(reference)
    }

    /// Returns true if the object was edited since the last save.
    #[must_use]
    pub fn is_edited(&self, reference: &Reference) -> bool {
        self.edited.contains_key(reference)
    }

    /// Registers the editor for an object.
    pub fn set_editor(&mut self, editor: Rc<dyn ObjectEditor>) {
        self.editors.insert(editor.reference(), editor);
    }

    /// Returns the editor for an object.
    #[must_use]
    pub fn editor(&self, reference: &Reference) -> Option<&Rc<dyn ObjectEditor>> {
        self.editors.get(reference)
    }

    /// Returns true if the property, any edited object or any editor has
    /// unsaved changes.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.property.is_modified()
            || !self.edited.is_empty()
            || self.editors.values().any(|editor| editor.is_modified())
    }

    /// Clears the modified state of the property and every editor.
    pub fn clear_modified(&mut self) {
        self.property.clear_modified();
        self.edited.clear();
        for editor in self.editors.values() {
            editor.clear_modified();
        }
    }

    /// Returns true once the collection has been saved.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Validates the property, then every registered editor.
    ///
    /// All editors are validated even after one fails.
    pub fn validate(&self, validator: &mut Validator) -> bool {
        let mut valid = validator.validate(self.property.as_ref());
        for editor in self.editors.values() {
            valid &= validator.validate(editor.as_ref());
        }
        valid
    }

    /// Validates with a fresh validator.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate(&mut Validator::new())
    }

    /// Saves every editor, then every edited object without one, stopping
    /// at the first failure. Returns the saved objects.
    ///
    /// Saved objects that belong to the collection replace their element, so
    /// the collection sees them as persisted.
    ///
    /// # Errors
    ///
    /// Returns the first save failure. Objects saved before it stay saved.
    pub fn save(&mut self) -> Result<Vec<IMObject>> {
        let mut saved = Vec::with_capacity(self.editors.len() + self.edited.len());
        for editor in self.editors.values() {
            editor.save()?;
            let object = editor.object();
            self.edited.shift_remove(object.reference());
            saved.push(object);
        }
        while let Some((_, object)) = self.edited.first() {
            let mut object = object.clone();
            self.store.save(&mut object)?;
            self.edited.shift_remove_index(0);
            saved.push(object);
        }
        for object in &saved {
            if self.property.contains(object.reference()) {
                self.property.add(object.clone())?;
            }
        }
        self.saved = true;
        tracing::debug!(
            property = self.property.name(),
            saved = saved.len(),
            "saved collection"
        );
        Ok(saved)
    }
}

impl fmt::Debug for CollectionPropertyEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionPropertyEditor")
            .field("property", &self.property.name())
            .field("edited", &self.edited.keys().collect::<Vec<_>>())
            .field("editors", &self.editors.keys().collect::<Vec<_>>())
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}
