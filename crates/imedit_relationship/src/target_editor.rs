//! Editing a collection of relationships by their target objects.
//!
//! Some relationships exist only to own their target, such as a product's
//! prices or a location's printers. The editor lists the targets, creates
//! the relationship when a target is added, and when a target is removed it
//! queues the target itself for deletion on save.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Error, ErrorKind, Reference, Result};
use imedit_property::{CollectionProperty, ObjectProperty, Property, Validator};
use imedit_store::{IMObject, ObjectStore, SharedObject};
use indexmap::IndexMap;

use crate::collection::CollectionPropertyEditor;
use crate::deletion::{DeletionListener, Deletions, LoggingDeletionListener};
use crate::editor::{DefaultRelationshipFactory, ObjectEditor, RelationshipFactory};

#[derive(Clone, Debug)]
struct Target {
    object: IMObject,
    relationship: Reference,
}

/// Edits the relationships of a parent object keyed by their targets.
pub struct RelationshipTargetCollectionEditor {
    collection: CollectionPropertyEditor,
    parent: SharedObject,
    short_name: Arc<str>,
    targets: IndexMap<Reference, Target>,
    deletions: Deletions,
    relationships: Rc<dyn RelationshipFactory>,
    listener: Rc<dyn DeletionListener>,
    user: Option<String>,
}

impl RelationshipTargetCollectionEditor {
    /// Creates an editor for the relationship collection `property`, loading
    /// the target of every relationship.
    ///
    /// Relationships whose target no longer exists are removed from the
    /// collection.
    ///
    /// # Errors
    ///
    /// Fails if the node declares no relationship archetype or a target
    /// lookup fails.
    pub fn new(property: Rc<ObjectProperty>, store: Rc<dyn ObjectStore>) -> Result<Self> {
        let parent = Rc::clone(property.object());
        let short_name = store
            .archetypes()
            .expand(&property.archetype_range())
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::new(ErrorKind::Internal(format!(
                    "{} declares no relationship archetype",
                    property.name()
                )))
            })?;

        let mut targets = IndexMap::new();
        for relationship in property.values() {
            let target = match relationship.target() {
                Some(reference) => store.get(&reference)?,
                None => None,
            };
            match target {
                Some(object) => {
                    targets.insert(
                        object.reference().clone(),
                        Target {
                            object,
                            relationship: relationship.reference().clone(),
                        },
                    );
                }
                None => {
                    tracing::warn!(
                        parent = %parent.borrow().reference(),
                        relationship = %relationship.reference(),
                        "target not found; relationship removed"
                    );
                    property.remove(relationship.reference())?;
                }
            }
        }

        Ok(Self {
            collection: CollectionPropertyEditor::new(property, store),
            parent,
            short_name,
            targets,
            deletions: Deletions::default(),
            relationships: Rc::new(DefaultRelationshipFactory),
            listener: Rc::new(LoggingDeletionListener),
            user: None,
        })
    }

    /// Creates relationships with `factory`.
    #[must_use]
    pub fn with_relationship_factory(mut self, factory: Rc<dyn RelationshipFactory>) -> Self {
        self.relationships = factory;
        self
    }

    /// Reports deletion failures to `listener`.
    #[must_use]
    pub fn with_deletion_listener(mut self, listener: Rc<dyn DeletionListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Names the user performing the edit in deletion reports.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Returns the underlying collection editor.
    #[must_use]
    pub fn collection(&self) -> &CollectionPropertyEditor {
        &self.collection
    }

    /// Returns the targets in collection order.
    pub fn objects(&self) -> impl Iterator<Item = &IMObject> {
        self.targets.values().map(|target| &target.object)
    }

    /// Returns a target.
    #[must_use]
    pub fn target(&self, reference: &Reference) -> Option<&IMObject> {
        self.targets.get(reference).map(|target| &target.object)
    }

    /// Returns the relationship linking the parent to a target.
    #[must_use]
    pub fn relationship_for(&self, target: &Reference) -> Option<&Reference> {
        self.targets.get(target).map(|target| &target.relationship)
    }

    /// Registers the editor for a target.
    pub fn set_editor(&mut self, editor: Rc<dyn ObjectEditor>) {
        self.collection.set_editor(editor);
    }

    /// Adds `target`, creating the relationship to it if there is none yet.
    /// Returns true if a relationship was created. Either way the target is
    /// saved with the collection.
    ///
    /// # Errors
    ///
    /// Fails if the relationship cannot be created or the collection cannot
    /// be modified.
    pub fn add(&mut self, target: IMObject) -> Result<bool> {
        let reference = target.reference().clone();
        if let Some(existing) = self.targets.get_mut(&reference) {
            existing.object = target.clone();
            self.collection.mark_edited(target);
            return Ok(false);
        }
        if let Some(editor) = self.deletions.unqueue(&reference) {
            self.collection.set_editor(editor);
        }

        let store = Rc::clone(self.collection.store());
        let relationship = {
            let parent = self.parent.borrow();
            self.relationships
                .create(store.as_ref(), &self.short_name, parent.reference(), &reference)?
        };
        let relationship_ref = relationship.reference().clone();
        self.collection.property().add(relationship)?;
        self.targets.insert(
            reference,
            Target {
                object: target.clone(),
                relationship: relationship_ref,
            },
        );
        self.collection.mark_edited(target);
        Ok(true)
    }

    /// Removes `target` and its relationship. Returns true if the target
    /// was present.
    ///
    /// A saved target is queued for deletion on [`save`](Self::save),
    /// through its editor if one is registered.
    ///
    /// # Errors
    ///
    /// Fails if the collection cannot be modified.
    pub fn remove(&mut self, target: &Reference) -> Result<bool> {
        let Some(relationship) = self.relationship_for(target).cloned() else {
            return Ok(false);
        };
        self.collection.property().remove(&relationship)?;
        let Some(entry) = self.targets.shift_remove(target) else {
            return Ok(false);
        };
        let editor = self.collection.forget(target);
        if !entry.object.is_new() {
            self.deletions.queue(entry.object, editor);
        }
        Ok(true)
    }

    /// Returns true if the target is queued for deletion.
    #[must_use]
    pub fn is_queued_for_deletion(&self, target: &Reference) -> bool {
        self.deletions.contains(target)
    }

    /// Returns true if the collection changed or deletions are pending.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.collection.is_modified() || !self.deletions.is_empty()
    }

    /// Validates the collection and the registered editors.
    pub fn validate(&self, validator: &mut Validator) -> bool {
        self.collection.validate(validator)
    }

    /// Deletes the queued targets, saves the edited targets, then saves the
    /// parent with its relationships.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. A failed deletion is reported to the
    /// deletion listener and nothing after it is attempted.
    pub fn save(&mut self) -> Result<()> {
        let store = Rc::clone(self.collection.store());
        self.deletions
            .run(store.as_ref(), self.listener.as_ref(), self.user.as_deref())?;
        for saved in self.collection.save()? {
            if let Some(target) = self.targets.get_mut(saved.reference()) {
                target.object = saved;
            }
        }
        store.save(&mut self.parent.borrow_mut())?;
        self.collection.clear_modified();
        Ok(())
    }
}

impl fmt::Debug for RelationshipTargetCollectionEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipTargetCollectionEditor")
            .field("short_name", &self.short_name)
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("pending_deletions", &self.deletions.len())
            .finish_non_exhaustive()
    }
}
