//! Editing a collection of relationships by their related objects.
//!
//! The editor keeps a [`RelationshipState`] for every relationship, built in
//! one batch when the editor is created and extended as relationships are
//! added. Removing a saved relationship only queues it: it is deleted when
//! the editor is saved, so abandoning the edit leaves the store as it was.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use imedit_foundation::{Error, ErrorKind, Reference, Result};
use imedit_property::{CollectionProperty, ObjectProperty, Property, Validator};
use imedit_store::{ArchetypeRegistry, IMObject, ObjectStore, SharedObject, Side};
use indexmap::{IndexMap, IndexSet};

use crate::collection::CollectionPropertyEditor;
use crate::config::RelationshipConfig;
use crate::deletion::{DeletionListener, Deletions, LoggingDeletionListener};
use crate::editor::{DefaultRelationshipFactory, RelationshipFactory};
use crate::query::RelationshipStateQuery;
use crate::state::{RelationshipState, RelationshipStateFactory};

/// Edits the relationships held by a collection node of a parent object.
pub struct RelationshipCollectionEditor {
    collection: CollectionPropertyEditor,
    parent: SharedObject,
    short_name: Arc<str>,
    parent_is_source: bool,
    states: IndexMap<Reference, RelationshipState>,
    added: IndexSet<Reference>,
    deletions: Deletions,
    exclude_inactive: bool,
    config: RelationshipConfig,
    factory: RelationshipStateFactory,
    relationships: Rc<dyn RelationshipFactory>,
    listener: Rc<dyn DeletionListener>,
    user: Option<String>,
}

impl RelationshipCollectionEditor {
    /// Creates an editor for the relationship collection `property`.
    ///
    /// # Errors
    ///
    /// Fails if the node declares no relationship archetype, or if the
    /// relationship states cannot be resolved.
    pub fn new(
        property: Rc<ObjectProperty>,
        store: Rc<dyn ObjectStore>,
        config: RelationshipConfig,
    ) -> Result<Self> {
        Self::with_state_factory(property, store, config, RelationshipStateFactory::new())
    }

    /// Creates an editor whose states are built by `factory`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_state_factory(
        property: Rc<ObjectProperty>,
        store: Rc<dyn ObjectStore>,
        config: RelationshipConfig,
        factory: RelationshipStateFactory,
    ) -> Result<Self> {
        let parent = Rc::clone(property.object());
        let short_names = store.archetypes().expand(&property.archetype_range());
        let short_name = relationship_archetype(&short_names, property.as_ref())?;

        let (parent_is_source, states) = {
            let parent = parent.borrow();
            let query = RelationshipStateQuery::new(store.as_ref(), &parent, property.values(), &short_names)
                .with_factory(factory);
            (query.parent_is_source(), query.query()?)
        };
        tracing::debug!(
            parent = %parent.borrow().reference(),
            node = property.name(),
            states = states.len(),
            parent_is_source,
            "opened relationship editor"
        );

        Ok(Self {
            collection: CollectionPropertyEditor::new(property, store),
            parent,
            short_name,
            parent_is_source,
            states,
            added: IndexSet::new(),
            deletions: Deletions::default(),
            exclude_inactive: config.exclude_inactive,
            config,
            factory,
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

    /// Returns the underlying collection editor, to register editors for
    /// relationships.
    pub fn collection_mut(&mut self) -> &mut CollectionPropertyEditor {
        &mut self.collection
    }

    /// Returns the archetype of relationships created by [`add`](Self::add).
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns true if the parent is the source of its relationships.
    #[must_use]
    pub fn parent_is_source(&self) -> bool {
        self.parent_is_source
    }

    /// Returns true if inactive relationships are hidden.
    #[must_use]
    pub fn exclude_inactive(&self) -> bool {
        self.exclude_inactive
    }

    /// Hides or shows inactive relationships. Only affects
    /// [`relationships`](Self::relationships); the collection is untouched.
    pub fn set_exclude_inactive(&mut self, exclude: bool) {
        self.exclude_inactive = exclude;
    }

    /// Returns the states to display: all of them, or only the active ones
    /// when inactive relationships are hidden.
    #[must_use]
    pub fn relationships(&self) -> Vec<&RelationshipState> {
        self.states
            .values()
            .filter(|state| !self.exclude_inactive || state.is_active())
            .collect()
    }

    /// Returns every state, active or not.
    pub fn states(&self) -> impl Iterator<Item = &RelationshipState> {
        self.states.values()
    }

    /// Returns the state of a relationship.
    #[must_use]
    pub fn state(&self, relationship: &Reference) -> Option<&RelationshipState> {
        self.states.get(relationship)
    }

    /// Returns the state of the relationship to `related`.
    #[must_use]
    pub fn state_for(&self, related: &Reference) -> Option<&RelationshipState> {
        self.states
            .values()
            .find(|state| &state.related().reference == related)
    }

    /// Links the parent to `related`, unless a relationship to it already
    /// exists. Returns true if a relationship was created.
    ///
    /// # Errors
    ///
    /// Fails if the relationship cannot be created or the collection cannot
    /// be modified.
    pub fn add(&mut self, related: &IMObject) -> Result<bool> {
        if self.state_for(related.reference()).is_some() {
            return Ok(false);
        }
        let store = Rc::clone(self.collection.store());
        let state = {
            let parent = self.parent.borrow();
            let (source, target) = if self.parent_is_source {
                (parent.reference(), related.reference())
            } else {
                (related.reference(), parent.reference())
            };
            let relationship = self
                .relationships
                .create(store.as_ref(), &self.short_name, source, target)?;
            self.factory
                .with_related(&parent, &relationship, related, self.parent_is_source)
        };
        let relationship = state.relationship().clone();
        let reference = relationship.reference().clone();
        self.collection.property().add(relationship)?;
        self.added.insert(reference.clone());
        tracing::debug!(relationship = %reference, related = %related.reference(), "added relationship");
        self.states.insert(reference, state);
        Ok(true)
    }

    /// Removes a relationship. Returns true if the collection held it.
    ///
    /// A saved relationship is queued for deletion on [`save`](Self::save),
    /// through its editor if one is registered.
    ///
    /// # Errors
    ///
    /// Fails if the collection cannot be modified.
    pub fn remove(&mut self, relationship: &Reference) -> Result<bool> {
        let object = self
            .collection
            .objects()
            .into_iter()
            .find(|r| r.reference() == relationship);
        let editor = self.collection.editor(relationship).cloned();
        let removed = self.collection.remove(relationship)?;
        self.states.shift_remove(relationship);
        if let Some(object) = object {
            if !self.added.shift_remove(relationship) && !object.is_new() {
                self.deletions.queue(object, editor);
            }
        }
        Ok(removed)
    }

    /// Removes the relationship to `related`. Returns true if there was one.
    ///
    /// # Errors
    ///
    /// Fails if the collection cannot be modified.
    pub fn remove_related(&mut self, related: &Reference) -> Result<bool> {
        match self.state_for(related).map(|state| state.reference().clone()) {
            Some(relationship) => self.remove(&relationship),
            None => Ok(false),
        }
    }

    /// Returns true if the relationship is queued for deletion.
    #[must_use]
    pub fn is_queued_for_deletion(&self, relationship: &Reference) -> bool {
        self.deletions.contains(relationship)
    }

    /// Returns the number of relationships queued for deletion.
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.deletions.len()
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

    /// Deletes the queued relationships, saves the collection, attaches new
    /// relationships to the objects at their far end, then saves the parent.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. A failed deletion is reported to the
    /// deletion listener and nothing after it is attempted.
    pub fn save(&mut self) -> Result<()> {
        let store = Rc::clone(self.collection.store());
        self.deletions
            .run(store.as_ref(), self.listener.as_ref(), self.user.as_deref())?;
        self.collection.save()?;
        self.attach_added(store.as_ref())?;
        store.save(&mut self.parent.borrow_mut())?;
        self.added.clear();
        self.collection.clear_modified();
        tracing::debug!(parent = %self.parent.borrow().reference(), "saved relationships");
        Ok(())
    }

    fn attach_added(&self, store: &dyn ObjectStore) -> Result<()> {
        let far = if self.parent_is_source {
            Side::Target
        } else {
            Side::Source
        };
        let objects = self.collection.objects();
        for relationship in objects.iter().filter(|r| self.added.contains(r.reference())) {
            let Some(reference) = far.of(relationship) else {
                continue;
            };
            let Some(mut related) = store.get(&reference)? else {
                continue;
            };
            let Some(node) = self.far_node(store.archetypes(), &related, relationship) else {
                continue;
            };
            related.add(&node, relationship.clone());
            store.save(&mut related)?;
        }
        Ok(())
    }

    fn far_node(
        &self,
        archetypes: &ArchetypeRegistry,
        related: &IMObject,
        relationship: &IMObject,
    ) -> Option<String> {
        let descriptor = archetypes.get(related.archetype())?;
        self.config
            .relationship_nodes
            .iter()
            .find(|name| {
                descriptor.node(name).is_some_and(|node| {
                    node.node_type.is_collection()
                        && ArchetypeRegistry::in_range(&node.archetype_range, relationship.archetype())
                })
            })
            .cloned()
    }
}

fn relationship_archetype(short_names: &[Arc<str>], property: &dyn Property) -> Result<Arc<str>> {
    short_names.first().cloned().ok_or_else(|| {
        Error::new(ErrorKind::Internal(format!(
            "{} declares no relationship archetype",
            property.name()
        )))
    })
}

impl fmt::Debug for RelationshipCollectionEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipCollectionEditor")
            .field("short_name", &self.short_name)
            .field("parent_is_source", &self.parent_is_source)
            .field("states", &self.states.len())
            .field("added", &self.added.len())
            .field("pending_deletions", &self.deletions.len())
            .field("exclude_inactive", &self.exclude_inactive)
            .finish_non_exhaustive()
    }
}
