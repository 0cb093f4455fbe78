//! The object store collaborator.
//!
//! Editors and properties never persist anything themselves; they go through
//! an [`ObjectStore`]. The trait covers the handful of services the editing
//! core needs: lookup, creation, saving, removal, derived value computation
//! and the batch "other side of these relationships" query.

use std::sync::Arc;

use imedit_foundation::{Error, Reference, Result};

use crate::archetype::{ArchetypeDescriptor, ArchetypeRegistry};
use crate::object::IMObject;
use crate::relationship::Side;

/// Batch query for the objects at the far end of a set of relationships.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedQuery {
    /// The object the relationships belong to.
    pub parent: Reference,
    /// The end of the relationships the parent occupies.
    pub side: Side,
    /// The relationships to resolve.
    pub relationships: Vec<Reference>,
}

impl RelatedQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(parent: Reference, side: Side, relationships: Vec<Reference>) -> Self {
        Self {
            parent,
            side,
            relationships,
        }
    }
}

/// One row of a [`RelatedQuery`] result: a relationship plus the summary of
/// the object at its far end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedRow {
    /// The relationship.
    pub relationship: Reference,
    /// The object at the far end.
    pub related: Reference,
    /// Name of the far end object.
    pub name: Option<Arc<str>>,
    /// Description of the far end object.
    pub description: Option<Arc<str>>,
    /// Active flag of the far end object.
    pub active: bool,
}

/// Persistence and schema services used by the editing core.
///
/// Every method takes `&self`; implementations manage their own interior
/// state so a store can be shared by all editors of a session.
pub trait ObjectStore {
    /// Returns the archetype descriptors.
    fn archetypes(&self) -> &ArchetypeRegistry;

    /// Returns an object by reference, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get(&self, reference: &Reference) -> Result<Option<IMObject>>;

    /// Creates an unsaved instance of an archetype, with node defaults
    /// applied and an identifier already allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the archetype is unknown.
    fn create(&self, short_name: &str) -> Result<IMObject>;

    /// Saves an object and the objects in its collections, marking them all
    /// saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be saved.
    fn save(&self, object: &mut IMObject) -> Result<()>;

    /// Removes an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be removed.
    fn remove(&self, reference: &Reference) -> Result<()>;

    /// Recomputes the derived nodes of `object` in place, returning the names
    /// of the nodes whose value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if derivation fails.
    fn derive_values(&self, object: &mut IMObject) -> Result<Vec<Arc<str>>>;

    /// Runs a batch query for the objects at the far end of a set of
    /// relationships.
    ///
    /// Relationships the store does not know about, or whose far end no
    /// longer exists, produce no row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn query_related(&self, query: &RelatedQuery) -> Result<Vec<RelatedRow>>;

    /// Returns an object by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist.
    fn get_required(&self, reference: &Reference) -> Result<IMObject> {
        self.get(reference)?
            .ok_or_else(|| Error::object_not_found(reference.clone()))
    }

    /// Returns the descriptor of an object's archetype.
    ///
    /// # Errors
    ///
    /// Returns an error if the archetype is unknown.
    fn descriptor(&self, object: &IMObject) -> Result<&ArchetypeDescriptor> {
        self.archetypes().require(object.archetype())
    }
}
