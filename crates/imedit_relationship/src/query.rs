//! Batch resolution of relationship states.
//!
//! Resolving the far end of every relationship one lookup at a time costs a
//! round trip per relationship. [`RelationshipStateQuery`] issues one batch
//! query for all of them and falls back to single lookups only for the
//! relationships the batch could not resolve, typically ones not yet saved.

use std::collections::HashMap;
use std::sync::Arc;

use imedit_foundation::{Reference, Result};
use imedit_store::{
    ArchetypeRegistry, IMObject, ObjectStore, RelatedQuery, Side,
    archetype::{SOURCE, TARGET},
};
use indexmap::IndexMap;

use crate::state::{RelationshipState, RelationshipStateFactory};

/// Resolves the [`RelationshipState`]s of a parent's relationships.
pub struct RelationshipStateQuery<'a> {
    store: &'a dyn ObjectStore,
    parent: &'a IMObject,
    relationships: Vec<IMObject>,
    parent_is_source: bool,
    factory: RelationshipStateFactory,
}

impl<'a> RelationshipStateQuery<'a> {
    /// Creates a query for `relationships` of `parent`, whose archetypes
    /// match `short_names`.
    ///
    /// The parent is the source if its archetype is a valid source of those
    /// archetypes. If it is a valid target as well, the relationships
    /// decide: any relationship with a different source makes the parent the
    /// target.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        store: &'a dyn ObjectStore,
        parent: &'a IMObject,
        relationships: Vec<IMObject>,
        short_names: &[S],
    ) -> Self {
        let parent_is_source = parent_is_source(store.archetypes(), parent, &relationships, short_names);
        Self {
            store,
            parent,
            relationships,
            parent_is_source,
            factory: RelationshipStateFactory::new(),
        }
    }

    /// Uses `factory` to build states.
    #[must_use]
    pub fn with_factory(mut self, factory: RelationshipStateFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Returns true if the parent is the source of the relationships.
    #[must_use]
    pub fn parent_is_source(&self) -> bool {
        self.parent_is_source
    }

    /// Returns the parent.
    #[must_use]
    pub fn parent(&self) -> &IMObject {
        self.parent
    }

    /// Resolves the states, keyed by relationship and in the order the
    /// relationships were given.
    ///
    /// Relationships whose far end no longer exists are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch query or a fallback lookup fails.
    pub fn query(&self) -> Result<IndexMap<Reference, RelationshipState>> {
        if self.relationships.is_empty() {
            return Ok(IndexMap::new());
        }
        let side = if self.parent_is_source {
            Side::Source
        } else {
            Side::Target
        };
        let batch = RelatedQuery::new(
            self.parent.reference().clone(),
            side,
            self.relationships
                .iter()
                .map(|r| r.reference().clone())
                .collect(),
        );
        let mut pending: HashMap<&Reference, &IMObject> = self
            .relationships
            .iter()
            .map(|r| (r.reference(), r))
            .collect();
        let mut resolved = HashMap::with_capacity(self.relationships.len());
        for row in self.store.query_related(&batch)? {
            if let Some(relationship) = pending.remove(&row.relationship) {
                let state = self
                    .factory
                    .from_row(self.parent, relationship, &row, self.parent_is_source);
                resolved.insert(row.relationship, state);
            }
        }

        let batched = resolved.len();
        let mut fallbacks = 0usize;
        for relationship in &self.relationships {
            if !pending.contains_key(relationship.reference()) {
                continue;
            }
            fallbacks += 1;
            match self
                .factory
                .create(self.store, self.parent, relationship, self.parent_is_source)?
            {
                Some(state) => {
                    resolved.insert(relationship.reference().clone(), state);
                }
                None => {
                    tracing::warn!(
                        parent = %self.parent.reference(),
                        relationship = %relationship.reference(),
                        "related object not found; relationship dropped"
                    );
                }
            }
        }
        tracing::debug!(
            parent = %self.parent.reference(),
            relationships = self.relationships.len(),
            batched,
            fallbacks,
            "resolved relationship states"
        );

        Ok(self
            .relationships
            .iter()
            .filter_map(|r| {
                let reference = r.reference();
                resolved.remove(reference).map(|state| (reference.clone(), state))
            })
            .collect())
    }
}

fn parent_is_source<S: AsRef<str>>(
    archetypes: &ArchetypeRegistry,
    parent: &IMObject,
    relationships: &[IMObject],
    short_names: &[S],
) -> bool {
    let sources: Vec<Arc<str>> = archetypes.node_short_names(short_names, SOURCE);
    if !ArchetypeRegistry::in_range(&sources, parent.archetype()) {
        return false;
    }
    let targets = archetypes.node_short_names(short_names, TARGET);
    if !ArchetypeRegistry::in_range(&targets, parent.archetype()) {
        return true;
    }
    !relationships
        .iter()
        .any(|r| r.source().is_some_and(|source| &source != parent.reference()))
}
