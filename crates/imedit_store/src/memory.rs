//! In-process object store.
//!
//! `MemoryStore` keeps saved objects in a map and indexes every relationship
//! found in their collections, so the batch relationship query can be
//! answered in one pass. It counts the round trips it serves, which makes
//! query batching observable in tests and benchmarks.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use imedit_foundation::{Error, ErrorKind, ObjectId, Reference, Result};

use crate::archetype::ArchetypeRegistry;
use crate::derive::{Derivation, derive_all};
use crate::object::IMObject;
use crate::relationship::{RelationshipIndex, Side};
use crate::store::{ObjectStore, RelatedQuery, RelatedRow};

/// Round trips served by a [`MemoryStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Batch relationship queries.
    pub batch_queries: usize,
    /// Single object lookups.
    pub gets: usize,
    /// Saves.
    pub saves: usize,
    /// Removals.
    pub removes: usize,
}

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<Reference, IMObject>,
    relationships: RelationshipIndex,
    next_id: u64,
    failing_saves: HashSet<Reference>,
    failing_removes: HashSet<Reference>,
}

impl Inner {
    /// Unindexes a relationship and detaches it from the stored objects at
    /// either end.
    fn drop_relationship(&mut self, reference: &Reference) -> Option<IMObject> {
        let relationship = self.relationships.remove(reference)?;
        self.objects.remove(reference);
        for endpoint in [relationship.source(), relationship.target()]
            .into_iter()
            .flatten()
        {
            if let Some(owner) = self.objects.get_mut(&endpoint) {
                owner.remove_everywhere(reference);
            }
        }
        tracing::trace!(relationship = %reference, "dropped relationship");
        Some(relationship)
    }
}

/// Returns the relationships held in the collections of `object`.
fn relationships_in(object: &IMObject) -> HashSet<Reference> {
    object
        .collection_names()
        .flat_map(|name| object.collection(name))
        .filter(IMObject::is_relationship)
        .map(|element| element.reference().clone())
        .collect()
}

/// Object store held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    archetypes: ArchetypeRegistry,
    derivations: Vec<Derivation>,
    inner: RefCell<Inner>,
    stats: Cell<QueryStats>,
}

impl MemoryStore {
    /// Creates an empty store over the given archetypes.
    #[must_use]
    pub fn new(archetypes: ArchetypeRegistry) -> Self {
        Self {
            archetypes,
            derivations: Vec::new(),
            inner: RefCell::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            stats: Cell::new(QueryStats::default()),
        }
    }

    /// Adds a derived value rule.
    #[must_use]
    pub fn with_derivation(mut self, derivation: Derivation) -> Self {
        self.derivations.push(derivation);
        self
    }

    /// Returns the round trips served so far.
    #[must_use]
    pub fn stats(&self) -> QueryStats {
        self.stats.get()
    }

    /// Resets the round trip counters.
    pub fn reset_stats(&self) {
        self.stats.set(QueryStats::default());
    }

    /// Returns true if an object or relationship with the reference is
    /// stored. Does not count as a lookup.
    #[must_use]
    pub fn contains(&self, reference: &Reference) -> bool {
        let inner = self.inner.borrow();
        inner.objects.contains_key(reference) || inner.relationships.contains(reference)
    }

    /// Returns the number of stored objects, excluding relationships saved
    /// only as collection elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().objects.len()
    }

    /// Returns true if no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().objects.is_empty()
    }

    /// Makes every later save of `reference` fail.
    pub fn fail_saves_of(&self, reference: Reference) {
        self.inner.borrow_mut().failing_saves.insert(reference);
    }

    /// Makes every later removal of `reference` fail.
    pub fn fail_removals_of(&self, reference: Reference) {
        self.inner.borrow_mut().failing_removes.insert(reference);
    }

    fn count(&self, update: impl FnOnce(&mut QueryStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

impl ObjectStore for MemoryStore {
    fn archetypes(&self) -> &ArchetypeRegistry {
        &self.archetypes
    }

    fn get(&self, reference: &Reference) -> Result<Option<IMObject>> {
        self.count(|s| s.gets += 1);
        let inner = self.inner.borrow();
        Ok(inner
            .objects
            .get(reference)
            .or_else(|| inner.relationships.get(reference))
            .cloned())
    }

    fn create(&self, short_name: &str) -> Result<IMObject> {
        let descriptor = self.archetypes.require(short_name)?;
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            ObjectId(id)
        };
        let mut object = IMObject::new(Reference::new(descriptor.short_name.clone(), id));
        for node in &descriptor.nodes {
            if !node.default.is_null() {
                object.set(&node.name, node.default.clone());
            }
        }
        tracing::trace!(reference = %object.reference(), "created object");
        Ok(object)
    }

    fn save(&self, object: &mut IMObject) -> Result<()> {
        let reference = object.reference().clone();
        if self.inner.borrow().failing_saves.contains(&reference) {
            return Err(Error::store(format!("failed to save {reference}")));
        }
        self.archetypes.require(object.archetype())?;
        object.mark_saved();

        let mut inner = self.inner.borrow_mut();
        let held = relationships_in(object);
        let dropped: Vec<Reference> = inner
            .objects
            .get(&reference)
            .map(|previous| {
                relationships_in(previous)
                    .into_iter()
                    .filter(|r| !held.contains(r))
                    .collect()
            })
            .unwrap_or_default();
        for relationship in &dropped {
            inner.drop_relationship(relationship);
        }

        let mut indexed = 0usize;
        for name in object.collection_names() {
            for element in object.collection(name) {
                if element.is_relationship() {
                    inner.relationships.insert(element);
                    indexed += 1;
                }
            }
        }
        if object.is_relationship() {
            inner.relationships.insert(object.clone());
        }
        inner.objects.insert(reference.clone(), object.clone());
        drop(inner);

        self.count(|s| s.saves += 1);
        tracing::debug!(
            reference = %reference,
            relationships = indexed,
            dropped = dropped.len(),
            "saved object"
        );
        Ok(())
    }

    fn remove(&self, reference: &Reference) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing_removes.contains(reference) {
            return Err(Error::new(ErrorKind::DeletionFailed {
                reference: reference.clone(),
                reason: "removal rejected by store".to_string(),
            }));
        }
        let object = inner.objects.remove(reference);
        let relationship = inner.drop_relationship(reference);
        if object.is_none() && relationship.is_none() {
            return Err(Error::object_not_found(reference.clone()));
        }
        let index = &inner.relationships;
        let linked: Vec<Reference> = [Side::Source, Side::Target]
            .into_iter()
            .flat_map(|side| index.at(side, reference))
            .map(|r| r.reference().clone())
            .collect();
        for relationship in &linked {
            inner.drop_relationship(relationship);
        }
        drop(inner);

        self.count(|s| s.removes += 1);
        tracing::debug!(reference = %reference, relationships = linked.len(), "removed object");
        Ok(())
    }

    fn derive_values(&self, object: &mut IMObject) -> Result<Vec<Arc<str>>> {
        Ok(derive_all(&self.derivations, object))
    }

    fn query_related(&self, query: &RelatedQuery) -> Result<Vec<RelatedRow>> {
        self.count(|s| s.batch_queries += 1);
        let inner = self.inner.borrow();
        let far = query.side.opposite();
        let rows: Vec<RelatedRow> = query
            .relationships
            .iter()
            .filter_map(|reference| inner.relationships.get(reference))
            .filter(|rel| query.side.of(rel).as_ref() == Some(&query.parent))
            .filter_map(|rel| {
                let related = inner.objects.get(&far.of(rel)?)?;
                Some(RelatedRow {
                    relationship: rel.reference().clone(),
                    related: related.reference().clone(),
                    name: related.name(),
                    description: related.description(),
                    active: related.is_active(),
                })
            })
            .collect();
        tracing::debug!(
            parent = %query.parent,
            requested = query.relationships.len(),
            returned = rows.len(),
            "related query"
        );
        Ok(rows)
    }
}
