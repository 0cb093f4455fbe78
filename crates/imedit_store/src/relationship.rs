//! Relationship storage with bidirectional indices.
//!
//! Relationships are objects linking a source to a target. The index keeps
//! every saved relationship by reference plus forward (source to
//! relationships) and reverse (target to relationships) sets, so either end
//! can be traversed without scanning.

use std::collections::{HashMap, HashSet};

use imedit_foundation::Reference;

use crate::archetype::{SOURCE, TARGET};
use crate::object::IMObject;

/// One end of a relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The `source` end.
    Source,
    /// The `target` end.
    Target,
}

impl Side {
    /// Returns the other end.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }

    /// Returns the name of the node holding this end.
    #[must_use]
    pub const fn node(self) -> &'static str {
        match self {
            Self::Source => SOURCE,
            Self::Target => TARGET,
        }
    }

    /// Returns the reference held at this end of `relationship`.
    #[must_use]
    pub fn of(self, relationship: &IMObject) -> Option<Reference> {
        match self {
            Self::Source => relationship.source(),
            Self::Target => relationship.target(),
        }
    }
}

/// Stores relationships with bidirectional indices.
///
/// Maintains:
/// - Forward: source -> set of relationships
/// - Reverse: target -> set of relationships
#[derive(Clone, Debug, Default)]
pub struct RelationshipIndex {
    relationships: HashMap<Reference, IMObject>,
    forward: HashMap<Reference, HashSet<Reference>>,
    reverse: HashMap<Reference, HashSet<Reference>>,
}

impl RelationshipIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a relationship, replacing any previous version of it.
    pub fn insert(&mut self, relationship: IMObject) {
        let reference = relationship.reference().clone();
        self.unlink(&reference);
        if let Some(source) = relationship.source() {
            self.forward
                .entry(source)
                .or_default()
                .insert(reference.clone());
        }
        if let Some(target) = relationship.target() {
            self.reverse
                .entry(target)
                .or_default()
                .insert(reference.clone());
        }
        self.relationships.insert(reference, relationship);
    }

    /// Removes a relationship, returning it if it was indexed.
    pub fn remove(&mut self, reference: &Reference) -> Option<IMObject> {
        self.unlink(reference);
        self.relationships.remove(reference)
    }

    fn unlink(&mut self, reference: &Reference) {
        let Some(existing) = self.relationships.get(reference) else {
            return;
        };
        if let Some(source) = existing.source() {
            if let Some(set) = self.forward.get_mut(&source) {
                set.remove(reference);
                if set.is_empty() {
                    self.forward.remove(&source);
                }
            }
        }
        if let Some(target) = existing.target() {
            if let Some(set) = self.reverse.get_mut(&target) {
                set.remove(reference);
                if set.is_empty() {
                    self.reverse.remove(&target);
                }
            }
        }
    }

    /// Returns a relationship by reference.
    #[must_use]
    pub fn get(&self, reference: &Reference) -> Option<&IMObject> {
        self.relationships.get(reference)
    }

    /// Returns true if the relationship is indexed.
    #[must_use]
    pub fn contains(&self, reference: &Reference) -> bool {
        self.relationships.contains_key(reference)
    }

    /// Returns the relationships with `endpoint` at the given side.
    pub fn at(&self, side: Side, endpoint: &Reference) -> impl Iterator<Item = &IMObject> {
        let index = match side {
            Side::Source => &self.forward,
            Side::Target => &self.reverse,
        };
        index
            .get(endpoint)
            .into_iter()
            .flatten()
            .filter_map(|reference| self.relationships.get(reference))
    }

    /// Returns the number of indexed relationships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}
