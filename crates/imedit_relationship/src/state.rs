//! Relationship state snapshots.
//!
//! A [`RelationshipState`] is what a relationship table displays: the
//! relationship itself plus the name, description and active flag of both
//! endpoints. The parent's end comes from the parent object; the far end
//! comes from a batch query row or, for relationships the batch could not
//! resolve, from a single lookup.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use imedit_foundation::{Reference, Result};
use imedit_store::{IMObject, ObjectStore, RelatedRow, Side};

/// Summary of one end of a relationship.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// The object at this end.
    pub reference: Reference,
    /// Its name.
    pub name: Option<Arc<str>>,
    /// Its description.
    pub description: Option<Arc<str>>,
    /// Its active flag.
    pub active: bool,
}

impl Endpoint {
    /// Summarises `object`.
    #[must_use]
    pub fn of(object: &IMObject) -> Self {
        Self {
            reference: object.reference().clone(),
            name: object.name(),
            description: object.description(),
            active: object.is_active(),
        }
    }

    /// Summarises the far end returned by a batch query row.
    #[must_use]
    pub fn from_row(row: &RelatedRow) -> Self {
        Self {
            reference: row.related.clone(),
            name: row.name.clone(),
            description: row.description.clone(),
            active: row.active,
        }
    }
}

/// A relationship together with the summaries of its endpoints.
#[derive(Clone, Debug)]
pub struct RelationshipState {
    relationship: IMObject,
    source: Endpoint,
    target: Endpoint,
    parent_is_source: bool,
    as_of: NaiveDateTime,
}

impl RelationshipState {
    /// Creates a state.
    #[must_use]
    pub fn new(
        relationship: IMObject,
        source: Endpoint,
        target: Endpoint,
        parent_is_source: bool,
        as_of: NaiveDateTime,
    ) -> Self {
        Self {
            relationship,
            source,
            target,
            parent_is_source,
            as_of,
        }
    }

    /// Returns the relationship as it was when the state was built.
    #[must_use]
    pub fn relationship(&self) -> &IMObject {
        &self.relationship
    }

    /// Returns the relationship's reference.
    #[must_use]
    pub fn reference(&self) -> &Reference {
        self.relationship.reference()
    }

    /// Returns the source end.
    #[must_use]
    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    /// Returns the target end.
    #[must_use]
    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    /// Returns true if the parent is the source of the relationship.
    #[must_use]
    pub fn parent_is_source(&self) -> bool {
        self.parent_is_source
    }

    /// Returns the end occupied by the parent.
    #[must_use]
    pub fn parent(&self) -> &Endpoint {
        if self.parent_is_source {
            &self.source
        } else {
            &self.target
        }
    }

    /// Returns the end opposite the parent.
    #[must_use]
    pub fn related(&self) -> &Endpoint {
        if self.parent_is_source {
            &self.target
        } else {
            &self.source
        }
    }

    /// Returns the relationship's sequence.
    #[must_use]
    pub fn sequence(&self) -> i64 {
        self.relationship.sequence()
    }

    /// Returns true if the relationship and its far end are both active at
    /// the time the state was built.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(self.as_of)
    }

    /// Returns true if the relationship is active at `time` and its far end
    /// is active.
    #[must_use]
    pub fn is_active_at(&self, time: NaiveDateTime) -> bool {
        self.relationship.is_active_at(time) && self.related().active
    }
}

impl PartialEq for RelationshipState {
    fn eq(&self, other: &Self) -> bool {
        self.reference() == other.reference()
    }
}

impl Eq for RelationshipState {}

/// Builds [`RelationshipState`]s.
///
/// States are evaluated for activity against the factory's clock, which is
/// the local time unless fixed with [`at`](Self::at).
#[derive(Clone, Copy, Debug, Default)]
pub struct RelationshipStateFactory {
    as_of: Option<NaiveDateTime>,
}

impl RelationshipStateFactory {
    /// Creates a factory using the local clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates activity at a fixed time.
    #[must_use]
    pub fn at(mut self, time: NaiveDateTime) -> Self {
        self.as_of = Some(time);
        self
    }

    /// Returns the time states are evaluated at.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.as_of.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Creates a state from the parent and the summary of the far end.
    #[must_use]
    pub fn from_endpoints(
        &self,
        parent: &IMObject,
        relationship: &IMObject,
        related: Endpoint,
        parent_is_source: bool,
    ) -> RelationshipState {
        let parent = Endpoint::of(parent);
        let (source, target) = if parent_is_source {
            (parent, related)
        } else {
            (related, parent)
        };
        RelationshipState::new(
            relationship.clone(),
            source,
            target,
            parent_is_source,
            self.now(),
        )
    }

    /// Creates a state from a batch query row.
    #[must_use]
    pub fn from_row(
        &self,
        parent: &IMObject,
        relationship: &IMObject,
        row: &RelatedRow,
        parent_is_source: bool,
    ) -> RelationshipState {
        self.from_endpoints(parent, relationship, Endpoint::from_row(row), parent_is_source)
    }

    /// Creates a state for a relationship to an object already in hand.
    #[must_use]
    pub fn with_related(
        &self,
        parent: &IMObject,
        relationship: &IMObject,
        related: &IMObject,
        parent_is_source: bool,
    ) -> RelationshipState {
        self.from_endpoints(parent, relationship, Endpoint::of(related), parent_is_source)
    }

    /// Creates a state by looking the far end up in the store.
    ///
    /// Returns `None` if the relationship has no far end, or the far end no
    /// longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn create(
        &self,
        store: &dyn ObjectStore,
        parent: &IMObject,
        relationship: &IMObject,
        parent_is_source: bool,
    ) -> Result<Option<RelationshipState>> {
        let far = if parent_is_source {
            Side::Target
        } else {
            Side::Source
        };
        let Some(reference) = far.of(relationship) else {
            return Ok(None);
        };
        Ok(store
            .get(&reference)?
            .map(|related| self.with_related(parent, relationship, &related, parent_is_source)))
    }
}

/// Orderings a relationship table may apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// By the source's name.
    SourceName,
    /// By the target's name.
    TargetName,
    /// Inactive before active.
    Active,
}

/// Sorts `states` by `key`. Names compare case-insensitively with unnamed
/// endpoints last; ties keep their current order.
pub fn sort_states(states: &mut [RelationshipState], key: SortKey, ascending: bool) {
    states.sort_by(|a, b| {
        let ordering = match key {
            SortKey::SourceName => compare_names(&a.source.name, &b.source.name),
            SortKey::TargetName => compare_names(&a.target.name, &b.target.name),
            SortKey::Active => a.is_active().cmp(&b.is_active()),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn compare_names(a: &Option<Arc<str>>, b: &Option<Arc<str>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
