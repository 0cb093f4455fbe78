//! Object instances.
//!
//! An [`IMObject`] is one instance of an archetype: a reference, a set of
//! node values and a set of collections. Relationships are objects too; they
//! hold `source` and `target` reference nodes and live in the collections of
//! the objects they link.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDateTime;
use imedit_foundation::{ObjectId, Reference, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::archetype::{
    ACTIVE, ACTIVE_END_TIME, ACTIVE_START_TIME, DESCRIPTION, NAME, SEQUENCE, SOURCE, TARGET,
};

/// An object shared between the editors and properties of one edit session.
pub type SharedObject = Rc<RefCell<IMObject>>;

/// Wraps an object for sharing.
#[must_use]
pub fn shared(object: IMObject) -> SharedObject {
    Rc::new(RefCell::new(object))
}

/// One archetype instance.
///
/// Equality and hashing use the reference only.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IMObject {
    reference: Reference,
    new: bool,
    nodes: im::HashMap<Arc<str>, Value>,
    collections: im::HashMap<Arc<str>, im::Vector<IMObject>>,
}

impl IMObject {
    /// Creates an unsaved object with no values.
    #[must_use]
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            new: true,
            nodes: im::HashMap::new(),
            collections: im::HashMap::new(),
        }
    }

    /// Returns the reference.
    #[must_use]
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Returns the archetype short name.
    #[must_use]
    pub fn archetype(&self) -> &str {
        self.reference.archetype()
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.reference.id
    }

    /// Returns true if the object has never been saved.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.new
    }

    /// Marks the object, and every object in its collections, as saved.
    pub fn mark_saved(&mut self) {
        self.new = false;
        for (_, elements) in self.collections.iter_mut() {
            for element in elements.iter_mut() {
                element.mark_saved();
            }
        }
    }

    /// Returns the value of a node, or [`Value::Null`] if it has none.
    #[must_use]
    pub fn get(&self, node: &str) -> Value {
        self.nodes.get(node).cloned().unwrap_or_default()
    }

    /// Sets the value of a node. Setting null clears it.
    ///
    /// Returns true if the stored value changed.
    pub fn set(&mut self, node: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        if value.is_null() {
            return self.nodes.remove(node).is_some();
        }
        match self.nodes.get(node) {
            Some(existing) if *existing == value => false,
            _ => {
                self.nodes.insert(Arc::from(node), value);
                true
            }
        }
    }

    /// Sets a node value, returning the object.
    #[must_use]
    pub fn with(mut self, node: &str, value: impl Into<Value>) -> Self {
        self.set(node, value);
        self
    }

    /// Returns the names of the nodes holding values.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|name| &**name)
    }

    /// Returns the name, if set.
    #[must_use]
    pub fn name(&self) -> Option<Arc<str>> {
        match self.nodes.get(NAME) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns the description, if set.
    #[must_use]
    pub fn description(&self) -> Option<Arc<str>> {
        match self.nodes.get(DESCRIPTION) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns the active flag. Objects without one are active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.nodes
            .get(ACTIVE)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Sets the active flag.
    pub fn set_active(&mut self, active: bool) {
        self.set(ACTIVE, active);
    }

    /// Returns the elements of a collection node.
    #[must_use]
    pub fn collection(&self, node: &str) -> im::Vector<IMObject> {
        self.collections.get(node).cloned().unwrap_or_default()
    }

    /// Returns the names of the non-empty collection nodes.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections
            .iter()
            .filter(|(_, elements)| !elements.is_empty())
            .map(|(name, _)| &**name)
    }

    /// Returns true if the collection holds an object with the given
    /// reference.
    #[must_use]
    pub fn contains(&self, node: &str, reference: &Reference) -> bool {
        self.collections
            .get(node)
            .is_some_and(|elements| elements.iter().any(|e| e.reference() == reference))
    }

    /// Adds an object to a collection.
    ///
    /// An object already present (by reference) is replaced in place.
    /// Returns true if the collection grew.
    pub fn add(&mut self, node: &str, object: IMObject) -> bool {
        let elements = self
            .collections
            .entry(Arc::from(node))
            .or_insert_with(im::Vector::new);
        if let Some(index) = elements
            .iter()
            .position(|e| e.reference() == object.reference())
        {
            elements.set(index, object);
            false
        } else {
            elements.push_back(object);
            true
        }
    }

    /// Removes an object from a collection. Returns true if it was present.
    pub fn remove(&mut self, node: &str, reference: &Reference) -> bool {
        let Some(elements) = self.collections.get_mut(node) else {
            return false;
        };
        match elements.iter().position(|e| e.reference() == reference) {
            Some(index) => {
                elements.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes an object from every collection. Returns true if it was
    /// present in any.
    pub fn remove_everywhere(&mut self, reference: &Reference) -> bool {
        let names: Vec<Arc<str>> = self.collections.keys().cloned().collect();
        let mut removed = false;
        for name in names {
            removed |= self.remove(&name, reference);
        }
        removed
    }

    // =========================================================================
    // Relationship accessors
    // =========================================================================

    /// Returns the source of a relationship.
    #[must_use]
    pub fn source(&self) -> Option<Reference> {
        self.nodes.get(SOURCE).and_then(Value::as_reference).cloned()
    }

    /// Returns the target of a relationship.
    #[must_use]
    pub fn target(&self) -> Option<Reference> {
        self.nodes.get(TARGET).and_then(Value::as_reference).cloned()
    }

    /// Returns true if this object holds a source or target reference.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        self.source().is_some() || self.target().is_some()
    }

    /// Returns the start of a period relationship.
    #[must_use]
    pub fn active_start_time(&self) -> Option<NaiveDateTime> {
        self.nodes.get(ACTIVE_START_TIME).and_then(Value::as_date)
    }

    /// Returns the end of a period relationship.
    #[must_use]
    pub fn active_end_time(&self) -> Option<NaiveDateTime> {
        self.nodes.get(ACTIVE_END_TIME).and_then(Value::as_date)
    }

    /// Returns the sequence of a relationship, or zero.
    #[must_use]
    pub fn sequence(&self) -> i64 {
        self.nodes.get(SEQUENCE).and_then(Value::as_int).unwrap_or(0)
    }

    /// Returns true if the object is active at `time`.
    ///
    /// The active flag must be set, and `time` must fall within the period:
    /// on or after the start time (if any) and before the end time (if any).
    #[must_use]
    pub fn is_active_at(&self, time: NaiveDateTime) -> bool {
        self.is_active()
            && self.active_start_time().is_none_or(|start| start <= time)
            && self.active_end_time().is_none_or(|end| time < end)
    }
}

impl PartialEq for IMObject {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for IMObject {}

impl Hash for IMObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl fmt::Debug for IMObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IMObject")
            .field("reference", &self.reference)
            .field("new", &self.new)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
