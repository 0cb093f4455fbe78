//! Integration tests for the memory store
//!
//! Tests persistence, relationship indexing, the batch related query and
//! round trip accounting.

use imedit::foundation::{ErrorKind, ObjectId, Reference};
use imedit::store::archetype::{NAME, SOURCE, TARGET};
use imedit::store::{
    ArchetypeDescriptor, ArchetypeRegistry, IMObject, MemoryStore, ObjectStore, RelatedQuery,
    Side,
};

const PATIENT: &str = "party.patientpet";
const CUSTOMER: &str = "party.customerperson";
const OWNER: &str = "entityRelationship.patientOwner";

fn store() -> MemoryStore {
    let registry = ArchetypeRegistry::new()
        .with(ArchetypeDescriptor::entity(PATIENT))
        .and_then(|r| r.with(ArchetypeDescriptor::entity(CUSTOMER)))
        .and_then(|r| r.with(ArchetypeDescriptor::relationship(OWNER, &[PATIENT], &[CUSTOMER])))
        .unwrap();
    MemoryStore::new(registry)
}

fn saved(store: &MemoryStore, archetype: &str, name: &str) -> IMObject {
    let mut object = store.create(archetype).unwrap().with(NAME, name);
    store.save(&mut object).unwrap();
    object
}

fn link(store: &MemoryStore, pet: &IMObject, owner: &IMObject) -> IMObject {
    store
        .create(OWNER)
        .unwrap()
        .with(SOURCE, pet.reference().clone())
        .with(TARGET, owner.reference().clone())
}

/// Saves `count` pets owned by one customer and returns the customer and
/// the relationship references.
fn household(store: &MemoryStore, count: usize) -> (IMObject, Vec<Reference>) {
    let mut owner = store.create(CUSTOMER).unwrap().with(NAME, "Smith");
    let mut relationships = Vec::with_capacity(count);
    for i in 0..count {
        let pet = saved(store, PATIENT, &format!("pet {i}"));
        let rel = link(store, &pet, &owner);
        relationships.push(rel.reference().clone());
        owner.add("patients", rel);
    }
    store.save(&mut owner).unwrap();
    (owner, relationships)
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn identifiers_are_allocated_on_create() {
    let store = store();
    let a = store.create(PATIENT).unwrap();
    let b = store.create(PATIENT).unwrap();
    assert_ne!(a.reference(), b.reference());
    assert!(a.is_new());
    assert!(store.is_empty());
}

#[test]
fn saved_objects_round_trip() {
    let store = store();
    let pet = saved(&store, PATIENT, "Fido");
    let loaded = store.get_required(pet.reference()).unwrap();
    assert_eq!(loaded.name().as_deref(), Some("Fido"));
    assert!(!loaded.is_new());
    assert_eq!(store.len(), 1);
}

#[test]
fn missing_objects() {
    let store = store();
    let missing = Reference::new(PATIENT, ObjectId(404));
    assert!(store.get(&missing).unwrap().is_none());
    let err = store.get_required(&missing).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ObjectNotFound(_)));
    assert!(store.remove(&missing).is_err());
}

#[test]
fn removing_an_entity_removes_its_relationships() {
    let store = store();
    let (owner, relationships) = household(&store, 2);
    let pet = store.get_required(&relationships[0]).unwrap().source().unwrap();
    store.remove(owner.reference()).unwrap();
    assert!(!store.contains(&relationships[0]));
    assert!(!store.contains(&relationships[1]));
    assert!(store.get(&relationships[0]).unwrap().is_none());
    assert!(store.contains(&pet));
}

// =============================================================================
// Related query
// =============================================================================

#[test]
fn batch_query_resolves_every_far_end_in_one_round_trip() {
    let store = store();
    let (owner, relationships) = household(&store, 5);
    store.reset_stats();

    let rows = store
        .query_related(&RelatedQuery::new(
            owner.reference().clone(),
            Side::Target,
            relationships.clone(),
        ))
        .unwrap();
    assert_eq!(rows.len(), 5);
    let names: Vec<_> = rows.iter().filter_map(|r| r.name.as_deref()).collect();
    assert_eq!(names, vec!["pet 0", "pet 1", "pet 2", "pet 3", "pet 4"]);
    assert_eq!(store.stats().batch_queries, 1);
    assert_eq!(store.stats().gets, 0);
}

#[test]
fn deleted_far_ends_produce_no_rows() {
    let store = store();
    let (owner, relationships) = household(&store, 3);
    let rel = store.get_required(&relationships[1]).unwrap();
    store.remove(&rel.source().unwrap()).unwrap();

    let rows = store
        .query_related(&RelatedQuery::new(
            owner.reference().clone(),
            Side::Target,
            relationships,
        ))
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn inactive_far_ends_are_reported_inactive() {
    let store = store();
    let (owner, relationships) = household(&store, 1);
    let rel = store.get_required(&relationships[0]).unwrap();
    let mut pet = store.get_required(&rel.source().unwrap()).unwrap();
    pet.set_active(false);
    store.save(&mut pet).unwrap();

    let rows = store
        .query_related(&RelatedQuery::new(
            owner.reference().clone(),
            Side::Target,
            relationships,
        ))
        .unwrap();
    assert!(!rows[0].active);
}

#[test]
fn removing_a_relationship_detaches_it() {
    let store = store();
    let (owner, relationships) = household(&store, 2);
    store.remove(&relationships[0]).unwrap();
    let owner = store.get_required(owner.reference()).unwrap();
    assert_eq!(owner.collection("patients").len(), 1);
    assert!(!owner.contains("patients", &relationships[0]));
}

// =============================================================================
// Failure injection
// =============================================================================

#[test]
fn injected_failures_leave_state_untouched() {
    let store = store();
    let pet = saved(&store, PATIENT, "Fido");
    store.fail_removals_of(pet.reference().clone());
    let err = store.remove(pet.reference()).unwrap_err();
    assert_eq!(err.message_key(), "object.error.delete");
    assert!(store.contains(pet.reference()));

    let mut other = store.create(PATIENT).unwrap();
    store.fail_saves_of(other.reference().clone());
    assert!(store.save(&mut other).is_err());
    assert!(other.is_new());
    assert!(!store.contains(other.reference()));
}
