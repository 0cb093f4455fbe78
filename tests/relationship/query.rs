//! Integration tests for relationship states
//!
//! Tests the batch state query, its fallback lookups, activity evaluation
//! and client-side ordering.

use imedit::store::archetype::ACTIVE_END_TIME;
use imedit::store::{IMObject, ObjectStore};
use imedit::relationship::{RelationshipStateFactory, RelationshipStateQuery, SortKey, sort_states};

use crate::fixtures::{OWNER, PATIENT, household, link, noon, saved, store};

fn relationships(owner: &IMObject) -> Vec<IMObject> {
    owner.collection("patients").into_iter().collect()
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn orphans_are_dropped_with_one_batch_and_bounded_fallbacks() {
    let store = store();
    let names: Vec<String> = (0..10).map(|i| format!("pet {i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let (owner, pets) = household(&store, &names);

    store.remove(pets[3].reference()).unwrap();
    store.remove(pets[7].reference()).unwrap();
    store.reset_stats();

    let owner = owner.borrow();
    let states = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .query()
        .unwrap();

    assert_eq!(states.len(), 8);
    assert!(states.values().all(|s| s.related().reference != *pets[3].reference()));
    assert!(states.values().all(|s| s.related().reference != *pets[7].reference()));
    let stats = store.stats();
    assert_eq!(stats.batch_queries, 1);
    assert!(stats.gets <= 2);
}

#[test]
fn persisted_relationships_need_no_lookups() {
    let store = store();
    let (owner, _) = household(&store, &["Fido", "Rex", "Tiddles"]);
    store.reset_stats();

    let owner = owner.borrow();
    let states = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .query()
        .unwrap();
    assert_eq!(states.len(), 3);
    assert_eq!(store.stats().batch_queries, 1);
    assert_eq!(store.stats().gets, 0);
}

#[test]
fn unsaved_relationships_resolve_through_a_lookup() {
    let store = store();
    let (owner, _) = household(&store, &["Fido"]);
    let rex = saved(&store, PATIENT, "Rex");
    let fresh = link(&store, &rex, &owner.borrow());
    owner.borrow_mut().add("patients", fresh.clone());
    store.reset_stats();

    let owner = owner.borrow();
    let states = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .query()
        .unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[fresh.reference()].related().name.as_deref(), Some("Rex"));
    assert_eq!(store.stats().gets, 1);
}

#[test]
fn states_keep_the_collection_order() {
    let store = store();
    let (owner, pets) = household(&store, &["Rex", "Fido", "Bella"]);
    let owner = owner.borrow();
    let states = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .query()
        .unwrap();
    let related: Vec<_> = states.values().map(|s| s.related().reference.clone()).collect();
    let expected: Vec<_> = pets.iter().map(|p| p.reference().clone()).collect();
    assert_eq!(related, expected);
}

// =============================================================================
// Sides
// =============================================================================

#[test]
fn owner_is_the_target() {
    let store = store();
    let (owner, _) = household(&store, &["Fido"]);
    let owner = owner.borrow();
    let query = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER]);
    assert!(!query.parent_is_source());

    let states = query.query().unwrap();
    let state = states.values().next().unwrap();
    assert_eq!(state.target().reference, *owner.reference());
    assert_eq!(state.parent().name.as_deref(), Some("Smith"));
    assert_eq!(state.source().name.as_deref(), Some("Fido"));
}

#[test]
fn pet_is_the_source() {
    let store = store();
    let (owner, pets) = household(&store, &["Fido"]);
    let owner = owner.borrow();
    let query = RelationshipStateQuery::new(store.as_ref(), &pets[0], relationships(&owner), &[OWNER]);
    assert!(query.parent_is_source());

    let states = query.query().unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(
        states.values().next().unwrap().related().name.as_deref(),
        Some("Smith")
    );
}

// =============================================================================
// Activity and ordering
// =============================================================================

#[test]
fn activity_is_evaluated_at_the_factory_clock() {
    let store = store();
    let (owner, _) = household(&store, &["Fido"]);
    {
        let mut owner = owner.borrow_mut();
        let mut rel = owner.collection("patients")[0].clone();
        rel.set(ACTIVE_END_TIME, noon(10));
        owner.add("patients", rel);
    }
    let owner = owner.borrow();

    let before = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .with_factory(RelationshipStateFactory::new().at(noon(9)))
        .query()
        .unwrap();
    assert!(before.values().all(|s| s.is_active()));

    let after = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .with_factory(RelationshipStateFactory::new().at(noon(10)))
        .query()
        .unwrap();
    assert!(after.values().all(|s| !s.is_active()));
}

#[test]
fn inactive_pets_make_their_state_inactive() {
    let store = store();
    let (owner, pets) = household(&store, &["Fido", "Rex"]);
    let mut rex = pets[1].clone();
    rex.set_active(false);
    store.save(&mut rex).unwrap();

    let owner = owner.borrow();
    let states = RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
        .query()
        .unwrap();
    let active: Vec<_> = states
        .values()
        .map(|s| (s.related().name.as_deref().unwrap_or_default().to_string(), s.is_active()))
        .collect();
    assert_eq!(
        active,
        vec![("Fido".to_string(), true), ("Rex".to_string(), false)]
    );
}

#[test]
fn states_sort_by_name_case_insensitively() {
    let store = store();
    let (owner, _) = household(&store, &["rex", "Fido", "bella"]);
    let owner = owner.borrow();
    let mut states: Vec<_> =
        RelationshipStateQuery::new(store.as_ref(), &owner, relationships(&owner), &[OWNER])
            .query()
            .unwrap()
            .into_values()
            .collect();

    sort_states(&mut states, SortKey::SourceName, true);
    let names: Vec<_> = states.iter().filter_map(|s| s.source().name.clone()).collect();
    assert_eq!(names.iter().map(|n| &**n).collect::<Vec<_>>(), vec!["bella", "Fido", "rex"]);

    sort_states(&mut states, SortKey::SourceName, false);
    assert_eq!(states[0].source().name.as_deref(), Some("rex"));
}
