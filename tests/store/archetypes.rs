//! Integration tests for archetype descriptors
//!
//! Tests registration, wildcard expansion and relationship end ranges.

use std::sync::Arc;

use imedit::foundation::{ErrorKind, NodeType, Value};
use imedit::store::archetype::{ACTIVE, NAME, SEQUENCE, SOURCE, TARGET};
use imedit::store::{ArchetypeDescriptor, ArchetypeRegistry, NodeDescriptor};

fn names(names: &[&str]) -> Vec<Arc<str>> {
    names.iter().map(|n| Arc::from(*n)).collect()
}

fn registry() -> ArchetypeRegistry {
    ArchetypeRegistry::new()
        .with(ArchetypeDescriptor::entity("party.customerperson"))
        .and_then(|r| r.with(ArchetypeDescriptor::entity("party.customerorganisation")))
        .and_then(|r| r.with(ArchetypeDescriptor::entity("party.patientpet")))
        .and_then(|r| {
            r.with(ArchetypeDescriptor::relationship(
                "entityRelationship.patientOwner",
                &["party.patientpet"],
                &["party.customer*"],
            ))
        })
        .and_then(|r| {
            r.with(ArchetypeDescriptor::relationship(
                "entityRelationship.patientLocation",
                &["party.patientpet"],
                &["party.organisationLocation"],
            ))
        })
        .unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn entity_has_standard_nodes() {
    let registry = registry();
    let person = registry.require("party.customerperson").unwrap();
    let name = person.require_node(NAME).unwrap();
    assert!(name.is_required());
    assert_eq!(name.max_length, Some(100));
    assert_eq!(person.node(ACTIVE).unwrap().default, Value::Bool(true));
    assert!(!person.is_relationship());
}

#[test]
fn relationship_has_endpoint_nodes() {
    let registry = registry();
    let owner = registry.require("entityRelationship.patientOwner").unwrap();
    assert!(owner.is_relationship());
    assert_eq!(owner.require_node(SOURCE).unwrap().node_type, NodeType::Reference);
    assert!(owner.require_node(TARGET).unwrap().is_required());
    assert!(owner.require_node(SEQUENCE).unwrap().hidden);
}

#[test]
fn unknown_node_and_archetype() {
    let registry = registry();
    let err = registry.require("party.horse").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownArchetype(_)));

    let pet = registry.require("party.patientpet").unwrap();
    let err = pet.require_node("breed").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownNode { .. }));
}

#[test]
fn duplicates_are_rejected() {
    let registry = registry();
    assert!(
        registry
            .with(ArchetypeDescriptor::entity("party.patientpet"))
            .is_err()
    );
}

// =============================================================================
// Wildcards
// =============================================================================

#[test]
fn expansion_is_sorted_and_deduplicated() {
    let registry = registry();
    assert_eq!(
        registry.expand(&["party.customer*", "party.customerperson"]),
        names(&["party.customerorganisation", "party.customerperson"])
    );
}

#[test]
fn plain_names_survive_expansion_unregistered() {
    let registry = registry();
    assert_eq!(
        registry.expand(&["party.organisationLocation"]),
        names(&["party.organisationLocation"])
    );
    assert!(registry.short_names("act.*").is_empty());
}

#[test]
fn node_ranges_union_across_relationships() {
    let registry = registry();
    let targets = registry.node_short_names(&["entityRelationship.patient*"], TARGET);
    assert_eq!(
        targets,
        names(&[
            "party.customerorganisation",
            "party.customerperson",
            "party.organisationLocation",
        ])
    );
    let sources = registry.node_short_names(&["entityRelationship.patient*"], SOURCE);
    assert_eq!(sources, names(&["party.patientpet"]));
}

#[test]
fn in_range() {
    assert!(ArchetypeRegistry::in_range(&["party.customer*"], "party.customerperson"));
    assert!(!ArchetypeRegistry::in_range(&["party.customer*"], "party.patientpet"));
    assert!(!ArchetypeRegistry::in_range::<&str>(&[], "party.patientpet"));
}

// =============================================================================
// Node builders
// =============================================================================

#[test]
fn collection_nodes() {
    let node = NodeDescriptor::collection("items", &["act.*Item"])
        .with_cardinality(1, Some(5))
        .parent_child();
    assert!(node.node_type.is_collection());
    assert!(node.parent_child);
    assert_eq!(node.min_cardinality, 1);
    assert_eq!(node.max_cardinality, Some(5));
    assert_eq!(node.archetype_range, names(&["act.*Item"]));
}
