//! Integration tests for errors
//!
//! Tests message keys, arguments, classification and context rendering.

use imedit::foundation::{Error, ErrorContext, ErrorKind, ObjectId, Reference};

// =============================================================================
// Message keys
// =============================================================================

#[test]
fn validation_errors_have_property_keys() {
    let required = Error::required("name");
    assert_eq!(required.message_key(), "property.error.required");
    assert_eq!(required.kind.arguments(), vec!["name".to_string()]);
    assert!(required.kind.is_validation());

    let derived = Error::derived_modification("total");
    assert_eq!(derived.message_key(), "property.error.derived");
    assert!(!derived.kind.is_validation());
}

#[test]
fn cardinality_errors() {
    let err = Error::new(ErrorKind::MinCardinality {
        property: "items".to_string(),
        min: 1,
    });
    assert_eq!(err.message_key(), "property.error.minSize");
    assert_eq!(err.to_string(), "items must have at least 1 items");
    assert!(err.kind.is_validation());
}

#[test]
fn not_found_carries_the_reference() {
    let reference = Reference::new("party.patientpet", ObjectId(9));
    let err = Error::object_not_found(reference.clone());
    assert_eq!(err.message_key(), "object.error.notfound");
    assert_eq!(err.kind.arguments(), vec![reference.to_string()]);
    assert_eq!(err.to_string(), "object not found: party.patientpet:9");
}

#[test]
fn invalid_value_keeps_its_cause() {
    let cause = std::io::Error::other("bad digits");
    let err = Error::invalid_value_caused_by("weight", cause);
    match &err.kind {
        ErrorKind::InvalidValue { property, cause } => {
            assert_eq!(property, "weight");
            assert!(cause.is_some());
        }
        other => panic!("unexpected kind: {other:?}"),
    }
    assert_eq!(err.message_key(), "property.error.invalid");
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn context_is_optional() {
    let err = Error::unknown_archetype("party.unknown");
    assert!(err.context.is_none());

    let err = err.with_context(
        ErrorContext::new()
            .with_archetype("party.patientpet")
            .with_node("owner"),
    );
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.to_string(), "at party.patientpet.owner");
}

#[test]
fn context_frames_render_one_per_line() {
    let context = ErrorContext::new()
        .with_frame("RelationshipCollectionEditor")
        .with_frame("save");
    assert_eq!(
        context.to_string(),
        "\n  in RelationshipCollectionEditor\n  in save\n"
    );
}
