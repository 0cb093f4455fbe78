//! Integration tests for values and references
//!
//! Tests Value classification, accessors, rendering and reference matching.

use chrono::NaiveDate;
use imedit::foundation::{Money, NodeType, ObjectId, Reference, Value, wildcard_match};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// =============================================================================
// Value
// =============================================================================

#[test]
fn null_is_empty_but_not_zero() {
    assert!(Value::Null.is_null());
    assert!(Value::Null.is_empty());
    assert!(!Value::Null.is_zero());
    assert_eq!(Value::Null.natural_type(), None);
}

#[test]
fn empty_string_is_empty() {
    assert!(Value::from("").is_empty());
    assert!(!Value::from(" ").is_empty());
    assert!(!Value::from("").is_null());
}

#[test]
fn numeric_zero_across_representations() {
    assert!(Value::Int(0).is_zero());
    assert!(Value::from(dec("0.00")).is_zero());
    assert!(Value::from(Money::new(Decimal::ZERO)).is_zero());
    assert!(!Value::from(dec("0.01")).is_zero());
    assert!(!Value::from("0").is_zero());
}

#[test]
fn natural_types() {
    assert_eq!(Value::from(true).natural_type(), Some(NodeType::Boolean));
    assert_eq!(Value::from(3_i32).natural_type(), Some(NodeType::Long));
    assert_eq!(Value::from(dec("1.5")).natural_type(), Some(NodeType::Decimal));
    assert_eq!(Value::from(Money::new(dec("1.5"))).natural_type(), Some(NodeType::Money));
    assert_eq!(Value::from("x").natural_type(), Some(NodeType::String));
}

#[test]
fn accessors_only_match_their_own_variant() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::from(7_i64).as_int(), Some(7));
    assert_eq!(Value::from("7").as_int(), None);
    assert_eq!(Value::from("abc").as_str(), Some("abc"));
    assert_eq!(Value::from(date).as_date(), Some(date));
    assert_eq!(Value::from(7_i64).as_decimal(), Some(dec("7")));
}

#[test]
fn option_none_is_null() {
    let none: Option<&str> = None;
    assert!(Value::from(none).is_null());
    assert_eq!(Value::from(Some("a")), Value::from("a"));
}

#[test]
fn display_rendering() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap();
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::from(Money::new(dec("5"))).to_string(), "5.00");
    assert_eq!(Value::from(date).to_string(), "2024-03-01 10:15:00");
}

// =============================================================================
// Reference
// =============================================================================

#[test]
fn reference_equality_needs_archetype_and_id() {
    let a = Reference::new("party.patientpet", ObjectId(1));
    let b = Reference::new("party.patientpet", ObjectId(1));
    let c = Reference::new("party.customerperson", ObjectId(1));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.to_string(), "party.patientpet:1");
}

#[test]
fn reference_pattern_matching() {
    let r = Reference::new("entityRelationship.patientOwner", ObjectId(4));
    assert!(r.is_a("entityRelationship.*"));
    assert!(r.is_a("*.patientOwner"));
    assert!(!r.is_a("entityLink.*"));
}

#[test]
fn wildcards() {
    assert!(wildcard_match("*", ""));
    assert!(wildcard_match("act.customerEstimation*Item", "act.customerEstimationItem"));
    assert!(wildcard_match("a*b*c", "aXXbYYc"));
    assert!(!wildcard_match("a*b*c", "aXXbYY"));
    assert!(wildcard_match("party.patientpet", "party.patientpet"));
    assert!(!wildcard_match("party.patient", "party.patientpet"));
}
