//! Integration tests for typed property access
//!
//! Tests the typed getters, their defaults and conversion failures.

use chrono::NaiveDate;
use imedit::foundation::{ErrorKind, Money, NodeType, ObjectId, Reference, TargetType, Value};
use imedit::property::{Modifiable, Property, SimpleProperty};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn date_text_round_trips_to_midnight() {
    let p = SimpleProperty::new("startTime", NodeType::Date);
    assert!(!p.is_modified());

    assert!(p.set_value(Value::from("2024-03-01")).unwrap());
    let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(p.get_date().unwrap(), Some(expected));
    assert!(p.is_modified());
}

#[test]
fn failed_date_write_leaves_the_property_clean() {
    let p = SimpleProperty::new("startTime", NodeType::Date);
    let err = p.set_value(Value::from("the first of March")).unwrap_err();
    assert_eq!(err.message_key(), "property.error.invalid");
    assert!(!p.is_modified());
    assert!(p.get_date().unwrap().is_none());
}

#[test]
fn rewriting_the_same_date_is_a_no_op() {
    let p = SimpleProperty::new("startTime", NodeType::Date);
    assert!(p.set_value(Value::from("2024-03-01")).unwrap());
    p.clear_modified();
    assert!(!p.set_value(Value::from("2024-03-01 00:00")).unwrap());
    assert!(!p.is_modified());
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn numeric_getters_widen_and_narrow() {
    let p = SimpleProperty::new("quantity", NodeType::Decimal).with_value(dec("4"));
    assert_eq!(p.get_int().unwrap(), 4);
    assert_eq!(p.get_long().unwrap(), 4);
    assert_eq!(p.get_decimal().unwrap(), Some(dec("4")));
    assert_eq!(p.get_money().unwrap(), Some(Money::new(dec("4"))));
    assert_eq!(p.get_string().unwrap().as_deref(), Some("4"));
}

#[test]
fn null_uses_the_default() {
    let p = SimpleProperty::new("quantity", NodeType::Decimal);
    assert_eq!(p.get_int_or(7).unwrap(), 7);
    assert_eq!(p.get_decimal_or(dec("1.5")).unwrap(), dec("1.5"));
    assert_eq!(p.get_money_or(Money::new(Decimal::ZERO)).unwrap(), Money::new(Decimal::ZERO));
    assert!(!p.get_bool_or(false).unwrap());
    assert_eq!(p.get_string_or("none").unwrap(), "none");
}

#[test]
fn conversion_failures_name_property_value_and_target() {
    let p = SimpleProperty::new("quantity", NodeType::String).with_value("plenty");
    let err = p.get_decimal().unwrap_err();
    match err.kind {
        ErrorKind::ConversionFailed {
            property,
            value,
            target,
            ..
        } => {
            assert_eq!(property, "quantity");
            assert_eq!(value, "plenty");
            assert_eq!(target, TargetType::Decimal);
        }
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn fractions_do_not_become_integers() {
    let p = SimpleProperty::new("quantity", NodeType::Decimal).with_value(dec("2.5"));
    assert!(p.get_int().is_err());
    assert!(p.get_int_or(0).is_err());
}

#[test]
fn coercing_transformer_stores_the_declared_type() {
    let p = SimpleProperty::new("price", NodeType::Money);
    assert!(p.set_value(Value::from("12.50")).unwrap());
    assert_eq!(p.value(), Value::from(Money::new(dec("12.50"))));

    let flag = SimpleProperty::new("enabled", NodeType::Boolean);
    assert!(flag.set_value(Value::from("yes")).unwrap());
    assert!(flag.get_bool().unwrap());
}

// =============================================================================
// References
// =============================================================================

#[test]
fn reference_getter() {
    let owner = Reference::new("party.customerperson", ObjectId(3));
    let p = SimpleProperty::new("owner", NodeType::Reference)
        .with_archetype_range(&["party.customer*"])
        .with_value(owner.clone());
    assert_eq!(p.get_reference().unwrap(), Some(owner));
    assert!(p.is_object_reference());
    assert_eq!(p.archetype_range().len(), 1);
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn properties_are_equal_by_name() {
    let a: &dyn Property = &SimpleProperty::new("name", NodeType::String).with_value("Fido");
    let b: &dyn Property = &SimpleProperty::new("name", NodeType::String).with_value("Rex");
    let c: &dyn Property = &SimpleProperty::new("breed", NodeType::String).with_value("Fido");
    assert!(*a == *b);
    assert!(*a != *c);
}
