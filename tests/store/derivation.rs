//! Integration tests for derived values
//!
//! Tests the zero policy and change reporting of derivation rules run
//! through the memory store.

use std::sync::Arc;

use imedit::foundation::{Money, NodeType, Value};
use imedit::store::{
    ArchetypeDescriptor, ArchetypeRegistry, Derivation, MemoryStore, NodeDescriptor, ObjectStore,
    ZeroPolicy,
};
use rust_decimal::Decimal;

const ITEM: &str = "act.customerEstimationItem";

fn money(s: &str) -> Value {
    Value::from(Money::new(s.parse::<Decimal>().unwrap()))
}

fn total(item: &imedit::store::IMObject) -> Value {
    let price = item.get("fixedPrice").as_decimal().unwrap_or_default();
    let discount = item.get("discount").as_decimal().unwrap_or_default();
    Value::from(Money::new(price - discount))
}

fn store(policy: ZeroPolicy) -> MemoryStore {
    let registry = ArchetypeRegistry::new()
        .with(
            ArchetypeDescriptor::new(ITEM)
                .with_node(NodeDescriptor::new("fixedPrice", NodeType::Money))
                .with_node(NodeDescriptor::new("discount", NodeType::Money))
                .with_node(NodeDescriptor::new("total", NodeType::Money).derived()),
        )
        .unwrap();
    MemoryStore::new(registry)
        .with_derivation(Derivation::new("act.*Item", "total", total).with_zero_policy(policy))
}

// =============================================================================
// Zero policy
// =============================================================================

#[test]
fn non_zero_values_propagate() {
    let store = store(ZeroPolicy::KeepExisting);
    let mut item = store.create(ITEM).unwrap().with("fixedPrice", money("10"));
    let changed = store.derive_values(&mut item).unwrap();
    assert_eq!(changed, vec![Arc::<str>::from("total")]);
    assert_eq!(item.get("total"), money("10"));
}

#[test]
fn computed_zero_keeps_an_existing_total() {
    let store = store(ZeroPolicy::KeepExisting);
    let mut item = store
        .create(ITEM)
        .unwrap()
        .with("fixedPrice", money("10"))
        .with("total", money("10"));
    item.set("discount", money("10"));
    assert!(store.derive_values(&mut item).unwrap().is_empty());
    assert_eq!(item.get("total"), money("10"));
}

#[test]
fn computed_zero_fills_an_empty_total() {
    let store = store(ZeroPolicy::KeepExisting);
    let mut item = store.create(ITEM).unwrap();
    let changed = store.derive_values(&mut item).unwrap();
    assert_eq!(changed.len(), 1);
    assert!(item.get("total").is_zero());
}

#[test]
fn propagate_policy_lets_zero_through() {
    let store = store(ZeroPolicy::Propagate);
    let mut item = store
        .create(ITEM)
        .unwrap()
        .with("fixedPrice", money("10"))
        .with("total", money("10"))
        .with("discount", money("10"));
    assert_eq!(store.derive_values(&mut item).unwrap().len(), 1);
    assert!(item.get("total").is_zero());
}

#[test]
fn unchanged_values_are_not_reported() {
    let store = store(ZeroPolicy::KeepExisting);
    let mut item = store.create(ITEM).unwrap().with("fixedPrice", money("4"));
    assert_eq!(store.derive_values(&mut item).unwrap().len(), 1);
    assert!(store.derive_values(&mut item).unwrap().is_empty());
}
