//! Integration tests for the relationship target collection editor
//!
//! Tests a product's prices edited through their targets, with the price
//! editors registered so validation and deletion go through them.

use std::rc::Rc;

use imedit::foundation::Value;
use imedit::property::{Modifiable, Property, PropertyContext, Validator};
use imedit::relationship::{DefaultObjectEditor, ObjectEditor, RelationshipTargetCollectionEditor};
use imedit::store::{MemoryStore, ObjectStore, SharedObject, shared};

use crate::fixtures::{UNIT_PRICE, price, product, property, store};

fn open(store: &Rc<MemoryStore>, product: &SharedObject) -> RelationshipTargetCollectionEditor {
    RelationshipTargetCollectionEditor::new(property(store, product, "prices"), store.clone())
        .unwrap()
}

fn price_editor(store: &Rc<MemoryStore>, object: SharedObject) -> Rc<DefaultObjectEditor> {
    DefaultObjectEditor::new(object, store.clone(), PropertyContext::new()).unwrap()
}

// =============================================================================
// Opening
// =============================================================================

#[test]
fn deleted_targets_are_dropped_when_opened() {
    let store = store();
    let prices = [price(&store, "1.00"), price(&store, "2.00"), price(&store, "3.00")];
    let product = product(&store, &[&prices[0], &prices[1], &prices[2]]);
    store.remove(prices[1].reference()).unwrap();

    let editor = open(&store, &product);
    let targets: Vec<_> = editor.objects().map(|p| p.reference().clone()).collect();
    assert_eq!(
        targets,
        vec![prices[0].reference().clone(), prices[2].reference().clone()]
    );
    assert!(editor.relationship_for(prices[1].reference()).is_none());
    assert_eq!(product.borrow().collection("prices").len(), 2);
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn abandoned_removals_delete_nothing() {
    let store = store();
    let a = price(&store, "1.00");
    let product = product(&store, &[&a]);
    store.reset_stats();
    {
        let mut editor = open(&store, &product);
        assert!(editor.remove(a.reference()).unwrap());
        assert!(editor.is_queued_for_deletion(a.reference()));
        assert!(editor.is_modified());
    }
    assert!(store.contains(a.reference()));
    assert_eq!(store.stats().removes, 0);
}

#[test]
fn readding_cancels_the_deletion_and_keeps_the_editor() {
    let store = store();
    let a = price(&store, "1.00");
    let product = product(&store, &[&a]);
    let mut editor = open(&store, &product);
    let a_editor = price_editor(&store, shared(a.clone()));
    editor.set_editor(a_editor.clone());

    editor.remove(a.reference()).unwrap();
    assert!(editor.collection().editor(a.reference()).is_none());
    assert!(editor.add(a.clone()).unwrap());
    assert!(!editor.is_queued_for_deletion(a.reference()));
    assert!(editor.collection().editor(a.reference()).is_some());

    editor.save().unwrap();
    assert!(store.contains(a.reference()));
    assert_eq!(store.stats().removes, 0);
}

#[test]
fn removed_targets_are_deleted_through_their_editors_on_save() {
    let store = store();
    let (a, b) = (price(&store, "1.00"), price(&store, "2.00"));
    let product = product(&store, &[&a, &b]);
    let mut editor = open(&store, &product);
    editor.set_editor(price_editor(&store, shared(a.clone())));

    editor.remove(a.reference()).unwrap();
    editor.save().unwrap();

    assert!(!store.contains(a.reference()));
    assert!(store.contains(b.reference()));
    let stored = store.get(product.borrow().reference()).unwrap().unwrap();
    assert_eq!(stored.collection("prices").len(), 1);
    assert!(!editor.is_modified());
}

#[test]
fn removing_the_only_target_drops_its_relationship_from_the_store() {
    let store = store();
    let a = price(&store, "1.00");
    let product = product(&store, &[&a]);
    let mut editor = open(&store, &product);
    let relationship = editor.relationship_for(a.reference()).cloned().unwrap();
    assert!(store.contains(&relationship));

    editor.remove(a.reference()).unwrap();
    editor.save().unwrap();

    assert!(!store.contains(&relationship));
    assert!(store.get(&relationship).unwrap().is_none());
    let stored = store.get(product.borrow().reference()).unwrap().unwrap();
    assert!(stored.collection("prices").is_empty());
}

#[test]
fn target_editors_take_part_in_validation() {
    let store = store();
    let product = product(&store, &[]);
    let mut editor = open(&store, &product);

    let object = shared(store.create(UNIT_PRICE).unwrap());
    let new_price = price_editor(&store, Rc::clone(&object));
    editor.add(object.borrow().clone()).unwrap();
    editor.set_editor(new_price.clone());

    let mut validator = Validator::new();
    assert!(!editor.validate(&mut validator));
    assert_eq!(
        validator.first_error().map(|e| e.message_key().to_string()),
        Some("property.error.required".to_string())
    );

    new_price
        .properties()
        .require("price")
        .unwrap()
        .set_value(Value::from("4.50"))
        .unwrap();
    assert!(editor.validate(&mut Validator::new()));

    editor.save().unwrap();
    assert!(store.contains(&new_price.reference()));
    assert!(!new_price.is_modified());
    assert!(!editor.target(&new_price.reference()).unwrap().is_new());
}
