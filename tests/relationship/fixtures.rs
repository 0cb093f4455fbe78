//! Shared archetypes and object builders for the relationship tests.

use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use imedit::foundation::{NodeType, Value};
use imedit::property::PropertyContext;
use imedit::property::ObjectProperty;
use imedit::store::archetype::{NAME, SOURCE, TARGET};
use imedit::store::{
    ArchetypeDescriptor, ArchetypeRegistry, IMObject, MemoryStore, NodeDescriptor, ObjectStore,
    SharedObject, shared,
};

pub const CUSTOMER: &str = "party.customerperson";
pub const PATIENT: &str = "party.patientpet";
pub const OWNER: &str = "entityRelationship.patientOwner";
pub const PRODUCT: &str = "product.medication";
pub const UNIT_PRICE: &str = "productPrice.unitPrice";
pub const PRICE_LINK: &str = "entityLink.productPrice";

pub fn store() -> Rc<MemoryStore> {
    let registry = ArchetypeRegistry::new()
        .with(
            ArchetypeDescriptor::entity(CUSTOMER)
                .with_node(NodeDescriptor::collection("patients", &[OWNER])),
        )
        .and_then(|r| {
            r.with(
                ArchetypeDescriptor::entity(PATIENT).with_node(NodeDescriptor::collection(
                    "entityRelationships",
                    &["entityRelationship.*"],
                )),
            )
        })
        .and_then(|r| r.with(ArchetypeDescriptor::relationship(OWNER, &[PATIENT], &[CUSTOMER])))
        .and_then(|r| {
            r.with(
                ArchetypeDescriptor::entity(PRODUCT)
                    .with_node(NodeDescriptor::collection("prices", &[PRICE_LINK])),
            )
        })
        .and_then(|r| {
            r.with(
                ArchetypeDescriptor::new(UNIT_PRICE)
                    .with_node(NodeDescriptor::new("price", NodeType::Money).required()),
            )
        })
        .and_then(|r| {
            r.with(ArchetypeDescriptor::relationship(
                PRICE_LINK,
                &[PRODUCT],
                &["productPrice.*"],
            ))
        })
        .unwrap();
    Rc::new(MemoryStore::new(registry))
}

pub fn noon(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

pub fn saved(store: &MemoryStore, archetype: &str, name: &str) -> IMObject {
    let mut object = store.create(archetype).unwrap().with(NAME, name);
    store.save(&mut object).unwrap();
    object
}

pub fn link(store: &MemoryStore, pet: &IMObject, owner: &IMObject) -> IMObject {
    store
        .create(OWNER)
        .unwrap()
        .with(SOURCE, pet.reference().clone())
        .with(TARGET, owner.reference().clone())
}

/// Saves `names.len()` pets and an owner linked to each of them, in order.
pub fn household(store: &MemoryStore, names: &[&str]) -> (SharedObject, Vec<IMObject>) {
    let mut owner = store.create(CUSTOMER).unwrap().with(NAME, "Smith");
    let mut pets = Vec::with_capacity(names.len());
    for name in names {
        let pet = saved(store, PATIENT, name);
        let rel = link(store, &pet, &owner);
        owner.add("patients", rel);
        pets.push(pet);
    }
    store.save(&mut owner).unwrap();
    (shared(owner), pets)
}

pub fn price(store: &MemoryStore, amount: &str) -> IMObject {
    let mut price = store
        .create(UNIT_PRICE)
        .unwrap()
        .with("price", Value::from(amount));
    store.save(&mut price).unwrap();
    price
}

pub fn product(store: &MemoryStore, prices: &[&IMObject]) -> SharedObject {
    let mut product = store.create(PRODUCT).unwrap().with(NAME, "Amoxil");
    for price in prices {
        let rel = store
            .create(PRICE_LINK)
            .unwrap()
            .with(SOURCE, product.reference().clone())
            .with(TARGET, price.reference().clone());
        product.add("prices", rel);
    }
    store.save(&mut product).unwrap();
    shared(product)
}

/// Returns the collection property `node` of `object`.
pub fn property(store: &MemoryStore, object: &SharedObject, node: &str) -> Rc<ObjectProperty> {
    let archetype = object.borrow().archetype().to_string();
    let descriptor = store
        .archetypes()
        .require(&archetype)
        .and_then(|a| a.require_node(node))
        .unwrap()
        .clone();
    Rc::new(ObjectProperty::new(
        Rc::clone(object),
        descriptor,
        PropertyContext::new(),
    ))
}
