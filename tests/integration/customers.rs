//! A customer edited end to end: macro-expanded text fields, then patients
//! linked through a relationship editor sharing the customer's object.

use std::rc::Rc;

use imedit::foundation::Value;
use imedit::property::{MacroTable, Modifiable, Property, PropertyContext, Variables};
use imedit::relationship::{
    DefaultObjectEditor, ObjectEditor, RelationshipCollectionEditor, RelationshipConfig,
};
use imedit::store::archetype::{NAME, SOURCE, TARGET};
use imedit::store::{
    ArchetypeDescriptor, ArchetypeRegistry, IMObject, MemoryStore, NodeDescriptor, ObjectStore,
    shared,
};

const CUSTOMER: &str = "party.customerperson";
const PATIENT: &str = "party.patientpet";
const OWNER: &str = "entityRelationship.patientOwner";

fn store() -> Rc<MemoryStore> {
    let registry = ArchetypeRegistry::new()
        .with(
            ArchetypeDescriptor::entity(CUSTOMER)
                .with_node(NodeDescriptor::collection("patients", &[OWNER])),
        )
        .and_then(|r| {
            r.with(
                ArchetypeDescriptor::entity(PATIENT)
                    .with_node(NodeDescriptor::collection("customers", &[OWNER])),
            )
        })
        .and_then(|r| r.with(ArchetypeDescriptor::relationship(OWNER, &[PATIENT], &[CUSTOMER])))
        .unwrap();
    Rc::new(MemoryStore::new(registry))
}

fn context() -> PropertyContext {
    let macros = MacroTable::new()
        .with("@intro", "Client of $practice, $name")
        .with("@dob", "born $number years ago");
    PropertyContext::new()
        .with_macros(Rc::new(macros))
        .with_variables(Variables::new().with("practice", "Vets R Us"))
}

fn pet(store: &MemoryStore, name: &str) -> IMObject {
    let mut pet = store.create(PATIENT).unwrap().with(NAME, name);
    store.save(&mut pet).unwrap();
    pet
}

fn set(editor: &DefaultObjectEditor, node: &str, value: &str) {
    editor
        .properties()
        .require(node)
        .unwrap()
        .set_value(Value::from(value))
        .unwrap();
}

// =============================================================================
// Macros
// =============================================================================

#[test]
fn text_fields_expand_macros_against_the_edited_object() {
    let store = store();
    let customer = shared(store.create(CUSTOMER).unwrap());
    let editor = DefaultObjectEditor::new(customer, store.clone(), context()).unwrap();

    set(&editor, NAME, "Smith");
    set(&editor, "description", "@intro 3@dob");
    assert_eq!(
        editor.object().description().as_deref(),
        Some("Client of Vets R Us, Smith born 3 years ago")
    );
}

#[test]
fn unknown_codes_are_kept_verbatim() {
    let store = store();
    let customer = shared(store.create(CUSTOMER).unwrap());
    let editor = DefaultObjectEditor::new(customer, store.clone(), context()).unwrap();

    set(&editor, "description", "see @notes");
    assert_eq!(editor.object().description().as_deref(), Some("see @notes"));
}

// =============================================================================
// Customer and patients together
// =============================================================================

#[test]
fn new_customer_with_patients() {
    let store = store();
    let (fido, rex) = (pet(&store, "Fido"), pet(&store, "Rex"));
    let customer = shared(store.create(CUSTOMER).unwrap());
    let editor = DefaultObjectEditor::new(Rc::clone(&customer), store.clone(), context()).unwrap();
    let mut patients = RelationshipCollectionEditor::new(
        editor.properties().require("patients").unwrap(),
        store.clone(),
        RelationshipConfig::new().with_relationship_nodes(&["customers"]),
    )
    .unwrap();
    assert!(patients.states().next().is_none());
    assert!(!editor.is_valid());

    set(&editor, NAME, "Smith");
    patients.add(&fido).unwrap();
    patients.add(&rex).unwrap();
    assert!(editor.is_valid());
    assert!(editor.is_modified());
    assert!(patients.is_modified());

    editor.save().unwrap();
    patients.save().unwrap();
    assert!(!patients.is_modified());

    let reference = customer.borrow().reference().clone();
    let stored = store.get(&reference).unwrap().unwrap();
    assert_eq!(stored.name().as_deref(), Some("Smith"));
    assert_eq!(stored.collection("patients").len(), 2);
    for pet in [&fido, &rex] {
        let stored = store.get(pet.reference()).unwrap().unwrap();
        assert_eq!(stored.collection("customers").len(), 1);
    }

    let reloaded = shared(stored);
    let editor = DefaultObjectEditor::new(Rc::clone(&reloaded), store.clone(), context()).unwrap();
    let patients = RelationshipCollectionEditor::new(
        editor.properties().require("patients").unwrap(),
        store.clone(),
        RelationshipConfig::new(),
    )
    .unwrap();
    let names: Vec<_> = patients
        .relationships()
        .iter()
        .filter_map(|s| s.related().name.clone())
        .collect();
    assert_eq!(names.iter().map(|n| &**n).collect::<Vec<_>>(), vec!["Fido", "Rex"]);
    assert!(!editor.is_modified());
}

#[test]
fn unlinking_a_patient_is_undone_by_reloading() {
    let store = store();
    let fido = pet(&store, "Fido");
    let mut customer = store.create(CUSTOMER).unwrap().with(NAME, "Smith");
    let link = store
        .create(OWNER)
        .unwrap()
        .with(SOURCE, fido.reference().clone())
        .with(TARGET, customer.reference().clone());
    customer.add("patients", link);
    store.save(&mut customer).unwrap();

    let shared_customer = shared(customer.clone());
    let editor =
        DefaultObjectEditor::new(Rc::clone(&shared_customer), store.clone(), context()).unwrap();
    let mut patients = RelationshipCollectionEditor::new(
        editor.properties().require("patients").unwrap(),
        store.clone(),
        RelationshipConfig::new(),
    )
    .unwrap();
    assert!(patients.remove_related(fido.reference()).unwrap());
    assert!(shared_customer.borrow().collection("patients").is_empty());
    drop(patients);

    let stored = store.get(customer.reference()).unwrap().unwrap();
    assert_eq!(stored.collection("patients").len(), 1);
}
