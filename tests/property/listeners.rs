//! Integration tests for change listeners
//!
//! Tests registration order, re-registration and removal during
//! notification.

use std::cell::RefCell;
use std::rc::Rc;

use imedit::foundation::{NodeType, Value};
use imedit::property::{Modifiable, ModifiableListener, Property, SimpleProperty, listener};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn recording(log: &Log, name: &'static str) -> ModifiableListener {
    let log = Rc::clone(log);
    listener(move |_| log.borrow_mut().push(name))
}

fn property() -> SimpleProperty {
    SimpleProperty::new("name", NodeType::String)
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn insertion_at_zero_is_notified_first() {
    let log = Log::default();
    let p = property();
    p.add_modifiable_listener_at(recording(&log, "L1"), 0);
    p.add_modifiable_listener_at(recording(&log, "L2"), 0);
    p.set_value(Value::from("Fido")).unwrap();
    assert_eq!(*log.borrow(), vec!["L2", "L1"]);
}

#[test]
fn appended_listeners_keep_registration_order() {
    let log = Log::default();
    let p = property();
    for name in ["a", "b", "c"] {
        p.add_modifiable_listener(recording(&log, name));
    }
    p.refresh();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn re_registration_moves_instead_of_duplicating() {
    let log = Log::default();
    let p = property();
    let a = recording(&log, "a");
    p.add_modifiable_listener(Rc::clone(&a));
    p.add_modifiable_listener(recording(&log, "b"));
    p.add_modifiable_listener_at(Rc::clone(&a), 5);
    p.refresh();
    assert_eq!(*log.borrow(), vec!["b", "a"]);
}

#[test]
fn removed_listeners_are_not_notified() {
    let log = Log::default();
    let p = property();
    let a = recording(&log, "a");
    p.add_modifiable_listener(Rc::clone(&a));
    p.remove_modifiable_listener(&a);
    p.refresh();
    assert!(log.borrow().is_empty());
}

// =============================================================================
// Reentrancy
// =============================================================================

#[test]
fn a_listener_may_remove_itself() {
    let log = Log::default();
    let p = Rc::new(property());
    let slot: Rc<RefCell<Option<ModifiableListener>>> = Rc::default();

    let once = {
        let log = Rc::clone(&log);
        let slot = Rc::clone(&slot);
        let weak = Rc::downgrade(&p);
        listener(move |_| {
            log.borrow_mut().push("once");
            if let (Some(p), Some(me)) = (weak.upgrade(), slot.borrow().as_ref()) {
                p.remove_modifiable_listener(me);
            }
        })
    };
    *slot.borrow_mut() = Some(Rc::clone(&once));
    p.add_modifiable_listener(once);
    p.add_modifiable_listener(recording(&log, "after"));

    p.refresh();
    p.refresh();
    assert_eq!(*log.borrow(), vec!["once", "after", "after"]);
}

#[test]
fn a_listener_may_register_another() {
    let log = Log::default();
    let p = Rc::new(property());
    let late = recording(&log, "late");
    let adder = {
        let log = Rc::clone(&log);
        let weak = Rc::downgrade(&p);
        listener(move |_| {
            log.borrow_mut().push("adder");
            if let Some(p) = weak.upgrade() {
                p.add_modifiable_listener(Rc::clone(&late));
            }
        })
    };
    p.add_modifiable_listener(adder);

    p.refresh();
    assert_eq!(*log.borrow(), vec!["adder"]);
    p.refresh();
    assert_eq!(*log.borrow(), vec!["adder", "adder", "late"]);
}

#[test]
fn listeners_see_the_changed_property() {
    let seen = Rc::new(RefCell::new(None));
    let p = property();
    let sink = Rc::clone(&seen);
    p.add_modifiable_listener(listener(move |source| {
        *sink.borrow_mut() = source.as_property().map(|p| p.value());
    }));
    p.set_value(Value::from("Rex")).unwrap();
    assert_eq!(*seen.borrow(), Some(Value::from("Rex")));
}
