//! Dirty tracking, change listeners and the validity cache.
//!
//! Everything an editor edits is a [`Modifiable`]: properties, collection
//! editors, whole object editors. Modifiables are shared through `Rc` and
//! mutated through `&self`, so all of their state lives in [`Cell`] and
//! [`RefCell`] slots held by a [`ModifiableState`].
//!
//! Validity is cached: once a modifiable has been validated, later
//! validations reuse the outcome until [`Modifiable::reset_valid`] is called,
//! which every mutation does. A cached failure replays the errors recorded
//! when it failed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::property::Property;
use crate::validator::{CapturedEntry, ErrorListener, Validator};

/// Identity of a modifiable, used to key validation errors.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifiableId(u64);

impl ModifiableId {
    /// Allocates a new, process-unique identifier.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ModifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifiableId({})", self.0)
    }
}

impl fmt::Display for ModifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cached outcome of the last validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidState {
    /// Not validated since the last change.
    #[default]
    Unknown,
    /// Validated successfully.
    Valid,
    /// Validated and failed.
    Invalid,
}

/// Callback notified when a modifiable changes.
pub type ModifiableListener = Rc<dyn Fn(&dyn Modifiable)>;

/// Wraps a closure as a [`ModifiableListener`].
pub fn listener(f: impl Fn(&dyn Modifiable) + 'static) -> ModifiableListener {
    Rc::new(f)
}

fn same_listener(a: &ModifiableListener, b: &ModifiableListener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Ordered list of change listeners.
///
/// A listener is registered at most once; registering it again moves it.
#[derive(Clone, Default)]
pub struct ModifiableListeners {
    listeners: Vec<ModifiableListener>,
}

impl ModifiableListeners {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener at the end of the list.
    pub fn add(&mut self, listener: ModifiableListener) {
        self.remove(&listener);
        self.listeners.push(listener);
    }

    /// Adds a listener at `index`. Index 0 is notified first. Indices past
    /// the end append.
    pub fn add_at(&mut self, listener: ModifiableListener, index: usize) {
        self.remove(&listener);
        let index = index.min(self.listeners.len());
        self.listeners.insert(index, listener);
    }

    /// Removes a listener. Returns true if it was registered.
    pub fn remove(&mut self, listener: &ModifiableListener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        before != self.listeners.len()
    }

    /// Returns true if the listener is registered.
    #[must_use]
    pub fn contains(&self, listener: &ModifiableListener) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Returns the number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns a copy of the listeners in notification order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ModifiableListener> {
        self.listeners.clone()
    }
}

impl fmt::Debug for ModifiableListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifiableListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// A node of an editing hierarchy that tracks changes and validity.
pub trait Modifiable {
    /// Returns the identity used to key validation errors.
    fn id(&self) -> ModifiableId;

    /// Returns true if the object has been modified since it was created or
    /// last cleared.
    fn is_modified(&self) -> bool;

    /// Clears the modified flag.
    fn clear_modified(&self);

    /// Adds a listener at the end of the notification order.
    fn add_modifiable_listener(&self, listener: ModifiableListener);

    /// Adds a listener at `index` in the notification order.
    fn add_modifiable_listener_at(&self, listener: ModifiableListener, index: usize);

    /// Removes a listener.
    fn remove_modifiable_listener(&self, listener: &ModifiableListener);

    /// Sets the listener that displays this object's validation errors.
    fn set_error_listener(&self, listener: Option<Rc<dyn ErrorListener>>);

    /// Returns the error listener.
    fn error_listener(&self) -> Option<Rc<dyn ErrorListener>>;

    /// Validates the object, recording errors in `validator`.
    ///
    /// Outcomes are cached until [`reset_valid`](Self::reset_valid).
    fn validate(&self, validator: &mut Validator) -> bool;

    /// Clears the cached validity. `descendants` also clears the cache of
    /// every child modifiable.
    fn reset_valid(&self, descendants: bool);

    /// Validates the object with a fresh validator.
    fn is_valid(&self) -> bool {
        let mut validator = Validator::new();
        self.validate(&mut validator)
    }

    /// Returns this object as a property, if it is one.
    fn as_property(&self) -> Option<&dyn Property> {
        None
    }
}

/// State shared by every [`Modifiable`] implementation: dirty flag,
/// listeners, error listener and the validity cache.
pub struct ModifiableState {
    id: ModifiableId,
    dirty: Cell<bool>,
    listeners: RefCell<ModifiableListeners>,
    error_listener: RefCell<Option<Rc<dyn ErrorListener>>>,
    valid: Cell<ValidState>,
    captured: RefCell<Vec<CapturedEntry>>,
}

impl Default for ModifiableState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifiableState {
    /// Creates state for a clean, unvalidated object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ModifiableId::next(),
            dirty: Cell::new(false),
            listeners: RefCell::new(ModifiableListeners::new()),
            error_listener: RefCell::new(None),
            valid: Cell::new(ValidState::Unknown),
            captured: RefCell::new(Vec::new()),
        }
    }

    /// Returns the identity.
    #[must_use]
    pub fn id(&self) -> ModifiableId {
        self.id
    }

    /// Returns the dirty flag.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Sets the dirty flag.
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    /// Adds a listener at the end.
    pub fn add_listener(&self, listener: ModifiableListener) {
        self.listeners.borrow_mut().add(listener);
    }

    /// Adds a listener at `index`.
    pub fn add_listener_at(&self, listener: ModifiableListener, index: usize) {
        self.listeners.borrow_mut().add_at(listener, index);
    }

    /// Removes a listener.
    pub fn remove_listener(&self, listener: &ModifiableListener) {
        self.listeners.borrow_mut().remove(listener);
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Notifies every listener that `source` changed.
    ///
    /// The list is copied first, so listeners may add or remove listeners
    /// (themselves included) while being notified.
    pub fn notify(&self, source: &dyn Modifiable) {
        let snapshot = self.listeners.borrow().snapshot();
        tracing::trace!(source = %self.id, listeners = snapshot.len(), "notifying listeners");
        for listener in snapshot {
            listener(source);
        }
    }

    /// Sets the error listener.
    pub fn set_error_listener(&self, listener: Option<Rc<dyn ErrorListener>>) {
        *self.error_listener.borrow_mut() = listener;
    }

    /// Returns the error listener.
    #[must_use]
    pub fn error_listener(&self) -> Option<Rc<dyn ErrorListener>> {
        self.error_listener.borrow().clone()
    }

    /// Returns the cached validity.
    #[must_use]
    pub fn valid_state(&self) -> ValidState {
        self.valid.get()
    }

    /// Clears the cached validity.
    pub fn reset_valid(&self) {
        self.valid.set(ValidState::Unknown);
        self.captured.borrow_mut().clear();
    }

    /// Runs `validation` unless a cached outcome exists.
    ///
    /// On a cached failure the errors recorded by the failing pass are
    /// replayed into `validator`. On a fresh run, every error `validation`
    /// records (for this object or its descendants) is captured for later
    /// replay.
    pub fn validate(
        &self,
        validator: &mut Validator,
        validation: impl FnOnce(&mut Validator) -> bool,
    ) -> bool {
        match self.valid.get() {
            ValidState::Valid => true,
            ValidState::Invalid => {
                let captured = self.captured.borrow().clone();
                validator.replay(&captured);
                false
            }
            ValidState::Unknown => {
                let mark = validator.mark();
                let valid = validation(validator);
                if valid {
                    self.valid.set(ValidState::Valid);
                } else {
                    *self.captured.borrow_mut() = validator.captured_since(mark);
                    self.valid.set(ValidState::Invalid);
                }
                tracing::debug!(modifiable = %self.id, valid, "validated");
                valid
            }
        }
    }
}

impl fmt::Debug for ModifiableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifiableState")
            .field("id", &self.id)
            .field("dirty", &self.dirty.get())
            .field("valid", &self.valid.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}
