//! Validation error aggregation.
//!
//! A [`Validator`] collects the errors of one validation pass, keyed by the
//! modifiable that reported them. In notifying mode it also pushes errors to
//! each modifiable's [`ErrorListener`] as they are recorded, falling back to
//! a validator-wide listener for modifiables that have none.

use std::fmt;
use std::rc::Rc;

use imedit_foundation::Error;
use indexmap::IndexMap;

use crate::modifiable::{Modifiable, ModifiableId};

/// A validation failure recorded against a modifiable.
///
/// Carries the message key and positional arguments for the message
/// formatter, plus a default rendering.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidatorError {
    archetype: Option<String>,
    node: Option<String>,
    message_key: String,
    arguments: Vec<String>,
    message: String,
}

impl ValidatorError {
    /// Creates an error with a message key and rendered message.
    #[must_use]
    pub fn new(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            archetype: None,
            node: None,
            message_key: message_key.into(),
            arguments: Vec::new(),
            message: message.into(),
        }
    }

    /// Sets the archetype short name.
    #[must_use]
    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Sets the node name.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Sets the message arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Returns the archetype short name.
    #[must_use]
    pub fn archetype(&self) -> Option<&str> {
        self.archetype.as_deref()
    }

    /// Returns the node name.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Returns the message key.
    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    /// Returns the message arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&Error> for ValidatorError {
    fn from(error: &Error) -> Self {
        let mut result = Self::new(error.message_key(), error.kind.to_string())
            .with_arguments(error.kind.arguments());
        if let Some(context) = &error.context {
            result.archetype.clone_from(&context.archetype);
            result.node.clone_from(&context.node);
        }
        result
    }
}

impl From<Error> for ValidatorError {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

/// Receives the validation errors of one modifiable for display.
pub trait ErrorListener {
    /// Called with the errors recorded against `source`.
    fn on_error(&self, source: ModifiableId, errors: &[ValidatorError]);

    /// Called when the errors displayed for `source` are stale.
    fn on_clear(&self, source: ModifiableId);
}

/// Errors recorded against one modifiable during a pass, kept so a cached
/// failure can be replayed into a later validator.
#[derive(Clone)]
pub struct CapturedEntry {
    id: ModifiableId,
    errors: Vec<ValidatorError>,
    listener: Option<Rc<dyn ErrorListener>>,
}

impl CapturedEntry {
    /// Returns the modifiable the errors belong to.
    #[must_use]
    pub fn id(&self) -> ModifiableId {
        self.id
    }

    /// Returns the errors.
    #[must_use]
    pub fn errors(&self) -> &[ValidatorError] {
        &self.errors
    }
}

impl fmt::Debug for CapturedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedEntry")
            .field("id", &self.id)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

struct Entry {
    errors: Vec<ValidatorError>,
    listener: Option<Rc<dyn ErrorListener>>,
    seq: u64,
}

/// Collects the errors of one validation pass.
#[derive(Default)]
pub struct Validator {
    entries: IndexMap<ModifiableId, Entry>,
    notifying: bool,
    fallback: Option<Rc<dyn ErrorListener>>,
    seq: u64,
}

impl Validator {
    /// Creates a validator that only collects errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that also pushes errors to error listeners as
    /// they are recorded. Errors of modifiables without a listener go to
    /// `fallback`, if any.
    #[must_use]
    pub fn notifying(fallback: Option<Rc<dyn ErrorListener>>) -> Self {
        Self {
            notifying: true,
            fallback,
            ..Self::default()
        }
    }

    /// Returns true if this validator pushes errors to listeners.
    #[must_use]
    pub fn is_notifying(&self) -> bool {
        self.notifying
    }

    /// Validates a modifiable.
    ///
    /// In notifying mode the modifiable's error listener is cleared first,
    /// so errors from an earlier pass do not outlive a successful one.
    pub fn validate(&mut self, modifiable: &dyn Modifiable) -> bool {
        if self.notifying {
            if let Some(listener) = modifiable.error_listener() {
                listener.on_clear(modifiable.id());
            }
        }
        modifiable.validate(self)
    }

    /// Records the errors of a modifiable, replacing any recorded earlier in
    /// this pass. An empty list removes the entry.
    pub fn add(&mut self, modifiable: &dyn Modifiable, errors: Vec<ValidatorError>) {
        let listener = modifiable.error_listener();
        self.record(modifiable.id(), errors, listener);
    }

    /// Records a single error for a modifiable, replacing any recorded
    /// earlier in this pass.
    pub fn add_error(&mut self, modifiable: &dyn Modifiable, error: ValidatorError) {
        self.add(modifiable, vec![error]);
    }

    fn record(
        &mut self,
        id: ModifiableId,
        errors: Vec<ValidatorError>,
        listener: Option<Rc<dyn ErrorListener>>,
    ) {
        if errors.is_empty() {
            self.entries.shift_remove(&id);
            return;
        }
        if self.notifying {
            if let Some(target) = listener.as_ref().or(self.fallback.as_ref()) {
                target.on_error(id, &errors);
            }
        }
        self.seq += 1;
        self.entries.insert(
            id,
            Entry {
                errors,
                listener,
                seq: self.seq,
            },
        );
    }

    /// Returns a marker for [`captured_since`](Self::captured_since).
    #[must_use]
    pub fn mark(&self) -> u64 {
        self.seq
    }

    /// Returns the entries recorded or replaced after `mark`.
    #[must_use]
    pub fn captured_since(&self, mark: u64) -> Vec<CapturedEntry> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.seq > mark)
            .map(|(id, entry)| CapturedEntry {
                id: *id,
                errors: entry.errors.clone(),
                listener: entry.listener.clone(),
            })
            .collect()
    }

    /// Records previously captured entries again.
    pub fn replay(&mut self, captured: &[CapturedEntry]) {
        for entry in captured {
            self.record(entry.id, entry.errors.clone(), entry.listener.clone());
        }
    }

    /// Returns true if no errors have been recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the modifiables with errors, in the order first recorded.
    #[must_use]
    pub fn invalid(&self) -> Vec<ModifiableId> {
        self.entries.keys().copied().collect()
    }

    /// Returns the errors recorded for a modifiable.
    #[must_use]
    pub fn errors_for(&self, id: ModifiableId) -> &[ValidatorError] {
        self.entries
            .get(&id)
            .map(|entry| entry.errors.as_slice())
            .unwrap_or(&[])
    }

    /// Returns every recorded error.
    pub fn errors(&self) -> impl Iterator<Item = &ValidatorError> {
        self.entries.values().flat_map(|entry| entry.errors.iter())
    }

    /// Returns the first recorded error.
    #[must_use]
    pub fn first_error(&self) -> Option<&ValidatorError> {
        self.errors().next()
    }

    /// Removes every recorded error.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("invalid", &self.entries.len())
            .field("notifying", &self.notifying)
            .finish_non_exhaustive()
    }
}
