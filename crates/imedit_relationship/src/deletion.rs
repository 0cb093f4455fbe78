//! Deferred deletion and deletion failure reporting.
//!
//! Collection editors never delete anything when an element is removed.
//! Persisted objects are queued and only deleted when the editor is saved,
//! so abandoning an edit leaves the store untouched.

use std::rc::Rc;

use imedit_foundation::{Error, Reference, Result};
use imedit_store::{IMObject, ObjectStore};
use indexmap::IndexMap;

use crate::editor::ObjectEditor;

/// A failed deletion.
pub struct DeletionEvent<'a> {
    /// The object that could not be deleted.
    pub object: &'a IMObject,
    /// Why.
    pub cause: &'a Error,
    /// The editor the deletion went through, if any.
    pub editor: Option<&'a dyn ObjectEditor>,
    /// The user performing the edit, if known.
    pub user: Option<&'a str>,
}

/// Receives deletion failures, typically for auditing.
pub trait DeletionListener {
    /// Called when `event.object` could not be deleted. The save that
    /// attempted the deletion fails with the same error.
    fn failed(&self, event: &DeletionEvent<'_>);
}

/// Logs deletion failures.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingDeletionListener;

impl DeletionListener for LoggingDeletionListener {
    fn failed(&self, event: &DeletionEvent<'_>) {
        tracing::warn!(
            object = %event.object.reference(),
            user = ?event.user,
            has_editor = event.editor.is_some(),
            error = %event.cause,
            "failed to delete object"
        );
    }
}

/// Objects queued for deletion, with the editors to delete them through.
#[derive(Default)]
pub(crate) struct Deletions {
    queued: IndexMap<Reference, (IMObject, Option<Rc<dyn ObjectEditor>>)>,
}

impl Deletions {
    pub(crate) fn queue(&mut self, object: IMObject, editor: Option<Rc<dyn ObjectEditor>>) {
        tracing::trace!(object = %object.reference(), "queued for deletion");
        self.queued
            .insert(object.reference().clone(), (object, editor));
    }

    /// Takes an object off the queue, returning its editor.
    pub(crate) fn unqueue(&mut self, reference: &Reference) -> Option<Rc<dyn ObjectEditor>> {
        self.queued
            .shift_remove(reference)
            .and_then(|(_, editor)| editor)
    }

    pub(crate) fn contains(&self, reference: &Reference) -> bool {
        self.queued.contains_key(reference)
    }

    pub(crate) fn len(&self) -> usize {
        self.queued.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Deletes the queued objects in order, through their editors where
    /// present.
    ///
    /// Stops at the first failure, reporting it to `listener`; the failed
    /// object and every later one stay queued.
    pub(crate) fn run(
        &mut self,
        store: &dyn ObjectStore,
        listener: &dyn DeletionListener,
        user: Option<&str>,
    ) -> Result<()> {
        while let Some((reference, (object, editor))) = self.queued.first() {
            let result = match editor {
                Some(editor) => editor.delete(),
                None => store.remove(reference),
            };
            if let Err(cause) = result {
                listener.failed(&DeletionEvent {
                    object,
                    cause: &cause,
                    editor: editor.as_deref(),
                    user,
                });
                return Err(cause);
            }
            tracing::debug!(object = %reference, "deleted object");
            self.queued.shift_remove_index(0);
        }
        Ok(())
    }
}
