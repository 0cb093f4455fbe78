//! Relationship state caching and collection editors for imedit.
//!
//! This crate provides:
//! - [`RelationshipState`] - A snapshot of a relationship and the summary of both endpoints
//! - [`RelationshipStateQuery`] - Resolves the states of a parent's relationships in one batch
//! - [`CollectionPropertyEditor`] - Edits a collection node, tracking edited objects and their editors
//! - [`RelationshipCollectionEditor`] - Edits relationships by their related object
//! - [`RelationshipTargetCollectionEditor`] - Edits relationships by their target object
//! - [`DeletionListener`] - Reports objects that could not be deleted on save

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod config;
pub mod deletion;
pub mod editor;
pub mod query;
pub mod relationship_editor;
pub mod state;
pub mod target_editor;

pub use collection::CollectionPropertyEditor;
pub use config::RelationshipConfig;
pub use deletion::{DeletionEvent, DeletionListener, LoggingDeletionListener};
pub use editor::{DefaultObjectEditor, DefaultRelationshipFactory, ObjectEditor, RelationshipFactory};
pub use query::RelationshipStateQuery;
pub use relationship_editor::RelationshipCollectionEditor;
pub use state::{Endpoint, RelationshipState, RelationshipStateFactory, SortKey, sort_states};
pub use target_editor::RelationshipTargetCollectionEditor;
