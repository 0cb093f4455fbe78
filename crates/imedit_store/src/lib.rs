//! Archetype descriptors, object instances and the object store for imedit.
//!
//! This crate provides:
//! - [`ArchetypeRegistry`] - Archetype and node descriptors with wildcard expansion
//! - [`IMObject`] - Archetype instances; relationships are objects too
//! - [`RelationshipIndex`] - Bidirectional relationship indices
//! - [`ObjectStore`] - The persistence collaborator used by editors
//! - [`MemoryStore`] - In-process store with round trip accounting
//! - [`Derivation`] - Derived value rules and the zero policy

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archetype;
pub mod derive;
pub mod memory;
pub mod object;
pub mod relationship;
pub mod store;

pub use archetype::{ArchetypeDescriptor, ArchetypeRegistry, NodeDescriptor};
pub use derive::{Derivation, ZeroPolicy, derive_all};
pub use memory::{MemoryStore, QueryStats};
pub use object::{IMObject, SharedObject, shared};
pub use relationship::{RelationshipIndex, Side};
pub use store::{ObjectStore, RelatedQuery, RelatedRow};
